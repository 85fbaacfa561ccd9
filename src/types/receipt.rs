//! Run receipt sealing the outcome of one allocation round.
//!
//! The receipt's `state_root` is a SHA-256 over the SSZ encoding of every
//! row the round produced, ordered by `(student, course)`. Two runs over
//! unchanged input produce identical receipts, which makes re-runs auditable.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::AllocError;
use crate::types::Allocation;

/// Summary of a committed allocation round.
///
/// ## Example
///
/// ```
/// use elective_allot::types::{Allocation, Category, RunReceipt};
///
/// let rows = vec![Allocation::allocated(1, 10, 1, 1, Category::General, 0)];
/// let receipt = RunReceipt::seal(4, 1, 1, &rows, 0).unwrap();
/// assert_eq!(receipt.allocated, 1);
/// assert_eq!(receipt.state_root_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct RunReceipt {
    pub cohort_id: u64,

    pub round: u32,

    /// Students in the cohort at run time (including those without preferences)
    pub students_processed: u64,

    pub allocated: u64,

    pub waitlisted: u64,

    /// SHA-256 over the ordered SSZ rows of the round
    pub state_root: [u8; 32],

    /// Completion timestamp in milliseconds
    pub timestamp: u64,
}

impl RunReceipt {
    /// Build a receipt from the rows of one round.
    ///
    /// Rows are sorted by `(student, course)` before hashing, so the root
    /// does not depend on storage iteration order.
    pub fn seal(
        cohort_id: u64,
        round: u32,
        students_processed: u64,
        rows: &[Allocation],
        timestamp: u64,
    ) -> crate::error::Result<Self> {
        let mut ordered: Vec<&Allocation> = rows.iter().collect();
        ordered.sort_by_key(|row| (row.student_id, row.course_id));

        let mut encoded = Vec::with_capacity(ordered.len() * 34);
        for row in &ordered {
            let bytes =
                ssz_rs::serialize(*row).map_err(|e| AllocError::Encoding(format!("{e:?}")))?;
            encoded.extend_from_slice(&bytes);
        }

        let allocated = ordered.iter().filter(|r| r.is_allocated()).count() as u64;
        let waitlisted = ordered.iter().filter(|r| r.is_waitlisted()).count() as u64;

        Ok(Self {
            cohort_id,
            round,
            students_processed,
            allocated,
            waitlisted,
            state_root: Self::compute_hash(&encoded),
            timestamp,
        })
    }

    /// Compute SHA-256 of the given data
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// True when the round wrote no rows
    pub fn is_empty(&self) -> bool {
        self.allocated == 0 && self.waitlisted == 0
    }

    /// Allocated students over students processed; `None` for an empty cohort
    pub fn allocation_rate(&self) -> Option<f64> {
        if self.students_processed == 0 {
            None
        } else {
            Some(self.allocated as f64 / self.students_processed as f64)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

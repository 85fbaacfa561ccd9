//! Unit of work for one allocation run.
//!
//! A [`Transaction`] reads committed state from a borrowed [`Registry`] and
//! stages every write the run makes: the round to clear, the seat matrices
//! it reset and decremented, and the rows it produced. Nothing is visible
//! to readers until the staged writes are applied with [`Registry::apply`].
//!
//! ```text
//! begin(&registry) -> clear_round / reset_seats / seat_matrix_mut / stage
//!                  -> into_writes() -> registry.apply(writes)
//! ```

use std::collections::BTreeMap;

use crate::seats::SeatMatrix;
use crate::store::Registry;
use crate::types::Allocation;

/// Writes staged by a run, detached from the registry they were read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingWrites {
    /// Students whose rows for the given round are deleted before new rows land
    pub cleared: Option<(Vec<u64>, u32)>,

    /// Seat matrices after the run, keyed by course id
    pub seat_matrices: BTreeMap<u64, SeatMatrix>,

    /// New allocation rows in merit order
    pub rows: Vec<Allocation>,
}

impl PendingWrites {
    pub fn is_empty(&self) -> bool {
        self.cleared.is_none() && self.seat_matrices.is_empty() && self.rows.is_empty()
    }
}

/// Staging area over a read-only registry snapshot.
#[derive(Debug)]
pub struct Transaction<'r> {
    registry: &'r Registry,
    writes: PendingWrites,
}

impl<'r> Transaction<'r> {
    pub fn begin(registry: &'r Registry) -> Self {
        Self {
            registry,
            writes: PendingWrites::default(),
        }
    }

    /// Committed state this transaction reads from
    #[inline]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Mark the round's rows of these students for deletion
    pub fn clear_round(&mut self, student_ids: Vec<u64>, round: u32) {
        self.writes.cleared = Some((student_ids, round));
    }

    /// Stage a full-capacity copy of the course's seat matrix.
    ///
    /// Returns `false` if the course has no seat matrix.
    pub fn reset_seats(&mut self, course_id: u64) -> bool {
        match self.seat_matrix_mut(course_id) {
            Some(matrix) => {
                matrix.reset();
                true
            }
            None => false,
        }
    }

    /// Staged seat matrix for a course.
    ///
    /// The first access within a transaction starts from full capacity, so
    /// every course a run touches is counted from a clean ledger.
    pub fn seat_matrix_mut(&mut self, course_id: u64) -> Option<&mut SeatMatrix> {
        if !self.writes.seat_matrices.contains_key(&course_id) {
            let mut matrix = self.registry.seat_matrix(course_id)?.clone();
            matrix.reset();
            self.writes.seat_matrices.insert(course_id, matrix);
        }
        self.writes.seat_matrices.get_mut(&course_id)
    }

    /// Staged matrix if the run touched the course, committed matrix otherwise
    pub fn seat_matrix(&self, course_id: u64) -> Option<&SeatMatrix> {
        self.writes
            .seat_matrices
            .get(&course_id)
            .or_else(|| self.registry.seat_matrix(course_id))
    }

    pub fn stage(&mut self, row: Allocation) {
        self.writes.rows.push(row);
    }

    pub fn staged_rows(&self) -> &[Allocation] {
        &self.writes.rows
    }

    /// Detach the staged writes so the registry can be borrowed mutably
    pub fn into_writes(self) -> PendingWrites {
        self.writes
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

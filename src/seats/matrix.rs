//! Per-course seat matrix.
//!
//! ## Layout
//!
//! One [`SeatBucket`] per [`Category`], stored in an array indexed by
//! [`Category::index`]. Every operation dispatches through that index, so
//! adding a category means adding an enum variant, not another branch.
//!
//! ## Example
//!
//! ```
//! use elective_allot::seats::{ReservationSplit, SeatMatrix};
//! use elective_allot::types::Category;
//! use rust_decimal::Decimal;
//!
//! let mut matrix = SeatMatrix::from_capacity(1, 60, Decimal::from(50), &ReservationSplit::default()).unwrap();
//! assert_eq!(matrix.remaining_for(Category::General), 30);
//!
//! assert!(matrix.try_reserve(Category::Sc));
//! assert_eq!(matrix.filled_for(Category::Sc), 1);
//!
//! matrix.reset();
//! assert_eq!(matrix.total_remaining(), 60);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};
use crate::seats::{ReservationSplit, SeatBucket};
use crate::types::Category;

/// Capacity and live remaining count per category for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeatMatrix")]
pub struct SeatMatrix {
    pub course_id: u64,
    buckets: [SeatBucket; Category::COUNT],
}

/// Wire form of [`SeatMatrix`]; buckets must follow [`Category::ALL`] order
#[derive(Deserialize)]
struct RawSeatMatrix {
    course_id: u64,
    buckets: [SeatBucket; Category::COUNT],
}

impl TryFrom<RawSeatMatrix> for SeatMatrix {
    type Error = AllocError;

    fn try_from(raw: RawSeatMatrix) -> std::result::Result<Self, Self::Error> {
        for (bucket, expected) in raw.buckets.iter().zip(Category::ALL) {
            if bucket.category != expected {
                return Err(AllocError::validation(format!(
                    "course {} lists a {} bucket where {} belongs",
                    raw.course_id, bucket.category, expected
                )));
            }
        }
        Ok(Self {
            course_id: raw.course_id,
            buckets: raw.buckets,
        })
    }
}

impl SeatMatrix {
    /// Build a matrix from explicit per-category seat counts.
    /// Categories not mentioned get zero seats.
    pub fn from_seats<I>(course_id: u64, seats: I) -> Self
    where
        I: IntoIterator<Item = (Category, u32)>,
    {
        let mut counts = [0u32; Category::COUNT];
        for (category, count) in seats {
            counts[category.index()] = count;
        }
        Self::from_counts(course_id, counts)
    }

    /// Build a matrix from the course's capacity and reservation percentage
    pub fn from_capacity(
        course_id: u64,
        max_capacity: u32,
        reserved_percent: Decimal,
        split: &ReservationSplit,
    ) -> Result<Self> {
        let counts = split.split(max_capacity, reserved_percent)?;
        Ok(Self::from_counts(course_id, counts))
    }

    fn from_counts(course_id: u64, counts: [u32; Category::COUNT]) -> Self {
        let buckets = Category::ALL.map(|category| SeatBucket::new(category, counts[category.index()]));
        Self { course_id, buckets }
    }

    // ========================================================================
    // Run lifecycle
    // ========================================================================

    /// Restore every category to full capacity.
    /// Must run once per course before a matching pass.
    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.reset();
        }
    }

    /// Take one seat from `category` if any is left.
    ///
    /// A full bucket is a normal negative result, not an error.
    #[inline]
    pub fn try_reserve(&mut self, category: Category) -> bool {
        self.buckets[category.index()].try_take()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn remaining_for(&self, category: Category) -> u32 {
        self.buckets[category.index()].remaining()
    }

    #[inline]
    pub fn capacity_for(&self, category: Category) -> u32 {
        self.buckets[category.index()].capacity()
    }

    /// Seats of `category` taken in the current run
    #[inline]
    pub fn filled_for(&self, category: Category) -> u32 {
        self.buckets[category.index()].filled()
    }

    /// Capacities indexed by [`Category::index`]
    pub fn capacities(&self) -> [u32; Category::COUNT] {
        self.buckets.map(|bucket| bucket.capacity())
    }

    pub fn total_capacity(&self) -> u32 {
        self.buckets.iter().map(SeatBucket::capacity).sum()
    }

    pub fn total_remaining(&self) -> u32 {
        self.buckets.iter().map(SeatBucket::remaining).sum()
    }

    pub fn bucket(&self, category: Category) -> &SeatBucket {
        &self.buckets[category.index()]
    }

    pub fn buckets(&self) -> &[SeatBucket] {
        &self.buckets
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

//! Allocation rows written by the engine.
//!
//! ## SSZ Serialization
//!
//! Rows derive `SimpleSerialize` from ssz_rs so that a round's results hash
//! to the same state root on every machine. Enumerations are stored as
//! their `u8` codes and exposed through typed accessors.

use ssz_rs::prelude::*;

use crate::types::{AllocationStatus, Category};

/// Unique key of an allocation row: `(student, course, round)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationKey {
    pub student_id: u64,
    pub course_id: u64,
    pub round: u32,
}

/// The outcome of one student in one round.
///
/// Rows are created only by the allocation engine and never mutated;
/// corrections happen by re-running the round.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8 + 8 + 4 + 1 + 4 + 1 + 8 = 34 bytes.
///
/// ## Example
///
/// ```
/// use elective_allot::types::{Allocation, AllocationStatus, Category};
///
/// let row = Allocation::allocated(11, 3, 1, 2, Category::General, 1_700_000_000_000);
/// assert_eq!(row.status(), AllocationStatus::Allocated);
/// assert_eq!(row.preference_number, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Allocation {
    pub student_id: u64,

    /// Course allocated, or the first-choice course for a waitlisted row
    pub course_id: u64,

    /// Allocation round (1-based)
    pub round: u32,

    /// Status as u8 (0=Allocated, 1=Waitlisted, 2=NotAllocated)
    pub status_raw: u8,

    /// Priority of the preference that was satisfied (or attempted)
    pub preference_number: u32,

    /// Seat bucket consumed, as u8 category code.
    /// Differs from the student's category when the GENERAL fallback was used.
    pub seat_category_raw: u8,

    /// Unix timestamp in milliseconds when the run wrote this row
    pub timestamp: u64,
}

impl Allocation {
    /// Row for a student who obtained a seat
    pub fn allocated(
        student_id: u64,
        course_id: u64,
        round: u32,
        preference_number: u32,
        seat_category: Category,
        timestamp: u64,
    ) -> Self {
        Self {
            student_id,
            course_id,
            round,
            status_raw: AllocationStatus::Allocated.to_u8(),
            preference_number,
            seat_category_raw: seat_category.to_u8(),
            timestamp,
        }
    }

    /// Row for a student who found no seat in any preferred course
    pub fn waitlisted(
        student_id: u64,
        course_id: u64,
        round: u32,
        preference_number: u32,
        category: Category,
        timestamp: u64,
    ) -> Self {
        Self {
            student_id,
            course_id,
            round,
            status_raw: AllocationStatus::Waitlisted.to_u8(),
            preference_number,
            seat_category_raw: category.to_u8(),
            timestamp,
        }
    }

    pub fn key(&self) -> AllocationKey {
        AllocationKey {
            student_id: self.student_id,
            course_id: self.course_id,
            round: self.round,
        }
    }

    pub fn status(&self) -> AllocationStatus {
        AllocationStatus::from_u8(self.status_raw).unwrap_or(AllocationStatus::NotAllocated)
    }

    pub fn seat_category(&self) -> Category {
        Category::from_u8(self.seat_category_raw).unwrap_or(Category::General)
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.status() == AllocationStatus::Allocated
    }

    #[inline]
    pub fn is_waitlisted(&self) -> bool {
        self.status() == AllocationStatus::Waitlisted
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

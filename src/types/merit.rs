//! Merit (qualifying marks) and seat-share arithmetic.
//!
//! Qualifying marks are carried as `rust_decimal::Decimal` so that merit
//! ordering and the reservation split are identical on every machine.

use std::cmp::Ordering;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::types::Student;

// ============================================================================
// Seat-share Arithmetic
// ============================================================================

/// `floor(total × ratio)`, saturating at zero for negative ratios.
///
/// ```
/// use elective_allot::types::merit::floor_share;
/// use rust_decimal::Decimal;
///
/// assert_eq!(floor_share(5, Decimal::new(25, 2)), 1);   // 1.25
/// assert_eq!(floor_share(8, Decimal::new(125, 3)), 1);  // 1.0
/// ```
pub fn floor_share(total: u32, ratio: Decimal) -> u32 {
    (Decimal::from(total) * ratio)
        .floor()
        .to_u32()
        .unwrap_or(0)
}

/// `floor(total × percent / 100)`
pub fn percent_of(total: u32, percent: Decimal) -> u32 {
    (Decimal::from(total) * percent / Decimal::ONE_HUNDRED)
        .floor()
        .to_u32()
        .unwrap_or(0)
}

// ============================================================================
// Merit Ordering
// ============================================================================

/// Merit order: higher marks first, equal marks broken by ascending student id.
pub fn merit_order(a: &Student, b: &Student) -> Ordering {
    b.qualifying_marks
        .cmp(&a.qualifying_marks)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort students in place by [`merit_order`]
pub fn sort_by_merit(students: &mut [Student]) {
    students.sort_by(merit_order);
}

// ============================================================================
// Unit Tests
// ============================================================================

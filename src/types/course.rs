//! Courses and course-pool membership.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// An elective course offered by a department.
///
/// The seat matrix is derived from `max_capacity` and `reserved_percent`
/// when the course is registered (see [`crate::seats::SeatMatrix`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,

    /// Course code, stored upper-case
    pub code: String,

    #[serde(default)]
    pub name: String,

    /// Offering department
    pub department_id: u64,

    /// Total seats across all categories
    pub max_capacity: u32,

    /// Share of `max_capacity` set aside for reserved categories (0..=100)
    #[serde(default)]
    pub reserved_percent: Decimal,

    /// Inactive courses are skipped during matching
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Course {
    pub fn new(
        id: u64,
        code: &str,
        name: impl Into<String>,
        department_id: u64,
        max_capacity: u32,
        reserved_percent: Decimal,
    ) -> Self {
        Self {
            id,
            code: code.to_uppercase(),
            name: name.into(),
            department_id,
            max_capacity,
            reserved_percent,
            is_active: true,
        }
    }
}

/// Membership of a course in a cohort's eligible pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub course_id: u64,
    pub cohort_id: u64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl PoolEntry {
    pub fn new(course_id: u64, cohort_id: u64) -> Self {
        Self {
            course_id,
            cohort_id,
            is_active: true,
        }
    }
}

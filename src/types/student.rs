//! Cohorts and students as loaded from the external registry.
//!
//! Both are read-only to the allocation engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Category;

/// A group of students admitted together; the unit one allocation round runs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

impl Cohort {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A student eligible for elective allocation.
///
/// ## Example
///
/// ```
/// use elective_allot::types::{Category, Student};
/// use rust_decimal::Decimal;
///
/// let student = Student::new(7, 1, 3, Decimal::from(88), Category::Obc);
/// assert_eq!(student.category, Category::Obc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u64,

    /// Cohort (batch) the student belongs to
    pub cohort_id: u64,

    /// Home department; electives from it are not offered to the student
    pub department_id: u64,

    #[serde(default)]
    pub name: String,

    /// Merit score, higher is better
    pub qualifying_marks: Decimal,

    #[serde(default)]
    pub category: Category,
}

impl Student {
    pub fn new(
        id: u64,
        cohort_id: u64,
        department_id: u64,
        qualifying_marks: Decimal,
        category: Category,
    ) -> Self {
        Self {
            id,
            cohort_id,
            department_id,
            name: String::new(),
            qualifying_marks,
            category,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

//! Aggregate counts returned by an allocation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::StudentOutcome;
use crate::types::{Category, Student};

/// Counts produced by one run.
///
/// Maps are ordered so that equal inputs serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_students: u64,
    pub allocated_count: u64,
    pub waitlisted_count: u64,

    /// Students without any submitted preference
    pub not_allocated_count: u64,

    /// Course id to allocated students
    pub allocations_by_course: BTreeMap<u64, u64>,

    /// Student reservation category to allocated students
    pub allocations_by_category: BTreeMap<Category, u64>,
}

impl AllocationSummary {
    pub fn with_total(total_students: u64) -> Self {
        Self {
            total_students,
            ..Self::default()
        }
    }

    /// Fold one student's outcome into the counts
    pub fn record(&mut self, student: &Student, outcome: &StudentOutcome) {
        match outcome {
            StudentOutcome::Allocated { course_id, .. } => {
                self.allocated_count += 1;
                *self.allocations_by_course.entry(*course_id).or_insert(0) += 1;
                *self
                    .allocations_by_category
                    .entry(student.category)
                    .or_insert(0) += 1;
            }
            StudentOutcome::Waitlisted { .. } => self.waitlisted_count += 1,
            StudentOutcome::NoPreference => self.not_allocated_count += 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_students == 0
    }
}

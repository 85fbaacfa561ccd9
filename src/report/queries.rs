//! Read-side lookups over committed allocation rows.
//!
//! Every query returns rows sorted by `(round, student, course)` so callers
//! never observe slab iteration order.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::error::Result;
use crate::store::Registry;
use crate::types::{Allocation, RunReceipt, Student};

fn sorted(mut rows: Vec<&Allocation>) -> Vec<&Allocation> {
    rows.sort_by_key(|row| (row.round, row.student_id, row.course_id));
    rows
}

fn in_round(row: &Allocation, round: Option<u32>) -> bool {
    round.map_or(true, |r| row.round == r)
}

impl Registry {
    /// A student's row for `round`, or for their latest round when `None`
    pub fn student_allocation(&self, student_id: u64, round: Option<u32>) -> Option<&Allocation> {
        self.allocations()
            .filter(|row| row.student_id == student_id && in_round(row, round))
            .max_by_key(|row| (row.round, Reverse(row.course_id)))
    }

    /// ALLOCATED rows of a course
    pub fn course_allocations(&self, course_id: u64, round: Option<u32>) -> Vec<&Allocation> {
        sorted(
            self.allocations()
                .filter(|row| row.course_id == course_id && row.is_allocated() && in_round(row, round))
                .collect(),
        )
    }

    /// Rows of every student in a cohort, any status
    pub fn cohort_allocations(&self, cohort_id: u64, round: Option<u32>) -> Vec<&Allocation> {
        let members = self.cohort_member_ids(cohort_id);
        sorted(
            self.allocations()
                .filter(|row| members.contains(&row.student_id) && in_round(row, round))
                .collect(),
        )
    }

    /// Students of a cohort without an ALLOCATED row, in id order
    pub fn unallocated_students(&self, cohort_id: u64, round: Option<u32>) -> Vec<&Student> {
        let seated: HashSet<u64> = self
            .allocations()
            .filter(|row| row.is_allocated() && in_round(row, round))
            .map(|row| row.student_id)
            .collect();
        self.cohort_students(cohort_id)
            .into_iter()
            .filter(|student| !seated.contains(&student.id))
            .collect()
    }

    /// WAITLISTED rows, optionally narrowed by course, cohort and round
    pub fn waitlisted(
        &self,
        course_id: Option<u64>,
        cohort_id: Option<u64>,
        round: Option<u32>,
    ) -> Vec<&Allocation> {
        let members = cohort_id.map(|id| self.cohort_member_ids(id));
        sorted(
            self.allocations()
                .filter(|row| row.is_waitlisted() && in_round(row, round))
                .filter(|row| course_id.map_or(true, |id| row.course_id == id))
                .filter(|row| {
                    members
                        .as_ref()
                        .map_or(true, |m| m.contains(&row.student_id))
                })
                .collect(),
        )
    }

    /// Seal the committed rows of a cohort's round into a receipt
    pub fn seal_round(&self, cohort_id: u64, round: u32, timestamp: u64) -> Result<RunReceipt> {
        self.require_cohort(cohort_id)?;
        let rows: Vec<Allocation> = self
            .cohort_allocations(cohort_id, Some(round))
            .into_iter()
            .cloned()
            .collect();
        let students = self.cohort_students(cohort_id).len() as u64;
        RunReceipt::seal(cohort_id, round, students, &rows, timestamp)
    }

    fn cohort_member_ids(&self, cohort_id: u64) -> HashSet<u64> {
        self.cohort_students(cohort_id)
            .into_iter()
            .map(|student| student.id)
            .collect()
    }
}

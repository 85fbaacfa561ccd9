//! Merit-ordered greedy matcher.
//!
//! ## Algorithm
//!
//! ```text
//! clear round rows for the cohort
//! reset seat matrices of the cohort's active pool
//! for student in cohort sorted by (marks desc, id asc):
//!     prefs = student's preferences by priority
//!     if prefs empty: NoPreference (no row)
//!     for pref in prefs:
//!         skip if course missing, inactive or without seats
//!         take own-category seat            -> Allocated
//!         else if reserved category:
//!             take GENERAL seat (overflow)  -> Allocated
//!     otherwise: Waitlisted on first preference
//! ```
//!
//! The pass is strictly sequential: a seat taken by a higher-merit student
//! must be visible to every later check.

use tracing::{debug, info, info_span};

use crate::engine::AllocationSummary;
use crate::error::{AllocError, Result};
use crate::store::Transaction;
use crate::types::merit::sort_by_merit;
use crate::types::{Allocation, Category, Student};

/// Decision taken for one student in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOutcome {
    /// Seat taken in `course_id`; `seat_category` is the bucket consumed
    Allocated {
        course_id: u64,
        preference_number: u32,
        seat_category: Category,
    },
    /// No preferred course had a seat; anchored to the first choice
    Waitlisted { course_id: u64 },
    /// The student submitted no preferences; no row is written
    NoPreference,
}

impl StudentOutcome {
    pub fn is_allocated(&self) -> bool {
        matches!(self, StudentOutcome::Allocated { .. })
    }

    /// True when a reserved-category student was seated through GENERAL overflow
    pub fn used_fallback(&self, student: &Student) -> bool {
        match self {
            StudentOutcome::Allocated { seat_category, .. } => *seat_category != student.category,
            _ => false,
        }
    }
}

/// Deterministic allocation engine.
///
/// Holds no state between runs; everything a run reads and writes goes
/// through the [`Transaction`] passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine;

impl AllocationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run one allocation round for a cohort.
    ///
    /// Re-running the same `(cohort, round)` fully replaces the earlier
    /// result. An empty cohort yields a zero summary and stages nothing.
    ///
    /// # Errors
    ///
    /// - `Validation` if `round` is 0
    /// - `NotFound` if the cohort does not exist
    pub fn run_allocation(
        &self,
        tx: &mut Transaction<'_>,
        cohort_id: u64,
        round: u32,
        timestamp: u64,
    ) -> Result<AllocationSummary> {
        if round == 0 {
            return Err(AllocError::validation("allocation round must be at least 1"));
        }
        let registry = tx.registry();
        registry.require_cohort(cohort_id)?;

        let span = info_span!("allocation_run", cohort_id, round);
        let _enter = span.enter();

        let mut students: Vec<Student> = registry
            .cohort_students(cohort_id)
            .into_iter()
            .cloned()
            .collect();
        if students.is_empty() {
            info!("cohort has no students, nothing to allocate");
            return Ok(AllocationSummary::default());
        }

        // Step 1: replace any previous result for this round
        tx.clear_round(students.iter().map(|s| s.id).collect(), round);

        // Step 2: every pool course starts from full capacity
        for course_id in registry.active_pool(cohort_id) {
            if !tx.reset_seats(course_id) {
                debug!(course_id, "pool course has no seat matrix");
            }
        }

        // Step 3: merit order
        sort_by_merit(&mut students);

        // Step 4: single sequential pass
        let mut summary = AllocationSummary::with_total(students.len() as u64);
        for student in &students {
            let outcome = self.allocate_student(tx, student, round, timestamp);
            summary.record(student, &outcome);
        }

        info!(
            total = summary.total_students,
            allocated = summary.allocated_count,
            waitlisted = summary.waitlisted_count,
            no_preference = summary.not_allocated_count,
            "allocation run complete"
        );
        Ok(summary)
    }

    /// Try each of the student's preferences in order and stage the resulting row.
    pub fn allocate_student(
        &self,
        tx: &mut Transaction<'_>,
        student: &Student,
        round: u32,
        timestamp: u64,
    ) -> StudentOutcome {
        let registry = tx.registry();
        let preferences = registry.preferences_of(student.id);

        let Some(first) = preferences.first() else {
            debug!(student_id = student.id, "no preferences submitted");
            return StudentOutcome::NoPreference;
        };

        for pref in preferences {
            let active = registry
                .course(pref.course_id)
                .is_some_and(|course| course.is_active);
            if !active {
                debug!(student_id = student.id, course_id = pref.course_id, "course unavailable, skipped");
                continue;
            }
            let Some(matrix) = tx.seat_matrix_mut(pref.course_id) else {
                debug!(student_id = student.id, course_id = pref.course_id, "course has no seat matrix, skipped");
                continue;
            };

            let seat = if matrix.try_reserve(student.category) {
                Some(student.category)
            } else if student.category.is_reserved() && matrix.try_reserve(Category::General) {
                Some(Category::General)
            } else {
                None
            };

            if let Some(seat_category) = seat {
                debug!(
                    student_id = student.id,
                    course_id = pref.course_id,
                    priority = pref.priority,
                    seat = %seat_category,
                    "allocated"
                );
                tx.stage(Allocation::allocated(
                    student.id,
                    pref.course_id,
                    round,
                    pref.priority,
                    seat_category,
                    timestamp,
                ));
                return StudentOutcome::Allocated {
                    course_id: pref.course_id,
                    preference_number: pref.priority,
                    seat_category,
                };
            }
        }

        debug!(student_id = student.id, course_id = first.course_id, "waitlisted");
        tx.stage(Allocation::waitlisted(
            student.id,
            first.course_id,
            round,
            first.priority,
            student.category,
            timestamp,
        ));
        StudentOutcome::Waitlisted {
            course_id: first.course_id,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

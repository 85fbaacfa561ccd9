//! Preference store.
//!
//! A student's list is always replaced as a whole: the new list is validated
//! against the student's eligible courses first, then swapped in with
//! priorities renumbered `1..=N`. A rejected submission leaves the previous
//! list untouched.
//!
//! Eligible courses are the active entries of the student's cohort pool whose
//! course is active and offered by a department other than the student's own.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{AllocError, Result};
use crate::store::Registry;
use crate::types::{Course, Preference};

impl Registry {
    /// Courses a student may rank, in course id order
    pub fn available_courses(&self, student_id: u64) -> Result<Vec<&Course>> {
        let student = self.require_student(student_id)?;
        Ok(self
            .pool_courses(student.cohort_id)
            .into_iter()
            .filter(|course| course.department_id != student.department_id)
            .collect())
    }

    /// A student's preferences ordered by priority; empty if none were submitted
    pub fn preferences_of(&self, student_id: u64) -> &[Preference] {
        self.preferences
            .get(&student_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_submitted(&self, student_id: u64) -> bool {
        !self.preferences_of(student_id).is_empty()
    }

    /// Replace a student's preferences with `course_ids`, most preferred first.
    ///
    /// # Arguments
    ///
    /// * `student_id` - Submitting student
    /// * `course_ids` - Ranked course ids; an empty slice clears the list
    /// * `submitted_at` - Submission timestamp in milliseconds
    ///
    /// # Returns
    ///
    /// The stored list with priorities `1..=N`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the student does not exist
    /// - `Validation` if a course repeats or is not eligible for the student
    pub fn submit_preferences(
        &mut self,
        student_id: u64,
        course_ids: &[u64],
        submitted_at: u64,
    ) -> Result<Vec<Preference>> {
        self.validate_choices(student_id, course_ids)?;

        let list: Vec<Preference> = course_ids
            .iter()
            .zip(1u32..)
            .map(|(&course_id, priority)| Preference::new(student_id, course_id, priority, submitted_at))
            .collect();

        debug!(student_id, count = list.len(), "preferences replaced");
        if list.is_empty() {
            self.preferences.remove(&student_id);
        } else {
            self.preferences.insert(student_id, list.clone());
        }
        Ok(list)
    }

    /// Replace a student's preferences from explicit `(course, priority)` pairs.
    ///
    /// Pairs are ordered by the given priority and then renumbered `1..=N`,
    /// so gaps such as `1, 3, 7` collapse to `1, 2, 3`.
    pub fn submit_ranked_preferences(
        &mut self,
        student_id: u64,
        ranked: &[(u64, u32)],
        submitted_at: u64,
    ) -> Result<Vec<Preference>> {
        let mut seen = HashSet::with_capacity(ranked.len());
        for &(course_id, priority) in ranked {
            if priority == 0 {
                return Err(AllocError::validation(format!(
                    "priority for course {course_id} must be at least 1"
                )));
            }
            if !seen.insert(priority) {
                return Err(AllocError::validation(format!("priority {priority} used twice")));
            }
        }

        let mut ordered = ranked.to_vec();
        ordered.sort_by_key(|&(_, priority)| priority);
        let course_ids: Vec<u64> = ordered.into_iter().map(|(course_id, _)| course_id).collect();
        self.submit_preferences(student_id, &course_ids, submitted_at)
    }

    /// Drop a student's list. Returns `false` if there was none.
    pub fn clear_preferences(&mut self, student_id: u64) -> bool {
        self.preferences.remove(&student_id).is_some()
    }

    /// Drop every list in a cohort, returning how many students had one
    pub fn clear_cohort_preferences(&mut self, cohort_id: u64) -> usize {
        let ids: Vec<u64> = self
            .cohort_students(cohort_id)
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.into_iter()
            .filter(|id| self.clear_preferences(*id))
            .count()
    }

    fn validate_choices(&self, student_id: u64, course_ids: &[u64]) -> Result<()> {
        let eligible: HashSet<u64> = self
            .available_courses(student_id)?
            .into_iter()
            .map(|course| course.id)
            .collect();

        let mut seen = HashSet::with_capacity(course_ids.len());
        for &course_id in course_ids {
            if !seen.insert(course_id) {
                return Err(AllocError::validation(format!(
                    "course {course_id} appears more than once"
                )));
            }
            if !eligible.contains(&course_id) {
                return Err(AllocError::validation(format!(
                    "course {course_id} is not in the eligible pool of student {student_id}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Cohort, Student};
    use rust_decimal::Decimal;

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.insert_cohort(Cohort::new(1, "cohort"));
        reg.insert_cohort(Cohort::new(2, "other"));
        reg.insert_course(Course::new(10, "ph1", "Optics", 2, 5, Decimal::ZERO))
            .unwrap();
        reg.insert_course(Course::new(11, "ch1", "Kinetics", 3, 5, Decimal::ZERO))
            .unwrap();
        // Own department
        reg.insert_course(Course::new(12, "cs1", "Compilers", 1, 5, Decimal::ZERO))
            .unwrap();
        // Other cohort's pool only
        reg.insert_course(Course::new(13, "ma1", "Topology", 4, 5, Decimal::ZERO))
            .unwrap();
        for id in [10, 11, 12] {
            reg.add_to_pool(id, 1).unwrap();
        }
        reg.add_to_pool(13, 2).unwrap();
        reg.insert_student(Student::new(1, 1, 1, Decimal::from(80), Category::General))
            .unwrap();
        reg.insert_student(Student::new(2, 1, 1, Decimal::from(70), Category::Obc))
            .unwrap();
        reg
    }

    #[test]
    fn test_available_courses_exclude_own_department() {
        let reg = registry();
        let ids: Vec<u64> = reg.available_courses(1).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert!(reg.available_courses(99).is_err());
    }

    #[test]
    fn test_submit_numbers_priorities() {
        let mut reg = registry();
        let list = reg.submit_preferences(1, &[11, 10], 5).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!((list[0].course_id, list[0].priority), (11, 1));
        assert_eq!((list[1].course_id, list[1].priority), (10, 2));
        assert!(reg.has_submitted(1));
        assert_eq!(reg.preferences_of(1), list.as_slice());
    }

    #[test]
    fn test_rejected_submission_keeps_previous_list() {
        let mut reg = registry();
        reg.submit_preferences(1, &[10, 11], 0).unwrap();

        let dup = reg.submit_preferences(1, &[11, 11], 1);
        assert!(matches!(dup, Err(AllocError::Validation(_))));
        let own_dept = reg.submit_preferences(1, &[12], 1);
        assert!(matches!(own_dept, Err(AllocError::Validation(_))));
        let other_pool = reg.submit_preferences(1, &[13], 1);
        assert!(matches!(other_pool, Err(AllocError::Validation(_))));

        let kept: Vec<u64> = reg.preferences_of(1).iter().map(|p| p.course_id).collect();
        assert_eq!(kept, vec![10, 11]);
    }

    #[test]
    fn test_inactive_course_not_eligible() {
        let mut reg = registry();
        reg.set_course_active(10, false).unwrap();
        assert!(reg.submit_preferences(1, &[10], 0).is_err());
        reg.remove_from_pool(11, 1);
        assert!(reg.submit_preferences(1, &[11], 0).is_err());
    }

    #[test]
    fn test_empty_submission_clears() {
        let mut reg = registry();
        reg.submit_preferences(1, &[10], 0).unwrap();
        assert!(reg.submit_preferences(1, &[], 1).unwrap().is_empty());
        assert!(!reg.has_submitted(1));
    }

    #[test]
    fn test_unknown_student() {
        let mut reg = registry();
        assert!(matches!(
            reg.submit_preferences(42, &[10], 0),
            Err(AllocError::NotFound { entity: "student", id: 42 })
        ));
    }

    #[test]
    fn test_ranked_submission_collapses_gaps() {
        let mut reg = registry();
        let list = reg.submit_ranked_preferences(1, &[(10, 7), (11, 3)], 0).unwrap();
        assert_eq!((list[0].course_id, list[0].priority), (11, 1));
        assert_eq!((list[1].course_id, list[1].priority), (10, 2));

        assert!(reg.submit_ranked_preferences(1, &[(10, 0)], 0).is_err());
        assert!(reg.submit_ranked_preferences(1, &[(10, 2), (11, 2)], 0).is_err());
    }

    #[test]
    fn test_clear_cohort() {
        let mut reg = registry();
        reg.submit_preferences(1, &[10], 0).unwrap();
        reg.submit_preferences(2, &[11], 0).unwrap();
        assert_eq!(reg.clear_cohort_preferences(1), 2);
        assert!(!reg.clear_preferences(1));
        assert_eq!(reg.clear_cohort_preferences(1), 0);
    }
}

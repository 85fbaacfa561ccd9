//! In-memory registry of cohorts, students, courses, pools, seat matrices,
//! preferences and allocation rows.
//!
//! ## Storage
//!
//! - **BTreeMap** for entity tables, so iteration order is by id and every
//!   derived list is deterministic
//! - **Slab** for allocation rows, with a `(student, course, round)` index
//!   giving O(1) removal when a round is cleared
//!
//! The registry itself performs no locking; [`crate::store::Database`] wraps
//! it for shared use.

use std::collections::{BTreeMap, HashMap, HashSet};

use slab::Slab;
use tracing::debug;

use crate::error::{AllocError, Result};
use crate::seats::{ReservationSplit, SeatMatrix};
use crate::store::PendingWrites;
use crate::types::{Allocation, AllocationKey, Category, Cohort, Course, PoolEntry, Preference, Student};

/// Tables backing the allocation core.
#[derive(Debug, Default)]
pub struct Registry {
    /// Split used to derive seat matrices for newly registered courses
    split: ReservationSplit,

    cohorts: BTreeMap<u64, Cohort>,

    students: BTreeMap<u64, Student>,

    courses: BTreeMap<u64, Course>,

    /// Key: course id
    seat_matrices: HashMap<u64, SeatMatrix>,

    /// Key: (cohort id, course id)
    pool: BTreeMap<(u64, u64), PoolEntry>,

    /// Key: student id. Each list is kept sorted by priority.
    pub(crate) preferences: HashMap<u64, Vec<Preference>>,

    /// Allocation rows
    allocations: Slab<Allocation>,

    /// Unique key to slab index
    allocation_index: HashMap<AllocationKey, usize>,
}

impl Registry {
    /// Create an empty registry using the default reservation split
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with a custom reservation split
    pub fn with_split(split: ReservationSplit) -> Self {
        Self {
            split,
            ..Self::default()
        }
    }

    pub fn split(&self) -> &ReservationSplit {
        &self.split
    }

    // ========================================================================
    // Cohorts and students
    // ========================================================================

    /// Insert or replace a cohort
    pub fn insert_cohort(&mut self, cohort: Cohort) {
        self.cohorts.insert(cohort.id, cohort);
    }

    pub fn cohort(&self, cohort_id: u64) -> Option<&Cohort> {
        self.cohorts.get(&cohort_id)
    }

    pub fn require_cohort(&self, cohort_id: u64) -> Result<&Cohort> {
        self.cohort(cohort_id)
            .ok_or_else(|| AllocError::not_found("cohort", cohort_id))
    }

    /// Insert or replace a student. The student's cohort must exist.
    pub fn insert_student(&mut self, student: Student) -> Result<()> {
        self.require_cohort(student.cohort_id)?;
        self.students.insert(student.id, student);
        Ok(())
    }

    pub fn student(&self, student_id: u64) -> Option<&Student> {
        self.students.get(&student_id)
    }

    pub fn require_student(&self, student_id: u64) -> Result<&Student> {
        self.student(student_id)
            .ok_or_else(|| AllocError::not_found("student", student_id))
    }

    /// Students of a cohort in id order
    pub fn cohort_students(&self, cohort_id: u64) -> Vec<&Student> {
        self.students
            .values()
            .filter(|s| s.cohort_id == cohort_id)
            .collect()
    }

    // ========================================================================
    // Courses and seat matrices
    // ========================================================================

    /// Insert or replace a course and derive its seat matrix.
    ///
    /// Fails without side effects if the reservation percentage is invalid.
    pub fn insert_course(&mut self, mut course: Course) -> Result<()> {
        let matrix = SeatMatrix::from_capacity(
            course.id,
            course.max_capacity,
            course.reserved_percent,
            &self.split,
        )?;
        course.code = course.code.to_uppercase();
        self.seat_matrices.insert(course.id, matrix);
        self.courses.insert(course.id, course);
        Ok(())
    }

    pub fn course(&self, course_id: u64) -> Option<&Course> {
        self.courses.get(&course_id)
    }

    pub fn require_course(&self, course_id: u64) -> Result<&Course> {
        self.course(course_id)
            .ok_or_else(|| AllocError::not_found("course", course_id))
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Soft-activate or deactivate a course
    pub fn set_course_active(&mut self, course_id: u64, active: bool) -> Result<()> {
        let course = self
            .courses
            .get_mut(&course_id)
            .ok_or_else(|| AllocError::not_found("course", course_id))?;
        course.is_active = active;
        Ok(())
    }

    pub fn seat_matrix(&self, course_id: u64) -> Option<&SeatMatrix> {
        self.seat_matrices.get(&course_id)
    }

    /// Replace a course's seat capacities with explicit counts.
    /// Remaining counts start at the new capacities.
    pub fn override_seats<I>(&mut self, course_id: u64, seats: I) -> Result<&SeatMatrix>
    where
        I: IntoIterator<Item = (Category, u32)>,
    {
        self.require_course(course_id)?;
        let matrix = SeatMatrix::from_seats(course_id, seats);
        debug!(course_id, total = matrix.total_capacity(), "seat matrix overridden");
        self.seat_matrices.insert(course_id, matrix);
        Ok(&self.seat_matrices[&course_id])
    }

    /// Restore a course's remaining seats to capacity
    pub fn reset_seat_matrix(&mut self, course_id: u64) -> Result<()> {
        let matrix = self
            .seat_matrices
            .get_mut(&course_id)
            .ok_or_else(|| AllocError::not_found("seat matrix", course_id))?;
        matrix.reset();
        Ok(())
    }

    /// Detach a course's seat matrix; the matcher then treats the course as unavailable
    pub fn remove_seat_matrix(&mut self, course_id: u64) -> Option<SeatMatrix> {
        self.seat_matrices.remove(&course_id)
    }

    // ========================================================================
    // Course pool
    // ========================================================================

    /// Add a course to a cohort's pool, reactivating an existing entry
    pub fn add_to_pool(&mut self, course_id: u64, cohort_id: u64) -> Result<PoolEntry> {
        self.require_course(course_id)?;
        self.require_cohort(cohort_id)?;
        let entry = self
            .pool
            .entry((cohort_id, course_id))
            .or_insert_with(|| PoolEntry::new(course_id, cohort_id));
        entry.is_active = true;
        Ok(*entry)
    }

    /// Deactivate a pool entry. Returns `false` if no entry existed.
    pub fn remove_from_pool(&mut self, course_id: u64, cohort_id: u64) -> bool {
        match self.pool.get_mut(&(cohort_id, course_id)) {
            Some(entry) => {
                entry.is_active = false;
                true
            }
            None => false,
        }
    }

    /// Course ids with an active pool entry for the cohort, in id order
    pub fn active_pool(&self, cohort_id: u64) -> Vec<u64> {
        self.pool
            .range((cohort_id, u64::MIN)..=(cohort_id, u64::MAX))
            .filter(|(_, entry)| entry.is_active)
            .map(|(&(_, course_id), _)| course_id)
            .collect()
    }

    /// Active courses in the cohort's active pool
    pub fn pool_courses(&self, cohort_id: u64) -> Vec<&Course> {
        self.active_pool(cohort_id)
            .into_iter()
            .filter_map(|id| self.course(id))
            .filter(|course| course.is_active)
            .collect()
    }

    // ========================================================================
    // Allocation rows
    // ========================================================================

    /// Insert a row, enforcing uniqueness of `(student, course, round)`
    pub fn insert_allocation(&mut self, row: Allocation) -> Result<usize> {
        let key = row.key();
        if self.allocation_index.contains_key(&key) {
            return Err(AllocError::Storage(format!(
                "duplicate allocation row for student {} course {} round {}",
                key.student_id, key.course_id, key.round
            )));
        }
        let slot = self.allocations.insert(row);
        self.allocation_index.insert(key, slot);
        Ok(slot)
    }

    /// Remove every row of `round` belonging to the given students
    pub fn remove_round(&mut self, student_ids: &[u64], round: u32) -> usize {
        let students: HashSet<u64> = student_ids.iter().copied().collect();
        let doomed: Vec<(AllocationKey, usize)> = self
            .allocation_index
            .iter()
            .filter(|(key, _)| key.round == round && students.contains(&key.student_id))
            .map(|(key, slot)| (*key, *slot))
            .collect();

        for (key, slot) in &doomed {
            self.allocation_index.remove(key);
            self.allocations.remove(*slot);
        }
        doomed.len()
    }

    pub fn allocation(&self, key: &AllocationKey) -> Option<&Allocation> {
        self.allocation_index
            .get(key)
            .and_then(|slot| self.allocations.get(*slot))
    }

    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.allocations.iter().map(|(_, row)| row)
    }

    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Apply the staged writes of a run as one unit.
    ///
    /// Every check happens before the first mutation, so a failed commit
    /// leaves the registry exactly as it was. A staged seat matrix whose
    /// committed counterpart has different capacities, or is gone, fails
    /// the commit with `Storage`.
    pub fn apply(&mut self, writes: PendingWrites) -> Result<()> {
        let PendingWrites {
            cleared,
            seat_matrices,
            rows,
        } = writes;

        let mut surviving: HashSet<AllocationKey> = self.allocation_index.keys().copied().collect();
        if let Some((student_ids, round)) = &cleared {
            let students: HashSet<u64> = student_ids.iter().copied().collect();
            surviving.retain(|key| !(key.round == *round && students.contains(&key.student_id)));
        }
        for row in &rows {
            if !surviving.insert(row.key()) {
                return Err(AllocError::Storage(format!(
                    "commit would duplicate allocation row for student {} round {}",
                    row.student_id, row.round
                )));
            }
        }
        for (course_id, staged) in &seat_matrices {
            if !self.courses.contains_key(course_id) {
                return Err(AllocError::Storage(format!(
                    "commit references unknown course {course_id}"
                )));
            }
            // Capacities changed since the run read them; committing would revert them
            let current = self.seat_matrices.get(course_id).map(SeatMatrix::capacities);
            if current != Some(staged.capacities()) {
                return Err(AllocError::Storage(format!(
                    "seat matrix of course {course_id} changed during the run"
                )));
            }
        }

        if let Some((student_ids, round)) = cleared {
            let removed = self.remove_round(&student_ids, round);
            debug!(removed, round, "cleared previous round rows");
        }
        self.seat_matrices.extend(seat_matrices);
        for row in rows {
            self.insert_allocation(row)?;
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

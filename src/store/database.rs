//! Shared handle over the registry.
//!
//! ## Concurrency
//!
//! - Readers take the read lock and always see a fully committed round.
//! - A run holds a per-cohort guard for its whole duration. It takes the
//!   write lock before reading its snapshot and keeps it until the commit,
//!   so loader writes such as seat overrides land before or after a run,
//!   never between its snapshot and its commit.
//! - Preference submission validates and replaces under the write lock, so
//!   submissions for the same student are serialized.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::engine::{AllocationEngine, AllocationSummary};
use crate::error::{AllocError, Result};
use crate::report::{generate_report, Report};
use crate::seats::SeatMatrix;
use crate::store::{Registry, Transaction};
use crate::types::{Allocation, Category, Cohort, Course, PoolEntry, Preference, RunReceipt, Student};

/// Thread-safe entry point for loading data, submitting preferences,
/// running allocation rounds and reading results.
#[derive(Debug, Default)]
pub struct Database {
    registry: RwLock<Registry>,

    /// Cohorts with a run in flight
    active_runs: Mutex<HashSet<u64>>,

    engine: AllocationEngine,
}

/// Releases a cohort's run slot when dropped
struct RunGuard<'a> {
    active_runs: &'a Mutex<HashSet<u64>>,
    cohort_id: u64,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut runs) = self.active_runs.lock() {
            runs.remove(&self.cohort_id);
        }
    }
}

fn poisoned<T>(_: T) -> AllocError {
    AllocError::Storage("registry lock poisoned".to_string())
}

impl Database {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: RwLock::new(registry),
            active_runs: Mutex::new(HashSet::new()),
            engine: AllocationEngine::new(),
        }
    }

    /// Empty database using the configured reservation split
    pub fn with_config(config: &EngineConfig) -> Self {
        Self::new(Registry::with_split(config.reservation_split))
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Registry>> {
        self.registry.read().map_err(poisoned)
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Registry>> {
        self.registry.write().map_err(poisoned)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn insert_cohort(&self, cohort: Cohort) -> Result<()> {
        self.write()?.insert_cohort(cohort);
        Ok(())
    }

    pub fn insert_student(&self, student: Student) -> Result<()> {
        self.write()?.insert_student(student)
    }

    pub fn insert_course(&self, course: Course) -> Result<()> {
        self.write()?.insert_course(course)
    }

    pub fn add_to_pool(&self, course_id: u64, cohort_id: u64) -> Result<PoolEntry> {
        self.write()?.add_to_pool(course_id, cohort_id)
    }

    pub fn remove_from_pool(&self, course_id: u64, cohort_id: u64) -> Result<bool> {
        Ok(self.write()?.remove_from_pool(course_id, cohort_id))
    }

    pub fn set_course_active(&self, course_id: u64, active: bool) -> Result<()> {
        self.write()?.set_course_active(course_id, active)
    }

    pub fn override_seats<I>(&self, course_id: u64, seats: I) -> Result<SeatMatrix>
    where
        I: IntoIterator<Item = (Category, u32)>,
    {
        Ok(self.write()?.override_seats(course_id, seats)?.clone())
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Replace a student's ranked course list; see [`Registry::submit_preferences`]
    pub fn submit_preferences(
        &self,
        student_id: u64,
        course_ids: &[u64],
        submitted_at: u64,
    ) -> Result<Vec<Preference>> {
        self.write()?.submit_preferences(student_id, course_ids, submitted_at)
    }

    pub fn preferences_of(&self, student_id: u64) -> Result<Vec<Preference>> {
        Ok(self.read()?.preferences_of(student_id).to_vec())
    }

    pub fn clear_preferences(&self, student_id: u64) -> Result<bool> {
        Ok(self.write()?.clear_preferences(student_id))
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Run one allocation round for a cohort and commit it atomically.
    ///
    /// # Errors
    ///
    /// - `RunInProgress` if another run for the cohort has not finished
    /// - `Validation` / `NotFound` from the engine, with nothing committed
    /// - `Storage` if a lock is poisoned or the commit is rejected
    pub fn run_allocation(&self, cohort_id: u64, round: u32, timestamp: u64) -> Result<AllocationSummary> {
        let _guard = self.acquire_run(cohort_id, round)?;

        let mut registry = self.write()?;
        let (summary, writes) = {
            let mut tx = Transaction::begin(&registry);
            let summary = self.engine.run_allocation(&mut tx, cohort_id, round, timestamp)?;
            (summary, tx.into_writes())
        };

        if !writes.is_empty() {
            registry.apply(writes)?;
        }
        info!(cohort_id, round, "allocation round committed");
        Ok(summary)
    }

    fn acquire_run(&self, cohort_id: u64, round: u32) -> Result<RunGuard<'_>> {
        let mut runs = self.active_runs.lock().map_err(poisoned)?;
        if !runs.insert(cohort_id) {
            warn!(cohort_id, round, "rejected concurrent allocation run");
            return Err(AllocError::RunInProgress { cohort_id, round });
        }
        Ok(RunGuard {
            active_runs: &self.active_runs,
            cohort_id,
        })
    }

    /// True while a run for the cohort is in flight
    pub fn is_running(&self, cohort_id: u64) -> Result<bool> {
        Ok(self.active_runs.lock().map_err(poisoned)?.contains(&cohort_id))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// A student's row for `round`, or for their latest round when `None`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the student does not exist
    pub fn current_allocation(&self, student_id: u64, round: Option<u32>) -> Result<Option<Allocation>> {
        let registry = self.read()?;
        registry.require_student(student_id)?;
        Ok(registry.student_allocation(student_id, round).cloned())
    }

    pub fn report(&self, cohort_id: u64, round: u32) -> Result<Report> {
        let registry = self.read()?;
        generate_report(&registry, cohort_id, round)
    }

    pub fn receipt(&self, cohort_id: u64, round: u32, timestamp: u64) -> Result<RunReceipt> {
        self.read()?.seal_round(cohort_id, round, timestamp)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

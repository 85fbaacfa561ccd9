//! Allocation engine for elective seats.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same registry state always produces the same rows
//! 2. **Merit First**: Students are served strictly by descending marks
//! 3. **One-Way Fallback**: Reserved categories may overflow into GENERAL seats,
//!    GENERAL students never take reserved seats
//! 4. **Atomic Runs**: All writes are staged on a [`crate::store::Transaction`]
//!    and become visible together on commit
//!
//! ## Example
//!
//! ```
//! use elective_allot::engine::AllocationEngine;
//! use elective_allot::store::{Registry, Transaction};
//! use elective_allot::types::{Category, Cohort, Course, Student};
//! use rust_decimal::Decimal;
//!
//! let mut registry = Registry::new();
//! registry.insert_cohort(Cohort::new(1, "BSc 2024"));
//! registry
//!     .insert_course(Course::new(10, "PH-E1", "Optics", 2, 1, Decimal::ZERO))
//!     .unwrap();
//! registry.add_to_pool(10, 1).unwrap();
//! for (id, marks) in [(1, 91), (2, 78)] {
//!     let student = Student::new(id, 1, 1, Decimal::from(marks), Category::General);
//!     registry.insert_student(student).unwrap();
//!     registry.submit_preferences(id, &[10], 0).unwrap();
//! }
//!
//! let engine = AllocationEngine::new();
//! let (summary, writes) = {
//!     let mut tx = Transaction::begin(&registry);
//!     let summary = engine.run_allocation(&mut tx, 1, 1, 1_000).unwrap();
//!     (summary, tx.into_writes())
//! };
//! registry.apply(writes).unwrap();
//!
//! // One seat: the higher-merit student gets it, the other is waitlisted
//! assert_eq!(summary.allocated_count, 1);
//! assert_eq!(summary.waitlisted_count, 1);
//! ```

pub mod matcher;
pub mod summary;

pub use matcher::{AllocationEngine, StudentOutcome};
pub use summary::AllocationSummary;

use crate::error::Result;
use crate::store::{Registry, Transaction};

impl Registry {
    /// Run and commit one round directly on an exclusively owned registry.
    ///
    /// Shared callers go through [`crate::store::Database::run_allocation`],
    /// which adds run serialization and snapshot isolation.
    pub fn run_allocation(&mut self, cohort_id: u64, round: u32, timestamp: u64) -> Result<AllocationSummary> {
        let (summary, writes) = {
            let mut tx = Transaction::begin(self);
            let summary = AllocationEngine::new().run_allocation(&mut tx, cohort_id, round, timestamp)?;
            (summary, tx.into_writes())
        };
        self.apply(writes)?;
        Ok(summary)
    }
}

//! # Elective Allot
//!
//! Deterministic elective seat allocation by merit and reservation category.
//!
//! ## Architecture
//!
//! - **Types**: Core records (Student, Course, Preference, Allocation, RunReceipt)
//! - **Seats**: Per-course seat matrix with one bucket per category
//! - **Store**: Registry tables, run transactions and the shared Database handle
//! - **Preferences**: Validated, atomic replacement of ranked course lists
//! - **Engine**: Merit-ordered greedy matcher with GENERAL overflow
//! - **Report**: Read-side tabulation and queries
//! - **Advisory**: Pluggable suitability scores, never consulted by the engine
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical registry state produces identical rows and receipts
//! 2. **No Floating Point**: Marks and reservation math use `rust_decimal`
//! 3. **Atomic Rounds**: Readers see the previous round or the new one, never a mix
//! 4. **Synchronous Execution**: The matching pass is a single sequential loop

// ============================================================================
// Module declarations
// ============================================================================

/// Error taxonomy
pub mod error;

/// Core data types
pub mod types;

/// Seat buckets, matrices and reservation split
pub mod seats;

/// Registry, transactions and the shared database handle
pub mod store;

/// Preference submission and lookup
pub mod preferences;

/// Allocation engine
pub mod engine;

/// Reports and read-side queries
pub mod report;

/// Advisory suitability scoring
pub mod advisory;

/// Engine configuration and command line
pub mod config;

/// JSON cohort fixtures
pub mod fixture;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{AllocError, Result};
pub use types::{Allocation, AllocationStatus, Category, Cohort, Course, PoolEntry, Preference, RunReceipt, Student};
pub use seats::{ReservationSplit, SeatMatrix};
pub use store::{Database, Registry, Transaction};
pub use engine::{AllocationEngine, AllocationSummary, StudentOutcome};
pub use report::{generate_report, Report};
pub use config::EngineConfig;

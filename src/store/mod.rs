//! Storage for the allocation core.
//!
//! - [`Registry`]: plain in-memory tables, no locking
//! - [`Transaction`]: staged writes of one allocation run
//! - [`Database`]: shared handle with snapshot reads, atomic commits and
//!   per-cohort run serialization

pub mod database;
pub mod registry;
pub mod transaction;

pub use database::Database;
pub use registry::Registry;
pub use transaction::{PendingWrites, Transaction};

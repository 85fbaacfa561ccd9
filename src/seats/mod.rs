//! Seat ledger for the allocation engine.
//!
//! ## Components
//!
//! - [`SeatBucket`]: capacity and remaining count for one category of one course
//! - [`SeatMatrix`]: the five buckets of one course, indexed by category
//! - [`ReservationSplit`]: derives bucket capacities from a course's size and
//!   reservation percentage
//!
//! ## Lifecycle
//!
//! Capacities are fixed when a course is registered (or overridden by an
//! administrator). Remaining counts are reset at the start of every run and
//! decremented by the matcher; the decremented state becomes visible only
//! when the run commits.

pub mod bucket;
pub mod matrix;
pub mod split;

pub use bucket::SeatBucket;
pub use matrix::SeatMatrix;
pub use split::ReservationSplit;

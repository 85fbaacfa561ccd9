//! Core data types for the allocation engine
//!
//! ## Types
//!
//! - [`Category`]: Reservation category (closed enum with external labels)
//! - [`AllocationStatus`]: Outcome recorded on an allocation row
//! - [`Cohort`], [`Student`]: Read-only registry entities
//! - [`Course`], [`PoolEntry`]: Courses and cohort pool membership
//! - [`Preference`]: A ranked course choice
//! - [`Allocation`]: A row written by the engine (SSZ encoded)
//! - [`RunReceipt`]: Sealed summary of a committed round
//!
//! Merit and seat-share arithmetic lives in [`merit`].

mod allocation;
mod category;
mod course;
mod preference;
mod receipt;
mod student;
pub mod merit;

pub use allocation::{Allocation, AllocationKey};
pub use category::{AllocationStatus, Category};
pub use course::{Course, PoolEntry};
pub use preference::Preference;
pub use receipt::RunReceipt;
pub use student::{Cohort, Student};

//! A single category's seat ledger within a course.
//!
//! ## Invariant
//!
//! `0 <= remaining <= capacity` at all times. `capacity` is fixed when the
//! bucket is built; `remaining` moves down during a matching pass and is
//! restored by [`SeatBucket::reset`] at the start of every run.

use serde::{Deserialize, Serialize};

use crate::error::AllocError;
use crate::types::Category;

/// Seat counters for one category of one course.
///
/// Deserialization rejects `remaining > capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSeatBucket")]
pub struct SeatBucket {
    pub category: Category,

    /// Seats set aside for this category
    capacity: u32,

    /// Seats not yet taken in the current run
    remaining: u32,
}

/// Unchecked wire form of [`SeatBucket`]
#[derive(Deserialize)]
struct RawSeatBucket {
    category: Category,
    capacity: u32,
    remaining: u32,
}

impl TryFrom<RawSeatBucket> for SeatBucket {
    type Error = AllocError;

    fn try_from(raw: RawSeatBucket) -> Result<Self, Self::Error> {
        if raw.remaining > raw.capacity {
            return Err(AllocError::validation(format!(
                "{} bucket has {} remaining of {} seats",
                raw.category, raw.remaining, raw.capacity
            )));
        }
        Ok(Self {
            category: raw.category,
            capacity: raw.capacity,
            remaining: raw.remaining,
        })
    }
}

impl SeatBucket {
    /// Create a full bucket
    pub fn new(category: Category, capacity: u32) -> Self {
        Self {
            category,
            capacity,
            remaining: capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seats taken so far in this run
    #[inline]
    pub fn filled(&self) -> u32 {
        self.capacity - self.remaining
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining == 0
    }

    /// Restore every seat
    pub fn reset(&mut self) {
        self.remaining = self.capacity;
    }

    /// Take one seat if any is left
    ///
    /// # Returns
    ///
    /// `true` if a seat was taken, `false` if the bucket is exhausted
    pub fn try_take(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

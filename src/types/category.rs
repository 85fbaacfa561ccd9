//! Reservation categories and allocation statuses.
//!
//! ## Labels
//!
//! Both enums are closed at the data-model boundary. The string labels are
//! part of the external report contract and must round-trip unchanged:
//!
//! | Category | Label     | Code |
//! |----------|-----------|------|
//! | General  | `General` | 0    |
//! | Ews      | `EWS`     | 1    |
//! | Obc      | `OBC`     | 2    |
//! | Sc       | `SC`      | 3    |
//! | St       | `ST`      | 4    |
//!
//! The `u8` code is what allocation rows carry in their SSZ encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AllocError;

// ============================================================================
// Category enum
// ============================================================================

/// Reservation category governing quota-based seat access.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Category {
    /// Unreserved seats; also the overflow pool for reserved categories
    #[default]
    #[serde(rename = "General")]
    General,
    /// Economically weaker sections
    #[serde(rename = "EWS")]
    Ews,
    /// Other backward classes
    #[serde(rename = "OBC")]
    Obc,
    /// Scheduled castes
    #[serde(rename = "SC")]
    Sc,
    /// Scheduled tribes
    #[serde(rename = "ST")]
    St,
}

impl Category {
    /// Number of categories (and seat buckets per course)
    pub const COUNT: usize = 5;

    /// All categories in bucket order
    pub const ALL: [Category; Category::COUNT] = [
        Category::General,
        Category::Ews,
        Category::Obc,
        Category::Sc,
        Category::St,
    ];

    /// Bucket index inside a seat matrix
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        Category::ALL.get(value as usize).copied()
    }

    /// External label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Ews => "EWS",
            Category::Obc => "OBC",
            Category::Sc => "SC",
            Category::St => "ST",
        }
    }

    /// Parse an external label (exact match)
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Whether this category holds reserved (protected) seats
    #[inline]
    pub fn is_reserved(self) -> bool {
        self != Category::General
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s)
            .ok_or_else(|| AllocError::validation(format!("unknown reservation category '{s}'")))
    }
}

// ============================================================================
// AllocationStatus enum
// ============================================================================

/// Outcome recorded on an allocation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AllocationStatus {
    /// A seat was taken in the referenced course
    #[default]
    #[serde(rename = "Allocated")]
    Allocated,
    /// No preferred course had a seat; anchored to the first preference
    #[serde(rename = "Waitlisted")]
    Waitlisted,
    #[serde(rename = "Not Allocated")]
    NotAllocated,
}

impl AllocationStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            AllocationStatus::Allocated => 0,
            AllocationStatus::Waitlisted => 1,
            AllocationStatus::NotAllocated => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AllocationStatus::Allocated),
            1 => Some(AllocationStatus::Waitlisted),
            2 => Some(AllocationStatus::NotAllocated),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AllocationStatus::Allocated => "Allocated",
            AllocationStatus::Waitlisted => "Waitlisted",
            AllocationStatus::NotAllocated => "Not Allocated",
        }
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

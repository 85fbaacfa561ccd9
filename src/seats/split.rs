//! Splitting a course's capacity into category buckets.
//!
//! ```text
//! reserved = floor(max_capacity × reserved_percent / 100)
//! general  = max_capacity − reserved
//! sc       = floor(reserved × sc_ratio)     (default 0.25)
//! st       = floor(reserved × st_ratio)     (default 0.125)
//! obc      = floor(reserved × obc_ratio)    (default 0.45)
//! ews      = reserved − sc − st − obc       (absorbs rounding remainder)
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};
use crate::types::merit::{floor_share, percent_of};
use crate::types::Category;

/// Shares of the reserved seats handed to SC, ST and OBC.
/// EWS receives whatever is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationSplit {
    pub sc: Decimal,
    pub st: Decimal,
    pub obc: Decimal,
}

impl Default for ReservationSplit {
    fn default() -> Self {
        Self {
            sc: Decimal::new(25, 2),
            st: Decimal::new(125, 3),
            obc: Decimal::new(45, 2),
        }
    }
}

impl ReservationSplit {
    /// Every ratio in `[0, 1]` and their sum at most 1
    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [("sc", self.sc), ("st", self.st), ("obc", self.obc)] {
            if ratio < Decimal::ZERO || ratio > Decimal::ONE {
                return Err(AllocError::Config(format!(
                    "reservation ratio {name}={ratio} outside [0, 1]"
                )));
            }
        }
        if self.sc + self.st + self.obc > Decimal::ONE {
            return Err(AllocError::Config(
                "reservation ratios sum to more than 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-category seat counts indexed by [`Category::index`]
    ///
    /// # Errors
    ///
    /// `Validation` if `reserved_percent` is outside `0..=100`.
    ///
    /// ```
    /// use elective_allot::seats::ReservationSplit;
    /// use elective_allot::types::Category;
    /// use rust_decimal::Decimal;
    ///
    /// let seats = ReservationSplit::default().split(60, Decimal::from(50)).unwrap();
    /// assert_eq!(seats[Category::General.index()], 30);
    /// assert_eq!(seats.iter().sum::<u32>(), 60);
    /// ```
    pub fn split(&self, max_capacity: u32, reserved_percent: Decimal) -> Result<[u32; Category::COUNT]> {
        if reserved_percent < Decimal::ZERO || reserved_percent > Decimal::ONE_HUNDRED {
            return Err(AllocError::validation(format!(
                "reserved percent {reserved_percent} outside 0..=100"
            )));
        }

        let reserved = percent_of(max_capacity, reserved_percent);
        let mut seats = [0u32; Category::COUNT];
        seats[Category::General.index()] = max_capacity - reserved;

        if reserved > 0 {
            let sc = floor_share(reserved, self.sc);
            let st = floor_share(reserved, self.st);
            let obc = floor_share(reserved, self.obc);
            seats[Category::Sc.index()] = sc;
            seats[Category::St.index()] = st;
            seats[Category::Obc.index()] = obc;
            seats[Category::Ews.index()] = reserved.saturating_sub(sc + st + obc);
        }

        Ok(seats)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

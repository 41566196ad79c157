//! Fixed-point money.
//!
//! Registry payment exports carry amounts in minor units (kopecks). Amounts
//! stay integral end to end; the major-unit value only exists as formatting,
//! so `6_499_999` minor units is exactly `64999.99` and never rounds up.

use std::fmt;

use serde::{Serialize, Serializer};

/// A non-fractional count of minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Whole major units, e.g. `from_major(65000)` is 65000.00.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Parse a minor-unit integer string as found in payment exports.
    ///
    /// Returns `None` for blank or non-integer input.
    pub fn parse_minor(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        s.parse::<i64>().ok().map(Self)
    }

    /// `self - other`, floored at zero.
    pub fn shortfall_to(self, required: Amount) -> Amount {
        Amount(required.0.saturating_sub(self.0).max(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, WorkshopError};

/// Stroops per whole unit (7 decimal places).
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// A non-negative asset amount in stroops. Horizon renders amounts as decimal
/// strings with seven fractional digits; this type parses and displays that
/// form exactly.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_stroops(stroops: i64) -> Result<Self> {
        if stroops < 0 {
            return Err(WorkshopError::InvalidAmount(format!(
                "negative amount: {stroops} stroops"
            )));
        }
        Ok(Amount(stroops))
    }

    /// Whole units, e.g. `Amount::from_units(1000)` is "1000.0000000".
    pub fn from_units(units: i64) -> Result<Self> {
        let stroops = units.checked_mul(STROOPS_PER_UNIT).ok_or_else(|| {
            WorkshopError::InvalidAmount(format!("amount overflow: {units} units"))
        })?;
        Self::from_stroops(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| WorkshopError::InvalidAmount("amount overflow".into()))
    }

    pub fn checked_sub(&self, other: Amount) -> Result<Amount> {
        let v = self.0.checked_sub(other.0).ok_or_else(|| {
            WorkshopError::InvalidAmount("amount overflow".into())
        })?;
        Self::from_stroops(v)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:07}",
            self.0 / STROOPS_PER_UNIT,
            self.0 % STROOPS_PER_UNIT
        )
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl FromStr for Amount {
    type Err = WorkshopError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || WorkshopError::InvalidAmount(format!("malformed amount {s:?}"));
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if frac_part.len() > 7 {
            return Err(WorkshopError::InvalidAmount(format!(
                "amount {s:?} has more than 7 decimal places"
            )));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| malformed())?
        };
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| malformed())?
        };
        frac *= 10_i64.pow(7 - frac_part.len() as u32);
        let stroops = units
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| WorkshopError::InvalidAmount(format!("amount {s:?} overflows")))?;
        Amount::from_stroops(stroops)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

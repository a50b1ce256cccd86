use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WorkshopError};

/// Exchange rate as a reduced rational `n/d`, compared by cross
/// multiplication so no precision is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    pub fn new(n: i32, d: i32) -> Result<Self> {
        if n <= 0 || d <= 0 {
            return Err(WorkshopError::InvalidPrice(format!(
                "price must be positive, got {n}/{d}"
            )));
        }
        let g = gcd(n as i64, d as i64) as i32;
        Ok(Price { n: n / g, d: d / g })
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.n as i64 * other.d as i64).cmp(&(other.n as i64 * self.d as i64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

impl FromStr for Price {
    type Err = WorkshopError;

    /// Parses decimal strings such as "0.0001" (1/10000) or "10000" (10000/1).
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || WorkshopError::InvalidPrice(format!("malformed price {s:?}"));
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if (int_part.is_empty() && frac_part.is_empty())
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let d: i64 = 10_i64
            .checked_pow(frac_part.len() as u32)
            .filter(|d| *d <= i32::MAX as i64)
            .ok_or_else(malformed)?;
        let int: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| malformed())?
        };
        let frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| malformed())?
        };
        let n = int
            .checked_mul(d)
            .and_then(|v| v.checked_add(frac))
            .filter(|n| *n <= i32::MAX as i64)
            .ok_or_else(malformed)?;
        Price::new(n as i32, d as i32)
    }
}

/// Accepted price range for a liquidity pool deposit.
#[derive(Debug, Clone, Copy)]
pub struct PriceBand {
    pub min: Price,
    pub max: Price,
}

impl PriceBand {
    pub fn new(min: Price, max: Price) -> Result<Self> {
        if min > max {
            return Err(WorkshopError::InvalidPrice(format!(
                "inverted price band: {min} > {max}"
            )));
        }
        Ok(PriceBand { min, max })
    }

    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceBand {
    /// The wide-open band the workshop deposits use: 0.0001 to 10000.
    fn default() -> Self {
        PriceBand {
            min: Price { n: 1, d: 10_000 },
            max: Price { n: 10_000, d: 1 },
        }
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level and range value types.
//!
//! A [`Level`] is a percentage (0-100), a [`RangeValue`] is an integer
//! constrained to bounds declared by the sensor.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Level reading as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use status_cache::types::Level;
///
/// let level = Level::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert!(Level::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Minimum level (0%).
    pub const MIN: Self = Self(0);

    /// Maximum level (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a level, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Level {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl FromStr for Level {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValueError::InvalidNumber(s.to_string()))?;
        let value = u8::try_from(raw).map_err(|_| ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: raw,
        })?;
        Self::new(value)
    }
}

/// Integer reading constrained to sensor-declared bounds.
///
/// # Examples
///
/// ```
/// use status_cache::types::RangeValue;
///
/// let temp = RangeValue::new(21, -40, 60).unwrap();
/// assert_eq!(temp.value(), 21);
///
/// assert!(RangeValue::new(61, -40, 60).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawRange")]
pub struct RangeValue {
    value: i64,
    min: i64,
    max: i64,
}

impl RangeValue {
    /// Creates a value within `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidBounds` if `min > max`, or
    /// `ValueError::OutOfRange` if the value lies outside the bounds.
    pub fn new(value: i64, min: i64, max: i64) -> Result<Self, ValueError> {
        if min > max {
            return Err(ValueError::InvalidBounds { min, max });
        }
        if !(min..=max).contains(&value) {
            return Err(ValueError::OutOfRange {
                min,
                max,
                actual: value,
            });
        }
        Ok(Self { value, min, max })
    }

    /// Parses a raw reading against the given bounds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidNumber` if the reading is not an integer,
    /// otherwise the same errors as [`RangeValue::new`].
    pub fn parse(raw: &str, min: i64, max: i64) -> Result<Self, ValueError> {
        let value = raw
            .trim()
            .parse()
            .map_err(|_| ValueError::InvalidNumber(raw.to_string()))?;
        Self::new(value, min, max)
    }

    /// Returns the reading.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> i64 {
        self.max
    }
}

/// Unchecked wire form of a [`RangeValue`].
#[derive(serde::Deserialize)]
struct RawRange {
    value: i64,
    min: i64,
    max: i64,
}

impl TryFrom<RawRange> for RangeValue {
    type Error = ValueError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.value, raw.min, raw.max)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

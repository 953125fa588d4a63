// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor identifier type.

use std::fmt;

/// Identifier of a sensor.
///
/// IDs are assigned by the integration that creates the sensor and are
/// unique within one [`StatusCache`](crate::StatusCache).
///
/// # Examples
///
/// ```
/// use status_cache::types::SensorId;
///
/// let id = SensorId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SensorId(u32);

impl SensorId {
    /// Creates a sensor ID from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SensorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        assert!(SensorId::new(1) < SensorId::new(2));
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&SensorId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}

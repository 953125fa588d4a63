// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensors feeding the status cache.
//!
//! Sensors are created by device integrations and registered once into a
//! [`StatusCache`](crate::StatusCache). The cache keeps a reference to each
//! registered sensor only so that it can call [`Sensor::stop`] at shutdown.
//!
//! [`StateSensor`] is a ready-made sensor that maps raw string readings to
//! custom state events through a [`DistinctStates`] table.

mod registry;
mod state_sensor;

pub use registry::SensorRegistry;
pub use state_sensor::{DistinctStates, StateSensor};

use crate::error::SensorError;
use crate::types::SensorId;

/// Value shape a sensor reports.
///
/// The type determines which [`EventValue`](crate::event::EventValue) variant
/// a raw reading parses into. The cache itself does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorType {
    /// On/off switch.
    Switch,
    /// Percentage level (0-100).
    Level,
    /// Integer within declared bounds.
    Range {
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },
    /// Free-form state.
    Custom,
}

/// A named, uniquely identified source of values.
///
/// Implementations must be shareable across threads: the cache stops them
/// from whichever thread calls [`StatusCache::shutdown`](crate::StatusCache::shutdown).
pub trait Sensor: Send + Sync {
    /// Returns the externally assigned sensor ID.
    fn id(&self) -> SensorId;

    /// Returns the unique sensor name.
    fn name(&self) -> &str;

    /// Returns the value shape this sensor reports.
    fn sensor_type(&self) -> SensorType;

    /// Stops producing values.
    ///
    /// Called while the cache holds its exclusive section, so it must not
    /// block on an update to the same cache.
    ///
    /// # Errors
    ///
    /// Returns a `SensorError` if the implementation could not stop cleanly.
    /// The cache logs the failure and continues stopping other sensors.
    fn stop(&self) -> Result<(), SensorError>;
}

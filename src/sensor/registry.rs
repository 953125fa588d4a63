// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of sensors known to a cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::types::SensorId;

use super::Sensor;

/// ID-keyed set of registered sensors.
///
/// The registry holds shared references only; it exists to drive
/// [`Sensor::stop`] at shutdown. It performs no locking of its own and is
/// mutated from the cache's exclusive section.
#[derive(Default)]
pub struct SensorRegistry {
    sensors: HashMap<SensorId, Arc<dyn Sensor>>,
}

impl SensorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sensor.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateSensorId` if a sensor with the same ID is
    /// already registered. The existing entry is left untouched.
    pub fn insert(&mut self, sensor: Arc<dyn Sensor>) -> Result<(), Error> {
        match self.sensors.entry(sensor.id()) {
            Entry::Occupied(_) => Err(Error::DuplicateSensorId(sensor.id())),
            Entry::Vacant(slot) => {
                slot.insert(sensor);
                Ok(())
            }
        }
    }

    /// Returns the sensor registered under `id`.
    #[must_use]
    pub fn get(&self, id: SensorId) -> Option<Arc<dyn Sensor>> {
        self.sensors.get(&id).cloned()
    }

    /// Returns the number of registered sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns `true` if no sensors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Stops every registered sensor.
    ///
    /// A failing sensor is logged and does not prevent the others from being
    /// stopped. Returns the number of sensors that failed to stop.
    pub fn stop_all(&self) -> usize {
        let mut failures = 0;
        for (id, sensor) in &self.sensors {
            if let Err(e) = sensor.stop() {
                failures += 1;
                tracing::error!(sensor_id = %id, sensor = sensor.name(), error = %e, "Failed to stop sensor");
            }
        }
        failures
    }

    /// Removes every sensor.
    pub fn clear(&mut self) {
        self.sensors.clear();
    }
}

impl fmt::Debug for SensorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.sensors.keys().copied().collect();
        ids.sort();
        f.debug_struct("SensorRegistry").field("sensors", &ids).finish()
    }
}

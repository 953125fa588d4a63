// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor with a fixed set of distinct states.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::cache::StatusCache;
use crate::error::SensorError;
use crate::event::{Event, is_unknown_sensor_value};
use crate::types::SensorId;

use super::{Sensor, SensorType};

/// Set of states a [`StateSensor`] accepts, with optional value mappings.
///
/// # Examples
///
/// ```
/// use status_cache::sensor::DistinctStates;
///
/// let states = DistinctStates::new()
///     .with_state("idle")
///     .with_mapping("1", "open")
///     .with_mapping("0", "closed");
///
/// assert!(states.has_state("idle"));
/// assert_eq!(states.mapping("1"), Some("open"));
/// assert_eq!(states.mapping("idle"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctStates {
    states: BTreeMap<String, Option<String>>,
}

impl DistinctStates {
    /// Creates an empty state set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state reported as-is.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.states.insert(state.into(), None);
        self
    }

    /// Adds a state that is reported as `mapping`.
    #[must_use]
    pub fn with_mapping(mut self, state: impl Into<String>, mapping: impl Into<String>) -> Self {
        self.states.insert(state.into(), Some(mapping.into()));
        self
    }

    /// Returns `true` if `value` is a declared state.
    #[must_use]
    pub fn has_state(&self, value: &str) -> bool {
        self.states.contains_key(value)
    }

    /// Returns the mapped value for a declared state, if it has one.
    #[must_use]
    pub fn mapping(&self, value: &str) -> Option<&str> {
        self.states.get(value).and_then(Option::as_deref)
    }
}

/// Sensor reporting one of a fixed set of string states.
///
/// Raw readings are converted to custom state events: declared states pass
/// through (or are replaced by their mapping), the unknown marker becomes an
/// unknown event, and undeclared values become unknown under strict mapping
/// or pass through unchanged otherwise.
///
/// The sensor is bound to a cache with [`StateSensor::start`]; readings
/// delivered while it is not running are ignored.
///
/// # Examples
///
/// ```
/// use status_cache::sensor::{DistinctStates, StateSensor};
/// use status_cache::types::SensorId;
///
/// let sensor = StateSensor::new(
///     SensorId::new(5),
///     "front-door",
///     DistinctStates::new().with_mapping("1", "open").with_mapping("0", "closed"),
/// );
///
/// assert_eq!(sensor.process("1").serialize(), "open");
/// assert!(sensor.process("ajar").is_unknown());
/// ```
#[derive(Debug)]
pub struct StateSensor {
    id: SensorId,
    name: String,
    states: DistinctStates,
    strict_mapping: bool,
    cache: RwLock<Option<Weak<StatusCache>>>,
}

impl StateSensor {
    /// Creates a sensor with strict state mapping.
    #[must_use]
    pub fn new(id: SensorId, name: impl Into<String>, states: DistinctStates) -> Self {
        Self {
            id,
            name: name.into(),
            states,
            strict_mapping: true,
            cache: RwLock::new(None),
        }
    }

    /// Sets whether undeclared values are rejected as unknown.
    #[must_use]
    pub fn with_strict_mapping(mut self, strict: bool) -> Self {
        self.strict_mapping = strict;
        self
    }

    /// Converts a raw reading into an event for this sensor.
    #[must_use]
    pub fn process(&self, raw: &str) -> Event {
        if !self.states.has_state(raw) {
            if is_unknown_sensor_value(raw) {
                return Event::unknown(self.id, &self.name);
            }
            if self.strict_mapping {
                tracing::warn!(
                    sensor_id = %self.id,
                    value = raw,
                    "Value is not a declared state, reporting unknown"
                );
                return Event::unknown(self.id, &self.name);
            }
            return Event::custom_state(self.id, &self.name, raw);
        }

        match self.states.mapping(raw) {
            Some(mapped) => Event::mapped_state(self.id, &self.name, mapped, raw),
            None => Event::custom_state(self.id, &self.name, raw),
        }
    }

    /// Binds the sensor to a cache so readings are delivered to it.
    ///
    /// The cache is held weakly; dropping it stops delivery.
    pub fn start(&self, cache: &Arc<StatusCache>) {
        *self.cache.write() = Some(Arc::downgrade(cache));
        tracing::debug!(sensor_id = %self.id, "State sensor started");
    }

    /// Returns `true` while the sensor is bound to a live cache.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.cache
            .read()
            .as_ref()
            .is_some_and(|cache| cache.strong_count() > 0)
    }

    /// Processes a raw reading and delivers it to the bound cache.
    ///
    /// Returns `true` if the cache committed a change.
    pub fn update(&self, raw: &str) -> bool {
        let cache = self.cache.read().as_ref().and_then(Weak::upgrade);
        let Some(cache) = cache else {
            tracing::debug!(sensor_id = %self.id, "Ignoring update, sensor is not running");
            return false;
        };
        let event = self.process(raw);
        tracing::trace!(sensor_id = %self.id, raw, event = %event, "Processed reading");
        cache.update(event)
    }
}

impl Sensor for StateSensor {
    fn id(&self) -> SensorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn sensor_type(&self) -> SensorType {
        SensorType::Custom
    }

    fn stop(&self) -> Result<(), SensorError> {
        if self.cache.write().take().is_none() {
            tracing::debug!(sensor_id = %self.id, "State sensor already stopped");
        }
        Ok(())
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor event and value types.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::ValueError;
use crate::sensor::SensorType;
use crate::types::{Level, RangeValue, SensorId, SwitchState};

/// Serialized form of a value that has never been observed.
pub const UNKNOWN_STATUS: &str = "N/A";

/// Returns `true` if a raw reading is the unknown-status marker.
#[must_use]
pub fn is_unknown_sensor_value(value: &str) -> bool {
    value == UNKNOWN_STATUS
}

/// Typed payload of an [`Event`].
///
/// Each variant carries the value shape of one sensor type. Equality between
/// values is checked with [`EventValue::is_equal`], which compares what the
/// sensor reports rather than incidental metadata.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventValue {
    /// On/off state of a switch.
    Switch(SwitchState),

    /// Percentage level.
    Level(Level),

    /// Bounded integer reading.
    Range(RangeValue),

    /// Free-form state, optionally mapped from a raw device value.
    CustomState {
        /// The (possibly mapped) state.
        value: String,
        /// The raw value before mapping, if a mapping was applied.
        original: Option<String>,
    },

    /// No value observed yet.
    Unknown,
}

impl EventValue {
    /// Creates a custom state value without a mapping.
    #[must_use]
    pub fn custom(value: impl Into<String>) -> Self {
        Self::CustomState {
            value: value.into(),
            original: None,
        }
    }

    /// Parses a raw reading into the value shape of `sensor_type`.
    ///
    /// The unknown-status marker always parses to [`EventValue::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns a `ValueError` if the reading is not valid for the sensor type.
    ///
    /// # Examples
    ///
    /// ```
    /// use status_cache::event::EventValue;
    /// use status_cache::sensor::SensorType;
    /// use status_cache::types::SwitchState;
    ///
    /// let value = EventValue::parse(&SensorType::Switch, "on").unwrap();
    /// assert_eq!(value, EventValue::Switch(SwitchState::On));
    ///
    /// let unknown = EventValue::parse(&SensorType::Switch, "N/A").unwrap();
    /// assert!(unknown.is_unknown());
    /// ```
    pub fn parse(sensor_type: &SensorType, raw: &str) -> Result<Self, ValueError> {
        if is_unknown_sensor_value(raw) {
            return Ok(Self::Unknown);
        }
        match sensor_type {
            SensorType::Switch => Ok(Self::Switch(raw.parse()?)),
            SensorType::Level => Ok(Self::Level(raw.parse()?)),
            SensorType::Range { min, max } => Ok(Self::Range(RangeValue::parse(raw, *min, *max)?)),
            SensorType::Custom => Ok(Self::custom(raw)),
        }
    }

    /// Returns `true` if this is the unknown sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Compares two values by what the sensor reports.
    ///
    /// Range readings compare their numeric value, custom states compare the
    /// mapped state and ignore the original raw value.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Switch(a), Self::Switch(b)) => a == b,
            (Self::Level(a), Self::Level(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a.value() == b.value(),
            (Self::CustomState { value: a, .. }, Self::CustomState { value: b, .. }) => a == b,
            (Self::Unknown, Self::Unknown) => true,
            _ => false,
        }
    }

    /// Returns the serialized string form of the value.
    #[must_use]
    pub fn serialize(&self) -> String {
        match self {
            Self::Switch(state) => state.as_str().to_string(),
            Self::Level(level) => level.to_string(),
            Self::Range(range) => range.to_string(),
            Self::CustomState { value, .. } => value.clone(),
            Self::Unknown => UNKNOWN_STATUS.to_string(),
        }
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// An immutable value update for exactly one sensor.
///
/// # Examples
///
/// ```
/// use status_cache::event::Event;
/// use status_cache::types::{SensorId, SwitchState};
///
/// let first = Event::switch(SensorId::new(42), "kitchen-switch", SwitchState::Off);
/// let second = Event::switch(SensorId::new(42), "kitchen-switch", SwitchState::Off);
///
/// // Timestamps differ, values do not
/// assert!(first.is_equal(&second));
/// assert_eq!(first.serialize(), "off");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    source_id: SensorId,
    source_name: String,
    value: EventValue,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(source_id: SensorId, source_name: impl Into<String>, value: EventValue) -> Self {
        Self {
            source_id,
            source_name: source_name.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    /// Creates the "never yet observed" event for a sensor.
    #[must_use]
    pub fn unknown(source_id: SensorId, source_name: impl Into<String>) -> Self {
        Self::new(source_id, source_name, EventValue::Unknown)
    }

    /// Creates a switch event.
    #[must_use]
    pub fn switch(source_id: SensorId, source_name: impl Into<String>, state: SwitchState) -> Self {
        Self::new(source_id, source_name, EventValue::Switch(state))
    }

    /// Creates a level event.
    #[must_use]
    pub fn level(source_id: SensorId, source_name: impl Into<String>, level: Level) -> Self {
        Self::new(source_id, source_name, EventValue::Level(level))
    }

    /// Creates a range event.
    #[must_use]
    pub fn range(source_id: SensorId, source_name: impl Into<String>, value: RangeValue) -> Self {
        Self::new(source_id, source_name, EventValue::Range(value))
    }

    /// Creates a custom state event.
    #[must_use]
    pub fn custom_state(
        source_id: SensorId,
        source_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(source_id, source_name, EventValue::custom(value))
    }

    /// Creates a custom state event whose value was mapped from `original`.
    #[must_use]
    pub fn mapped_state(
        source_id: SensorId,
        source_name: impl Into<String>,
        value: impl Into<String>,
        original: impl Into<String>,
    ) -> Self {
        Self::new(
            source_id,
            source_name,
            EventValue::CustomState {
                value: value.into(),
                original: Some(original.into()),
            },
        )
    }

    /// Returns a copy of this event carrying a different value.
    ///
    /// Source and timestamp are preserved.
    #[must_use]
    pub fn with_value(&self, value: EventValue) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    /// Overrides the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the ID of the sensor that produced this event.
    #[must_use]
    pub fn source_id(&self) -> SensorId {
        self.source_id
    }

    /// Returns the name of the sensor that produced this event.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Returns the typed value.
    #[must_use]
    pub fn value(&self) -> &EventValue {
        &self.value
    }

    /// Returns when the event was created.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns `true` if this is the unknown sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.value.is_unknown()
    }

    /// Returns the serialized value.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.value.serialize()
    }

    /// Value-level equality: same source and an equal value.
    ///
    /// Timestamps are ignored.
    #[must_use]
    pub fn is_equal(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.source_name == other.source_name
            && self.value.is_equal(&other.value)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) = {}",
            self.source_name, self.source_id, self.value
        )
    }
}

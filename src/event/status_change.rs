// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Committed status change notification.

use crate::types::SensorId;

use super::Event;

/// A value change committed to the cache.
///
/// Published on the [`StatusEventBus`](super::StatusEventBus) after the value
/// store and the change table have both been updated.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusChange {
    /// The value that was replaced, if the sensor had one.
    pub previous: Option<Event>,
    /// The committed event.
    pub current: Event,
}

impl StatusChange {
    /// Creates a change notification.
    #[must_use]
    pub fn new(previous: Option<Event>, current: Event) -> Self {
        Self { previous, current }
    }

    /// Returns the ID of the sensor that changed.
    #[must_use]
    pub fn sensor_id(&self) -> SensorId {
        self.current.source_id()
    }

    /// Returns `true` if this is the first known value for the sensor.
    #[must_use]
    pub fn is_first_value(&self) -> bool {
        self.previous.as_ref().is_none_or(Event::is_unknown)
    }
}

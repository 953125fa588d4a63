// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor events and change notifications.
//!
//! An [`Event`] is an immutable reading for one sensor. While it is being
//! committed it travels inside an [`EventContext`] through the processor
//! chain. Once committed, a [`StatusChange`] is published on the
//! [`StatusEventBus`].
//!
//! # Examples
//!
//! ```
//! use status_cache::event::{Event, EventValue};
//! use status_cache::types::{Level, SensorId};
//!
//! let event = Event::level(SensorId::new(7), "dimmer", Level::new(40).unwrap());
//! assert_eq!(event.value(), &EventValue::Level(Level::new(40).unwrap()));
//! ```

mod context;
mod event_bus;
mod sensor_event;
mod status_change;

pub use context::EventContext;
pub use event_bus::{DEFAULT_CHANNEL_CAPACITY, StatusEventBus};
pub use sensor_event::{Event, EventValue, UNKNOWN_STATUS, is_unknown_sensor_value};
pub use status_change::StatusChange;

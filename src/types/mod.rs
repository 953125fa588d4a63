// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types carried by sensor events.
//!
//! Each type ensures values are within their valid ranges at construction
//! time, so an [`Event`](crate::event::Event) never holds an out-of-range
//! reading.
//!
//! # Types
//!
//! - [`SensorId`] - Externally assigned sensor identifier
//! - [`SwitchState`] - On/Off state of a switch sensor
//! - [`Level`] - Percentage reading (0-100)
//! - [`RangeValue`] - Integer reading within sensor-declared bounds

mod level;
mod sensor_id;
mod switch;

pub use level::{Level, RangeValue};
pub use sensor_id::SensorId;
pub use switch::SwitchState;

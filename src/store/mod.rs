// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Current-value store for registered sensors.
//!
//! [`SensorValueStore`] is the authoritative map of sensor ID to the last
//! committed [`Event`](crate::event::Event), plus a name to ID index. Both
//! maps are lock-sharded, so reads never wait for the cache's exclusive
//! section.

mod snapshot;
mod value_store;

pub use snapshot::StateSnapshot;
pub use value_store::SensorValueStore;

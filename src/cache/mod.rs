// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The status cache facade.
//!
//! [`StatusCache`] composes the [`SensorValueStore`](crate::store::SensorValueStore),
//! the [`ChangedStatusTable`](crate::tracker::ChangedStatusTable) and the
//! [`EventProcessorChain`](crate::processor::EventProcessorChain), and drives
//! them through the [`CacheState`] lifecycle.

mod config;
mod state;
mod status_cache;

pub use config::{CacheConfig, DEFAULT_MAX_POLL_TIMEOUT, DEFAULT_POLL_TIMEOUT};
pub use state::CacheState;
pub use status_cache::StatusCache;

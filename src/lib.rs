// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status Cache - last-known sensor values with long-poll change notification.
//!
//! This library keeps the most recent value of every registered sensor in
//! memory and lets clients block until one of the sensors they watch
//! changes.
//!
//! # Features
//!
//! - **Value store**: Last event per sensor, unknown until first write
//! - **Change deduplication**: Updates equal to the current value are ignored
//! - **Long-poll**: Per-session change records with timeout and shutdown wake-up
//! - **Processor chain**: Events can be rewritten or dropped before they commit
//! - **Status bus**: Async broadcast of every committed change
//!
//! # Quick Start
//!
//! ```
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use status_cache::event::Event;
//! use status_cache::processor::EventProcessorChain;
//! use status_cache::sensor::{DistinctStates, StateSensor};
//! use status_cache::tracker::PollingKey;
//! use status_cache::types::{SensorId, SwitchState};
//! use status_cache::{CacheConfig, StatusCache};
//!
//! # fn main() -> status_cache::Result<()> {
//! let cache = Arc::new(StatusCache::new(CacheConfig::default(), EventProcessorChain::new()));
//! cache.start()?;
//!
//! let id = SensorId::new(42);
//! let sensor = Arc::new(StateSensor::new(
//!     id,
//!     "kitchen-switch",
//!     DistinctStates::new().with_state("on").with_state("off"),
//! ));
//! cache.register_sensor(sensor)?;
//!
//! let key = PollingKey::from("p1");
//! let ids: BTreeSet<_> = [id].into();
//!
//! // First poll registers the session and times out
//! let result = cache.wait_for_changes(&key, &ids, Some(Duration::from_millis(10)));
//! assert!(result.is_timed_out());
//!
//! // A committed change is returned by the next poll without blocking
//! cache.update(Event::switch(id, "kitchen-switch", SwitchState::On));
//! let result = cache.wait_for_changes(&key, &ids, Some(Duration::from_secs(5)));
//! assert!(result.is_changed());
//! assert!(result.changed.contains(&id));
//!
//! cache.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! # Async Pollers
//!
//! [`StatusCache::poll_changes`] runs the blocking wait on tokio's blocking
//! pool, and [`StatusCache::subscribe`] hands out a broadcast receiver for
//! every committed [`StatusChange`](event::StatusChange).

pub mod cache;
pub mod error;
pub mod event;
pub mod processor;
pub mod sensor;
pub mod store;
pub mod tracker;
pub mod types;

pub use cache::{CacheConfig, CacheState, StatusCache};
pub use error::{Error, ProcessorError, Result, SensorError, ValueError};
pub use event::{Event, EventValue, StatusChange, UNKNOWN_STATUS};
pub use sensor::{Sensor, SensorType};
pub use tracker::{PollResult, PollingKey, WakeReason};
pub use types::{Level, RangeValue, SensorId, SwitchState};

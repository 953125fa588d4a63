// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status cache configuration.

use std::time::Duration;

use crate::error::Error;
use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// Default long-poll timeout when the caller does not supply one.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(50);

/// Default upper bound on caller-supplied long-poll timeouts.
pub const DEFAULT_MAX_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a [`StatusCache`](super::StatusCache).
///
/// Durations are expressed in milliseconds when (de)serialized. Missing
/// fields take their defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use status_cache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_default_poll_timeout(Duration::from_secs(30))
///     .with_event_bus_capacity(1024);
///
/// let parsed = CacheConfig::from_json(r#"{ "default_poll_timeout": 30000 }"#).unwrap();
/// assert_eq!(parsed.default_poll_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Timeout applied when a poller passes none (or zero).
    #[serde(with = "millis")]
    pub default_poll_timeout: Duration,
    /// Largest timeout a poller may request.
    #[serde(with = "millis")]
    pub max_poll_timeout: Duration,
    /// Buffer size of the status change broadcast bus.
    pub event_bus_capacity: usize,
}

impl CacheConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the default long-poll timeout.
    #[must_use]
    pub fn with_default_poll_timeout(mut self, timeout: Duration) -> Self {
        self.default_poll_timeout = timeout;
        self
    }

    /// Sets the maximum long-poll timeout.
    #[must_use]
    pub fn with_max_poll_timeout(mut self, timeout: Duration) -> Self {
        self.max_poll_timeout = timeout;
        self
    }

    /// Sets the status bus capacity.
    #[must_use]
    pub fn with_event_bus_capacity(mut self, capacity: usize) -> Self {
        self.event_bus_capacity = capacity;
        self
    }

    /// Resolves the timeout to use for one poll.
    ///
    /// `None` or zero selects the default; anything above the maximum is
    /// clamped to it.
    #[must_use]
    pub fn effective_poll_timeout(&self, requested: Option<Duration>) -> Duration {
        let timeout = match requested {
            Some(t) if !t.is_zero() => t,
            _ => self.default_poll_timeout,
        };
        timeout.min(self.max_poll_timeout)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_poll_timeout: DEFAULT_POLL_TIMEOUT,
            max_poll_timeout: DEFAULT_MAX_POLL_TIMEOUT,
            event_bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

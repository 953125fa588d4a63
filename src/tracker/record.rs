// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-session changed-status record.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::types::SensorId;

/// Upper bound on a single wait, whatever the caller asks for.
const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Key identifying one polling session.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
///
/// use status_cache::tracker::PollingKey;
/// use status_cache::types::SensorId;
///
/// let ids: BTreeSet<_> = [SensorId::new(2), SensorId::new(1)].into();
/// let key = PollingKey::for_client("panel-7", &ids);
/// assert_eq!(key.as_str(), "panel-7:1,2");
///
/// let explicit = PollingKey::from("p1");
/// assert_eq!(explicit.to_string(), "p1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PollingKey(String);

impl PollingKey {
    /// Creates a key from an explicit string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives a key from the client identity and its sensor set.
    ///
    /// The same client polling the same set always gets the same key.
    #[must_use]
    pub fn for_client(client: &str, sensor_ids: &BTreeSet<SensorId>) -> Self {
        let ids: Vec<String> = sensor_ids.iter().map(ToString::to_string).collect();
        Self(format!("{client}:{}", ids.join(",")))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PollingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PollingKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for PollingKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Why a waiter returned from [`ChangedStatusRecord::wait_for_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// A polled sensor changed.
    Changed,
    /// The timeout elapsed with no change.
    TimedOut,
    /// The cache shut down.
    Shutdown,
    /// The record was replaced or removed from its table.
    Released,
}

/// Outcome of a long-poll wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    /// Sensors that changed since the session last consumed its changes.
    pub changed: BTreeSet<SensorId>,
    /// Why the wait ended.
    pub reason: WakeReason,
}

impl PollResult {
    /// Returns `true` if the wait ended because of a real change.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.reason == WakeReason::Changed
    }

    /// Returns `true` if the wait ended on timeout.
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.reason == WakeReason::TimedOut
    }

    /// Returns `true` if the record was closed by shutdown or release.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.reason, WakeReason::Shutdown | WakeReason::Released)
    }
}

#[derive(Debug, Default)]
struct RecordState {
    changed: BTreeSet<SensorId>,
    closed: Option<WakeReason>,
}

/// Bookkeeping for one polling session.
///
/// Holds the immutable set of sensors the session polls and the set of those
/// that changed since the session last consumed them. The changed set is
/// always a subset of the polled set.
///
/// Each record has its own lock and condition variable, independent of every
/// other record and of the cache's exclusive section.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use status_cache::tracker::{ChangedStatusRecord, WakeReason};
/// use status_cache::types::SensorId;
///
/// let record = ChangedStatusRecord::new("p1".into(), [SensorId::new(42)].into());
/// record.mark_changed(SensorId::new(42));
///
/// let result = record.wait_for_changes(Duration::from_millis(10));
/// assert_eq!(result.reason, WakeReason::Changed);
/// assert!(result.changed.contains(&SensorId::new(42)));
/// ```
#[derive(Debug)]
pub struct ChangedStatusRecord {
    key: PollingKey,
    polling_ids: BTreeSet<SensorId>,
    state: Mutex<RecordState>,
    condvar: Condvar,
}

impl ChangedStatusRecord {
    /// Creates a record with an empty changed set.
    #[must_use]
    pub fn new(key: PollingKey, polling_ids: BTreeSet<SensorId>) -> Self {
        Self {
            key,
            polling_ids,
            state: Mutex::new(RecordState::default()),
            condvar: Condvar::new(),
        }
    }

    /// Returns the session key.
    #[must_use]
    pub fn key(&self) -> &PollingKey {
        &self.key
    }

    /// Returns the sensors this session polls.
    #[must_use]
    pub fn polling_sensor_ids(&self) -> &BTreeSet<SensorId> {
        &self.polling_ids
    }

    /// Returns `true` if this session polls `id`.
    #[must_use]
    pub fn is_polling(&self, id: SensorId) -> bool {
        self.polling_ids.contains(&id)
    }

    /// Returns a copy of the changed set without consuming it.
    #[must_use]
    pub fn changed_sensor_ids(&self) -> BTreeSet<SensorId> {
        self.state.lock().changed.clone()
    }

    /// Returns `true` if any polled sensor changed since the last consume.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.state.lock().changed.is_empty()
    }

    /// Records a change and wakes every waiter on this record.
    ///
    /// Sensors outside the polled set are ignored; returns whether the change
    /// was recorded.
    pub fn mark_changed(&self, id: SensorId) -> bool {
        if !self.is_polling(id) {
            return false;
        }
        self.state.lock().changed.insert(id);
        self.condvar.notify_all();
        true
    }

    /// Clears the changed set without waking anyone.
    pub fn reset(&self) {
        self.state.lock().changed.clear();
    }

    /// Closes the record and wakes every waiter.
    ///
    /// Only the first close takes effect; returns whether this call closed it.
    pub fn close(&self, reason: WakeReason) -> bool {
        let mut state = self.state.lock();
        if state.closed.is_some() {
            return false;
        }
        state.closed = Some(reason);
        drop(state);
        self.condvar.notify_all();
        true
    }

    /// Returns `true` once the record has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed.is_some()
    }

    /// Blocks until a polled sensor changes, the record is closed, or
    /// `timeout` elapses.
    ///
    /// Pending changes are returned immediately without blocking. The
    /// returned changed set is consumed: the record starts accumulating
    /// afresh. The check and the wait happen under the same lock, so a change
    /// recorded between them cannot be missed.
    #[must_use]
    pub fn wait_for_changes(&self, timeout: Duration) -> PollResult {
        let deadline = Instant::now() + timeout.min(MAX_WAIT);
        let mut state = self.state.lock();
        loop {
            if let Some(reason) = state.closed {
                return PollResult {
                    changed: mem::take(&mut state.changed),
                    reason,
                };
            }
            if !state.changed.is_empty() {
                return PollResult {
                    changed: mem::take(&mut state.changed),
                    reason: WakeReason::Changed,
                };
            }
            if self.condvar.wait_until(&mut state, deadline).timed_out() {
                let changed = mem::take(&mut state.changed);
                let reason = match state.closed {
                    Some(reason) => reason,
                    None if !changed.is_empty() => WakeReason::Changed,
                    None => WakeReason::TimedOut,
                };
                return PollResult { changed, reason };
            }
        }
    }
}

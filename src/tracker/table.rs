// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table of changed-status records.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::SensorId;

use super::{ChangedStatusRecord, PollingKey, WakeReason};

#[derive(Debug, Default)]
struct TableState {
    records: HashMap<PollingKey, Arc<ChangedStatusRecord>>,
    closed: bool,
}

/// Key-indexed set of [`ChangedStatusRecord`]s.
///
/// Broadcasts "sensor X changed" to every record polling X. The table lock
/// is released before any record lock is taken, so a contended record never
/// delays updates to the others.
///
/// # Examples
///
/// ```
/// use status_cache::tracker::{ChangedStatusRecord, ChangedStatusTable};
/// use status_cache::types::SensorId;
///
/// let table = ChangedStatusTable::new();
/// let record = table.insert(ChangedStatusRecord::new("p1".into(), [SensorId::new(42)].into()));
///
/// assert_eq!(table.update_status_changed_ids(SensorId::new(42)), 1);
/// assert!(record.has_changes());
/// ```
#[derive(Debug, Default)]
pub struct ChangedStatusTable {
    inner: RwLock<TableState>,
}

impl ChangedStatusTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record under its key, replacing any previous one.
    ///
    /// A replaced record is closed with [`WakeReason::Released`]. After
    /// [`shutdown`](Self::shutdown) the record is not stored and is returned
    /// already closed, so waiting on it never blocks.
    pub fn insert(&self, record: ChangedStatusRecord) -> Arc<ChangedStatusRecord> {
        let record = Arc::new(record);
        let mut inner = self.inner.write();
        if inner.closed {
            record.close(WakeReason::Shutdown);
            return record;
        }
        if let Some(previous) = inner
            .records
            .insert(record.key().clone(), Arc::clone(&record))
        {
            previous.close(WakeReason::Released);
        }
        record
    }

    /// Returns the record stored under `key`.
    #[must_use]
    pub fn query(&self, key: &PollingKey) -> Option<Arc<ChangedStatusRecord>> {
        self.inner.read().records.get(key).cloned()
    }

    /// Returns the record for `key` if it polls exactly `sensor_ids`,
    /// otherwise stores and returns a fresh one.
    ///
    /// Stored records are kept until [`remove`](Self::remove) or
    /// [`shutdown`](Self::shutdown).
    pub fn query_or_insert(
        &self,
        key: &PollingKey,
        sensor_ids: &BTreeSet<SensorId>,
    ) -> Arc<ChangedStatusRecord> {
        if let Some(record) = self.query(key)
            && record.polling_sensor_ids() == sensor_ids
        {
            return record;
        }

        let mut inner = self.inner.write();
        // Re-check: another poller may have created it meanwhile
        if let Some(record) = inner.records.get(key)
            && record.polling_sensor_ids() == sensor_ids
        {
            return Arc::clone(record);
        }

        let record = Arc::new(ChangedStatusRecord::new(key.clone(), sensor_ids.clone()));
        if inner.closed {
            record.close(WakeReason::Shutdown);
            return record;
        }
        if let Some(previous) = inner.records.insert(key.clone(), Arc::clone(&record)) {
            previous.close(WakeReason::Released);
        }
        tracing::debug!(key = %key, sensors = sensor_ids.len(), "Created changed-status record");
        record
    }

    /// Removes and closes the record for `key`.
    ///
    /// Returns `true` if a record was removed.
    pub fn remove(&self, key: &PollingKey) -> bool {
        let removed = self.inner.write().records.remove(key);
        match removed {
            Some(record) => {
                record.close(WakeReason::Released);
                true
            }
            None => false,
        }
    }

    /// Marks `sensor_id` as changed in every record polling it.
    ///
    /// Returns the number of records notified.
    pub fn update_status_changed_ids(&self, sensor_id: SensorId) -> usize {
        let targets: Vec<Arc<ChangedStatusRecord>> = self
            .inner
            .read()
            .records
            .values()
            .filter(|record| record.is_polling(sensor_id))
            .cloned()
            .collect();

        for record in &targets {
            record.mark_changed(sensor_id);
        }
        targets.len()
    }

    /// Clears the changed set of the record for `key`, keeping the record.
    ///
    /// Returns `true` if the record exists.
    #[deprecated(note = "wait_for_changes consumes the changed set")]
    pub fn reset_changed_status_ids(&self, key: &PollingKey) -> bool {
        match self.query(key) {
            Some(record) => {
                record.reset();
                true
            }
            None => false,
        }
    }

    /// Closes every record, waking all of their waiters.
    pub fn wake_all(&self, reason: WakeReason) {
        for record in self.inner.read().records.values() {
            record.close(reason);
        }
    }

    /// Drops every record.
    pub fn clear_all_records(&self) {
        self.inner.write().records.clear();
    }

    /// Wakes every waiter, drops every record and rejects new records.
    pub fn shutdown(&self) {
        let mut inner = self.inner.write();
        inner.closed = true;
        for record in inner.records.values() {
            record.close(WakeReason::Shutdown);
        }
        inner.records.clear();
    }

    /// Returns `true` after [`shutdown`](Self::shutdown).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns `true` if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

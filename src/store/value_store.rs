// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor value store.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::Error;
use crate::event::{Event, StatusChange};
use crate::sensor::Sensor;
use crate::types::SensorId;

use super::StateSnapshot;

/// Map of sensor ID to current value, with a name index.
///
/// Updates to a single sensor are atomic: the compare-and-replace in
/// [`SensorValueStore::update`] runs under the entry's shard lock, so a
/// reader sees either the old or the new event, never a mix.
///
/// # Examples
///
/// ```
/// use status_cache::event::Event;
/// use status_cache::store::SensorValueStore;
/// use status_cache::types::{SensorId, SwitchState};
///
/// let store = SensorValueStore::new();
/// let id = SensorId::new(42);
///
/// let on = Event::switch(id, "kitchen-switch", SwitchState::On);
/// assert!(store.update(on.clone()).is_some());
///
/// // Identical readings are not a change
/// assert!(store.update(on).is_none());
/// ```
#[derive(Debug, Default)]
pub struct SensorValueStore {
    names: DashMap<String, SensorId>,
    values: DashMap<SensorId, Event>,
}

impl SensorValueStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a sensor and seeds its value with an unknown event.
    ///
    /// Duplicates are not rejected here; callers check IDs first.
    pub fn init(&self, sensor: &dyn Sensor) {
        let id = sensor.id();
        self.names.insert(sensor.name().to_string(), id);
        self.values.insert(id, Event::unknown(id, sensor.name()));
    }

    /// Stores an event if it differs from the current value.
    ///
    /// Returns the change when the stored value was replaced (or set for the
    /// first time), and `None` when the event is value-equal to what is
    /// already stored.
    pub fn update(&self, event: Event) -> Option<StatusChange> {
        match self.values.entry(event.source_id()) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_equal(&event) {
                    return None;
                }
                let previous = slot.insert(event.clone());
                Some(StatusChange::new(Some(previous), event))
            }
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
                Some(StatusChange::new(None, event))
            }
        }
    }

    /// Returns `true` if a value is stored for `id`.
    #[must_use]
    pub fn has_existing_state(&self, id: SensorId) -> bool {
        self.values.contains_key(&id)
    }

    /// Returns the current value for `id`.
    #[must_use]
    pub fn current_state(&self, id: SensorId) -> Option<Event> {
        self.values.get(&id).map(|entry| entry.value().clone())
    }

    /// Returns the current value for a sensor name.
    ///
    /// # Errors
    ///
    /// Returns `Error::SensorNotFound` if the name is not indexed.
    pub fn get(&self, name: &str) -> Result<Event, Error> {
        self.sensor_id(name)
            .and_then(|id| self.current_state(id))
            .ok_or_else(|| Error::SensorNotFound(name.to_string()))
    }

    /// Looks up the ID registered under `name`.
    #[must_use]
    pub fn sensor_id(&self, name: &str) -> Option<SensorId> {
        self.names.get(name).map(|entry| *entry.value())
    }

    /// Returns a lazy point-in-time sequence over the current values.
    ///
    /// The set of sensor IDs is captured when this is called; values are read
    /// as the sequence advances. Concurrent updates are safe but not
    /// linearizable with the snapshot: an entry may show a value newer than
    /// the moment of the call, and entries cleared in the meantime are
    /// skipped. No entry is yielded twice.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot<'_> {
        let mut ids: Vec<SensorId> = self.values.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        StateSnapshot::new(&self.values, ids)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every entry from both maps.
    pub fn clear(&self) {
        self.names.clear();
        self.values.clear();
    }
}

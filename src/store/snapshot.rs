// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lazy snapshot over stored sensor values.

use std::iter::FusedIterator;
use std::vec;

use dashmap::DashMap;

use crate::event::Event;
use crate::types::SensorId;

/// Lazy, finite, single-pass sequence of current sensor values.
///
/// Created by [`SensorValueStore::snapshot`](super::SensorValueStore::snapshot).
/// No map lock is held between calls to `next`, so the store may be updated
/// from the same or other threads while a snapshot is being consumed. Take
/// a fresh snapshot for every iteration.
#[derive(Debug)]
pub struct StateSnapshot<'a> {
    values: &'a DashMap<SensorId, Event>,
    ids: vec::IntoIter<SensorId>,
}

impl<'a> StateSnapshot<'a> {
    pub(super) fn new(values: &'a DashMap<SensorId, Event>, ids: Vec<SensorId>) -> Self {
        Self {
            values,
            ids: ids.into_iter(),
        }
    }
}

impl Iterator for StateSnapshot<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            // The guard is dropped before returning
            if let Some(event) = self.values.get(&id).map(|entry| entry.value().clone()) {
                return Some(event);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}

impl FusedIterator for StateSnapshot<'_> {}

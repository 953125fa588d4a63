// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for committed status changes.

use tokio::sync::broadcast;

use super::StatusChange;

/// Default channel capacity for the status bus.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts committed [`StatusChange`]s to async subscribers.
///
/// This complements the blocking long-poll records: a subscriber receives
/// every change, not only those for a fixed sensor set.
///
/// # Capacity
///
/// The bus has a fixed capacity. A subscriber that falls behind loses the
/// oldest changes and receives `RecvError::Lagged`.
///
/// # Examples
///
/// ```
/// use status_cache::event::{Event, StatusChange, StatusEventBus};
/// use status_cache::types::{SensorId, SwitchState};
///
/// let bus = StatusEventBus::new();
/// let mut rx = bus.subscribe();
///
/// let event = Event::switch(SensorId::new(1), "hall", SwitchState::On);
/// bus.publish(StatusChange::new(None, event));
///
/// assert_eq!(rx.try_recv().unwrap().sensor_id(), SensorId::new(1));
/// ```
#[derive(Debug, Clone)]
pub struct StatusEventBus {
    sender: broadcast::Sender<StatusChange>,
}

impl StatusEventBus {
    /// Creates a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new bus with the specified capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to status changes published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes a change to all subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, change: StatusChange) -> usize {
        // No subscribers is not an error
        self.sender.send(change).unwrap_or(0)
    }
}

impl Default for StatusEventBus {
    fn default() -> Self {
        Self::new()
    }
}

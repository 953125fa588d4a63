// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-update processing context.

use super::Event;

/// Wraps one in-flight [`Event`] while it passes through the processor chain.
///
/// Processors may replace the event or terminate the context. A terminated
/// context never reaches the value store.
///
/// # Examples
///
/// ```
/// use status_cache::event::{Event, EventContext};
/// use status_cache::types::{SensorId, SwitchState};
///
/// let mut ctx = EventContext::new(Event::switch(SensorId::new(1), "hall", SwitchState::On));
/// assert!(!ctx.is_terminated());
///
/// ctx.terminate();
/// assert!(ctx.is_terminated());
/// ```
#[derive(Debug, Clone)]
pub struct EventContext {
    event: Event,
    terminated: bool,
}

impl EventContext {
    /// Creates a fresh context for an incoming event.
    #[must_use]
    pub fn new(event: Event) -> Self {
        Self {
            event,
            terminated: false,
        }
    }

    /// Returns the current event.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Replaces the event carried by this context.
    pub fn set_event(&mut self, event: Event) {
        self.event = event;
    }

    /// Stops further processing; the event will be dropped.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Returns `true` if a processor terminated this context.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Consumes the context, returning the event.
    #[must_use]
    pub fn into_event(self) -> Event {
        self.event
    }
}

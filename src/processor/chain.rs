// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered chain of event processors.

use std::fmt;

use crate::error::ProcessorError;
use crate::event::EventContext;

use super::EventProcessor;

/// Ordered list of [`EventProcessor`]s applied to every event.
///
/// An empty chain passes events through unchanged.
#[derive(Default)]
pub struct EventProcessorChain {
    processors: Vec<Box<dyn EventProcessor>>,
}

impl EventProcessorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a processor to the end of the chain.
    #[must_use]
    pub fn with_processor(mut self, processor: impl EventProcessor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Returns the number of processors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Returns `true` if the chain has no processors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Starts every processor in order.
    ///
    /// # Errors
    ///
    /// Returns the first `ProcessorError`; processors after the failing one
    /// are not started.
    pub fn start(&self) -> Result<(), ProcessorError> {
        for processor in &self.processors {
            processor.start()?;
            tracing::debug!(processor = processor.name(), "Event processor started");
        }
        Ok(())
    }

    /// Stops every processor.
    pub fn stop(&self) {
        for processor in &self.processors {
            processor.stop();
            tracing::debug!(processor = processor.name(), "Event processor stopped");
        }
    }

    /// Runs the context through the chain.
    ///
    /// Processing stops at the first processor that terminates the context.
    #[must_use]
    pub fn push(&self, mut ctx: EventContext) -> EventContext {
        for processor in &self.processors {
            processor.push(&mut ctx);
            if ctx.is_terminated() {
                tracing::debug!(
                    processor = processor.name(),
                    sensor_id = %ctx.event().source_id(),
                    "Event terminated by processor"
                );
                break;
            }
        }
        ctx
    }
}

impl fmt::Debug for EventProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.processors.iter().map(|p| p.name()).collect();
        f.debug_struct("EventProcessorChain")
            .field("processors", &names)
            .finish()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event processing pipeline.
//!
//! Every event passes through an [`EventProcessorChain`] before it is
//! committed to the cache. Processors may rewrite the event or terminate its
//! [`EventContext`], in which case the event is dropped. Processing failures
//! are reported through termination, never by returning an error from
//! [`EventProcessor::push`].
//!
//! # Examples
//!
//! ```
//! use status_cache::event::{Event, EventContext, EventValue};
//! use status_cache::processor::{EventProcessor, EventProcessorChain};
//! use status_cache::types::{SensorId, SwitchState};
//!
//! struct DropUnknown;
//!
//! impl EventProcessor for DropUnknown {
//!     fn name(&self) -> &str {
//!         "drop-unknown"
//!     }
//!
//!     fn push(&self, ctx: &mut EventContext) {
//!         if ctx.event().is_unknown() {
//!             ctx.terminate();
//!         }
//!     }
//! }
//!
//! let chain = EventProcessorChain::new().with_processor(DropUnknown);
//! let ctx = chain.push(EventContext::new(Event::unknown(SensorId::new(1), "hall")));
//! assert!(ctx.is_terminated());
//! ```

mod chain;

pub use chain::EventProcessorChain;

use crate::error::ProcessorError;
use crate::event::EventContext;

/// One stage of the event processing pipeline.
pub trait EventProcessor: Send + Sync {
    /// Returns a name used in log messages.
    fn name(&self) -> &str;

    /// Prepares the processor before the first event.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessorError` if the processor cannot operate.
    fn start(&self) -> Result<(), ProcessorError> {
        Ok(())
    }

    /// Releases resources held by the processor.
    fn stop(&self) {}

    /// Processes one event in place.
    fn push(&self, ctx: &mut EventContext);
}

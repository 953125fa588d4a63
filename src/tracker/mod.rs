// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change tracking for long-poll sessions.
//!
//! Each polling session owns a [`ChangedStatusRecord`] listing the sensors it
//! is interested in. When the cache commits a change it calls
//! [`ChangedStatusTable::update_status_changed_ids`], which marks the sensor
//! in every interested record and wakes their waiters.
//!
//! # Long-poll protocol
//!
//! 1. Look up or create the session's record
//!    ([`ChangedStatusTable::query_or_insert`]).
//! 2. Call [`ChangedStatusRecord::wait_for_changes`] with a timeout. Pending
//!    changes return at once; otherwise the caller blocks.
//! 3. Inspect [`PollResult::reason`] to tell a real change from a timeout or
//!    a shutdown, then re-read the changed sensors from the cache.

mod record;
mod table;

pub use record::{ChangedStatusRecord, PollResult, PollingKey, WakeReason};
pub use table::ChangedStatusTable;

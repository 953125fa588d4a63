// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cache lifecycle state.

use std::fmt;

/// Lifecycle of a [`StatusCache`](super::StatusCache).
///
/// Transitions only move forward:
/// `Created -> Started -> ShuttingDown -> ShutDown`. A cache may also be
/// shut down straight from `Created`. There is no restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// Constructed, processors not started.
    Created,
    /// Accepting registrations and updates.
    Started,
    /// Shutdown in progress; mutating calls are ignored.
    ShuttingDown,
    /// Permanently unusable.
    ShutDown,
}

impl CacheState {
    /// Returns `true` if the cache accepts registrations and updates.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// Returns `true` once shutdown has begun.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::ShuttingDown | Self::ShutDown)
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::ShuttingDown => "shutting down",
            Self::ShutDown => "shut down",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(CacheState::Started.is_running());
        assert!(!CacheState::Created.is_running());
        assert!(CacheState::ShuttingDown.is_stopping());
        assert!(CacheState::ShutDown.is_stopping());
        assert!(!CacheState::Started.is_stopping());
    }
}

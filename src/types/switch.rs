// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch state type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// State reported by a switch sensor.
///
/// # Examples
///
/// ```
/// use status_cache::types::SwitchState;
///
/// let on: SwitchState = "ON".parse().unwrap();
/// assert_eq!(on, SwitchState::On);
/// assert_eq!(on.as_str(), "on");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    /// Switch is off.
    Off,
    /// Switch is on.
    On,
}

impl SwitchState {
    /// Returns the serialized form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` if the switch is on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            _ => Err(ValueError::InvalidSwitchState(s.to_string())),
        }
    }
}

impl From<bool> for SwitchState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!("on".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!("TRUE".parse::<SwitchState>().unwrap(), SwitchState::On);
        assert_eq!(" 0 ".parse::<SwitchState>().unwrap(), SwitchState::Off);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "dim".parse::<SwitchState>().unwrap_err();
        assert_eq!(err, ValueError::InvalidSwitchState("dim".to_string()));
    }

    #[test]
    fn from_bool() {
        assert!(SwitchState::from(true).is_on());
        assert!(!SwitchState::from(false).is_on());
    }
}

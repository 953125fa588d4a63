// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the status cache.
//!
//! Only structurally invalid calls surface as errors: registering a sensor ID
//! twice, looking up a sensor name that was never registered, or driving the
//! cache lifecycle out of order. Bad values and shutdown races are absorbed
//! by the cache and logged instead.

use thiserror::Error;

use crate::types::SensorId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A sensor with the same ID is already registered.
    #[error("duplicate sensor ID {0}")]
    DuplicateSensorId(SensorId),

    /// No sensor is registered under the given name.
    #[error("sensor not found: {0}")]
    SensorNotFound(String),

    /// The cache has not been started yet.
    #[error("status cache has not been started")]
    NotStarted,

    /// The cache was already started.
    #[error("status cache is already started")]
    AlreadyStarted,

    /// The cache has been shut down and cannot be used again.
    #[error("status cache has been shut down")]
    ShutDown,

    /// A value could not be constructed or parsed.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// An event processor failed.
    #[error("processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// A blocking long-poll task did not complete.
    #[error("long-poll aborted: {0}")]
    PollAborted(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// An invalid switch state string was provided.
    #[error("invalid switch state: {0}")]
    InvalidSwitchState(String),

    /// A raw reading could not be parsed as a number.
    #[error("invalid number: {0}")]
    InvalidNumber(String),

    /// A range was declared with `min` greater than `max`.
    #[error("invalid range bounds [{min}, {max}]")]
    InvalidBounds {
        /// Declared lower bound.
        min: i64,
        /// Declared upper bound.
        max: i64,
    },
}

/// Errors reported by a sensor implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor could not be stopped cleanly.
    #[error("sensor {id} failed to stop: {reason}")]
    StopFailed {
        /// The sensor that failed.
        id: SensorId,
        /// Implementation-specific description.
        reason: String,
    },
}

/// Errors reported by an event processor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// The processor could not be started.
    #[error("processor '{processor}' failed to start: {reason}")]
    StartFailed {
        /// Name of the processor.
        processor: String,
        /// Implementation-specific description.
        reason: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: 150,
        };
        assert_eq!(err.to_string(), "value 150 is out of range [0, 100]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidSwitchState("maybe".to_string());
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidSwitchState(_))));
    }

    #[test]
    fn duplicate_sensor_display() {
        let err = Error::DuplicateSensorId(SensorId::new(42));
        assert_eq!(err.to_string(), "duplicate sensor ID 42");
    }

    #[test]
    fn sensor_error_display() {
        let err = SensorError::StopFailed {
            id: SensorId::new(7),
            reason: "port busy".to_string(),
        };
        assert_eq!(err.to_string(), "sensor 7 failed to stop: port busy");
    }

    #[test]
    fn processor_error_converts() {
        let err: Error = ProcessorError::StartFailed {
            processor: "rules".to_string(),
            reason: "no rule set".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "processor error: processor 'rules' failed to start: no rule set"
        );
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Trinnov bridge.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, device-session communication, command binding, and
//! configuration persistence.

use std::io;

use thiserror::Error;

use crate::event::DeviceId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the device.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A command could not be resolved or bound.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Persisted configuration could not be read or written.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Device was not found in the registry.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// Device session is not connected.
    #[error("device is not connected")]
    NotConnected,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A percentage is outside 0-100.
    #[error("percentage {0} is out of range [0, 100]")]
    PercentOutOfRange(i64),

    /// A toggle mode was neither off, on nor toggle.
    #[error("invalid toggle mode: {0}")]
    InvalidToggleMode(String),

    /// A media player state string was not recognised.
    #[error("invalid media state: {0}")]
    InvalidMediaState(String),

    /// An entity id was not `<prefix>.<device id>` with a known prefix.
    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    /// A telemetry signal carried a value of the wrong shape.
    #[error("invalid {signal} value: {value}")]
    InvalidTelemetry {
        /// Signal name.
        signal: &'static str,
        /// The raw value, rendered as JSON.
        value: String,
    },
}

/// Errors related to the device session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// An operation did not complete in time.
    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    /// The device actively refused the connection.
    #[error("connection refused")]
    ConnectionRefused,

    /// The local host has no route to the device.
    #[error("network unreachable")]
    NetworkUnreachable,

    /// Any other socket-level failure.
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The service answered, but not with what the handshake expected.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A MAC address could not be parsed.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

impl ProtocolError {
    /// Classifies an I/O error into the retry taxonomy.
    #[must_use]
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                Self::NetworkUnreachable
            }
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::TimedOut => Self::Timeout(0),
            _ => Self::Io(err),
        }
    }

    /// Returns `true` if the failure points at local connectivity.
    #[must_use]
    pub fn is_network_unreachable(&self) -> bool {
        matches!(self, Self::NetworkUnreachable)
    }

    /// Returns `true` for failures the connection manager retries quietly.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ConnectionRefused | Self::NetworkUnreachable | Self::Io(_)
        )
    }
}

impl From<io::Error> for ProtocolError {
    fn from(err: io::Error) -> Self {
        Self::from_io(err)
    }
}

/// Errors raised while resolving or binding a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// No handler is registered under this name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The device executor does not offer this capability.
    #[error("executor does not support {0}")]
    UnsupportedCapability(String),

    /// Parameters do not match the handler's arity.
    #[error("{command} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// The command being bound.
        command: String,
        /// Number of parameters the handler takes.
        expected: usize,
        /// Number of parameters supplied.
        actual: usize,
    },

    /// A named parameter is absent.
    #[error("{command} is missing argument {name}")]
    MissingArgument {
        /// The command being bound.
        command: String,
        /// The absent parameter name.
        name: String,
    },

    /// A parameter has the wrong type or value.
    #[error("{command}: invalid {name}: {message}")]
    InvalidArgument {
        /// The command being bound.
        command: String,
        /// The offending parameter name.
        name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A reverse label lookup was attempted against an empty table.
    #[error("no labels known yet")]
    EmptyLabelTable,

    /// A reverse label lookup found no match.
    #[error("unknown label: {0}")]
    UnknownLabel(String),
}

/// Errors related to the persisted device list.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read, written or removed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file content could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::PercentOutOfRange(150);
        assert_eq!(err.to_string(), "percentage 150 is out of range [0, 100]");
    }

    #[test]
    fn io_errors_are_classified() {
        let unreachable = io::Error::from(io::ErrorKind::NetworkUnreachable);
        assert!(ProtocolError::from_io(unreachable).is_network_unreachable());

        let host = io::Error::from(io::ErrorKind::HostUnreachable);
        assert!(ProtocolError::from_io(host).is_network_unreachable());

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(matches!(
            ProtocolError::from_io(refused),
            ProtocolError::ConnectionRefused
        ));

        let other = io::Error::other("boom");
        let err = ProtocolError::from_io(other);
        assert!(matches!(err, ProtocolError::Io(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn handshake_failure_is_not_transient() {
        assert!(!ProtocolError::Handshake("bad frame".into()).is_transient());
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::ArityMismatch {
            command: "mute".into(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.to_string(), "mute expects 1 argument(s), got 2");
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::UnknownLabel("HDMI9".into()).into();
        assert!(matches!(err, Error::Command(CommandError::UnknownLabel(_))));
    }
}

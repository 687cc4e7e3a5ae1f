// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status codes returned to the host platform.

use std::fmt;

use serde::Serialize;

use crate::error::{CommandError, Error};

/// Outcome of a host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    /// The command was sent.
    Ok,
    /// The command or its parameters were malformed.
    BadRequest,
    /// The command is not supported.
    NotImplemented,
    /// The device cannot take commands right now.
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the HTTP-style numeric code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotImplemented => 501,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Returns `true` for [`StatusCode::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        };
        f.write_str(name)
    }
}

impl From<&Error> for StatusCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Command(CommandError::UnknownCommand(_) | CommandError::UnsupportedCapability(_)) => {
                Self::NotImplemented
            }
            Error::Command(_) | Error::Value(_) => Self::BadRequest,
            Error::Protocol(_) | Error::Config(_) | Error::DeviceNotFound(_) | Error::NotConnected => {
                Self::ServiceUnavailable
            }
        }
    }
}

impl<T> From<&crate::Result<T>> for StatusCode {
    fn from(result: &crate::Result<T>) -> Self {
        result.as_ref().map_or_else(Self::from, |_| Self::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, ValueError};
    use crate::event::DeviceId;

    #[test]
    fn error_mapping() {
        let cases = [
            (Error::from(CommandError::UnknownCommand("x".into())), StatusCode::NotImplemented),
            (
                Error::from(CommandError::UnsupportedCapability("x".into())),
                StatusCode::NotImplemented,
            ),
            (Error::from(CommandError::EmptyLabelTable), StatusCode::BadRequest),
            (Error::from(ValueError::PercentOutOfRange(200)), StatusCode::BadRequest),
            (Error::NotConnected, StatusCode::ServiceUnavailable),
            (Error::DeviceNotFound(DeviceId::new("X")), StatusCode::ServiceUnavailable),
            (
                Error::from(ProtocolError::ConnectionRefused),
                StatusCode::ServiceUnavailable,
            ),
        ];
        for (err, expected) in &cases {
            assert_eq!(StatusCode::from(err), *expected, "{err}");
        }
    }

    #[test]
    fn result_mapping() {
        let ok: crate::Result<()> = Ok(());
        assert_eq!(StatusCode::from(&ok), StatusCode::Ok);
        let err: crate::Result<()> = Err(Error::NotConnected);
        assert_eq!(StatusCode::from(&err), StatusCode::ServiceUnavailable);
    }

    #[test]
    fn display_and_codes() {
        assert_eq!(StatusCode::BadRequest.to_string(), "BAD_REQUEST");
        assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
        assert!(StatusCode::Ok.is_ok());
    }
}

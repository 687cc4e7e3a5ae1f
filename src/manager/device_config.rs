// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identity and connection settings.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::DeviceId;

/// Default port of the processor's control protocol.
pub const DEFAULT_PROTOCOL_PORT: u16 = 44100;

/// Default port of the processor's web server, up early during boot.
pub const DEFAULT_CONTROL_PORT: u16 = 80;

/// Identity of a configured processor, as persisted.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::manager::DeviceIdentity;
///
/// let identity = DeviceIdentity::new("X", "Trinnov Altitude16", "10.0.0.5", "AA:BB")
///     .with_model_name("Altitude16");
/// assert_eq!(identity.id.as_str(), "X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Unique id.
    pub id: DeviceId,
    /// Friendly name.
    pub name: String,
    /// IP address or host name.
    pub ip: String,
    /// MAC address, used for wake-on-LAN.
    pub mac: String,
    /// Model name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Software version, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
}

impl DeviceIdentity {
    /// Creates an identity without model or version.
    #[must_use]
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        ip: impl Into<String>,
        mac: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip: ip.into(),
            mac: mac.into(),
            model_name: None,
            software_version: None,
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    /// Sets the software version.
    #[must_use]
    pub fn with_software_version(mut self, version: impl Into<String>) -> Self {
        self.software_version = Some(version.into());
        self
    }

    /// Returns `true` if id, name and address are all present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.trim().is_empty() && !self.ip.trim().is_empty()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.name, self.id, self.ip)?;
        if let Some(model) = &self.model_name {
            write!(f, " model {model}")?;
        }
        if let Some(version) = &self.software_version {
            write!(f, " version {version}")?;
        }
        Ok(())
    }
}

/// Timing and port settings for the connection manager.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use trinnov_bridge::manager::ConnectionSettings;
///
/// let settings = ConnectionSettings::default()
///     .with_reconnect_cooldown(Duration::from_secs(5))
///     .with_protocol_port(44101);
/// assert_eq!(settings.control_port, 80);
/// assert_eq!(settings.protocol_port, 44101);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Port of the control protocol.
    pub protocol_port: u16,
    /// Port polled first to detect a booted device.
    pub control_port: u16,
    /// Bound on a single session open.
    pub connect_timeout: Duration,
    /// Bound on a single TCP port check.
    pub port_check_timeout: Duration,
    /// Bound on the readiness handshake.
    pub handshake_timeout: Duration,
    /// Poll interval while the control port is closed.
    pub control_poll_interval: Duration,
    /// Wait after the control port opens.
    pub settle_delay: Duration,
    /// Poll interval while the protocol port or handshake is not ready.
    pub protocol_poll_interval: Duration,
    /// Wait after an unreachable-network failure.
    pub unreachable_backoff: Duration,
    /// Wait before reconnecting after an unexpected disconnect.
    pub reconnect_cooldown: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            protocol_port: DEFAULT_PROTOCOL_PORT,
            control_port: DEFAULT_CONTROL_PORT,
            connect_timeout: Duration::from_secs(3),
            port_check_timeout: Duration::from_secs(2),
            handshake_timeout: Duration::from_secs(3),
            control_poll_interval: Duration::from_secs(10),
            settle_delay: Duration::from_secs(2),
            protocol_poll_interval: Duration::from_secs(2),
            unreachable_backoff: Duration::from_secs(10),
            reconnect_cooldown: Duration::from_secs(20),
        }
    }
}

impl ConnectionSettings {
    /// Creates the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the protocol port.
    #[must_use]
    pub fn with_protocol_port(mut self, port: u16) -> Self {
        self.protocol_port = port;
        self
    }

    /// Sets the control port.
    #[must_use]
    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_port = port;
        self
    }

    /// Sets the session open timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the TCP port check timeout.
    #[must_use]
    pub fn with_port_check_timeout(mut self, timeout: Duration) -> Self {
        self.port_check_timeout = timeout;
        self
    }

    /// Sets the handshake timeout.
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the control port poll interval.
    #[must_use]
    pub fn with_control_poll_interval(mut self, interval: Duration) -> Self {
        self.control_poll_interval = interval;
        self
    }

    /// Sets the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the protocol port poll interval.
    #[must_use]
    pub fn with_protocol_poll_interval(mut self, interval: Duration) -> Self {
        self.protocol_poll_interval = interval;
        self
    }

    /// Sets the unreachable-network backoff.
    #[must_use]
    pub fn with_unreachable_backoff(mut self, delay: Duration) -> Self {
        self.unreachable_backoff = delay;
        self
    }

    /// Sets the reconnect cooldown.
    #[must_use]
    pub fn with_reconnect_cooldown(mut self, delay: Duration) -> Self {
        self.reconnect_cooldown = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.protocol_port, 44100);
        assert_eq!(settings.control_port, 80);
        assert_eq!(settings.connect_timeout, Duration::from_secs(3));
        assert_eq!(settings.port_check_timeout, Duration::from_secs(2));
        assert_eq!(settings.control_poll_interval, Duration::from_secs(10));
        assert_eq!(settings.settle_delay, Duration::from_secs(2));
        assert_eq!(settings.protocol_poll_interval, Duration::from_secs(2));
        assert_eq!(settings.unreachable_backoff, Duration::from_secs(10));
        assert_eq!(settings.reconnect_cooldown, Duration::from_secs(20));
    }

    #[test]
    fn identity_serde_skips_missing_optionals() {
        let identity = DeviceIdentity::new("X", "Trinnov", "10.0.0.5", "AA:BB");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "X", "name": "Trinnov", "ip": "10.0.0.5", "mac": "AA:BB"})
        );

        let parsed: DeviceIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, identity);
    }

    #[test]
    fn identity_validity() {
        assert!(DeviceIdentity::new("X", "T", "10.0.0.5", "").is_valid());
        assert!(!DeviceIdentity::new("", "T", "10.0.0.5", "").is_valid());
        assert!(!DeviceIdentity::new("X", "T", " ", "").is_valid());
    }

    #[test]
    fn identity_display() {
        let identity = DeviceIdentity::new("X", "Trinnov", "10.0.0.5", "AA:BB")
            .with_model_name("Altitude16")
            .with_software_version("4.3.2");
        assert_eq!(
            identity.to_string(),
            "Trinnov (X) at 10.0.0.5 model Altitude16 version 4.3.2"
        );
    }
}

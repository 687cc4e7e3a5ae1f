// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-session seam.
//!
//! The wire codec for the processor lives below this crate. The connection
//! manager only needs what the [`Transport`] trait offers: open and close a
//! session, a stream of [`DeviceSignal`]s, an [`Executor`] for named
//! commands, and the two readiness checks (a TCP port probe and a short
//! ethernet-status handshake).
//!
//! [`tcp_port_open`] and [`wake_on_lan`] are the default network
//! implementations that transports normally keep.

mod tcp;
mod wol;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::broadcast;

pub use tcp::tcp_port_open;
pub use wol::{WOL_PORT, magic_packet, parse_mac, wake_on_lan};

use crate::command::DeviceCommand;
use crate::error::ProtocolError;
use crate::telemetry::DeviceSignal;

/// Ethernet status returned by the readiness handshake.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EthernetStatus {
    /// MAC address reported by the device.
    pub macaddr: String,
}

/// Named command surface of a connected device.
pub trait Executor: Send + Sync + 'static {
    /// Returns `true` if the device offers the named capability.
    fn supports(&self, capability: &str) -> bool;

    /// Runs a command on the device.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command could not be delivered.
    fn execute(
        &self,
        command: DeviceCommand,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}

/// A session with one processor.
///
/// `open` must publish [`ConnectionStatus::Connected`] on the signal stream
/// once the session is up, and the session must publish
/// [`ConnectionStatus::Disconnected`] when it goes away, whether through
/// `close` or because the device dropped it.
///
/// [`ConnectionStatus::Connected`]: crate::telemetry::ConnectionStatus::Connected
/// [`ConnectionStatus::Disconnected`]: crate::telemetry::ConnectionStatus::Disconnected
pub trait Transport: Send + Sync + 'static {
    /// Command executor type.
    type Executor: Executor;

    /// Opens the protocol session.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on refusal, unreachable network or I/O failure.
    fn open(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the session, if any.
    fn close(&self) -> impl Future<Output = ()> + Send;

    /// Returns `true` while a session handle exists.
    fn has_session(&self) -> bool;

    /// Returns the command executor.
    fn executor(&self) -> &Self::Executor;

    /// Subscribes to telemetry and connection notifications.
    fn subscribe(&self) -> broadcast::Receiver<DeviceSignal>;

    /// Returns `true` if a TCP connection to `host:port` succeeds in time.
    fn port_open(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = bool> + Send {
        tcp_port_open(host, port, timeout)
    }

    /// Fetches the ethernet status over a short-lived session.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Handshake` if the service is not ready.
    fn probe_ethernet(
        &self,
        host: &str,
    ) -> impl Future<Output = Result<EthernetStatus, ProtocolError>> + Send;

    /// Sends a wake-on-LAN packet for the given MAC address.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the MAC is malformed or the send fails.
    fn wake(&self, mac: &str) -> impl Future<Output = Result<(), ProtocolError>> + Send {
        wake_on_lan(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethernet_status_parses() {
        let status: EthernetStatus =
            serde_json::from_str(r#"{"macaddr":"00:11:22:33:44:55","dhcp":true}"#).unwrap();
        assert_eq!(status.macaddr, "00:11:22:33:44:55");
    }
}

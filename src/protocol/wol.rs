// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wake-on-LAN.

use std::net::Ipv4Addr;

use tokio::net::UdpSocket;
use tracing::debug;

use crate::error::ProtocolError;

/// UDP port magic packets are broadcast to.
pub const WOL_PORT: u16 = 9;

/// Parses `AA:BB:CC:DD:EE:FF` or `AA-BB-CC-DD-EE-FF`.
///
/// # Errors
///
/// Returns `ProtocolError::InvalidMac` if the string is not six hex octets.
pub fn parse_mac(mac: &str) -> Result<[u8; 6], ProtocolError> {
    let invalid = || ProtocolError::InvalidMac(mac.to_string());

    let octets: Vec<u8> = mac
        .split([':', '-'])
        .map(|part| {
            if part.len() == 2 {
                u8::from_str_radix(part, 16).map_err(|_| invalid())
            } else {
                Err(invalid())
            }
        })
        .collect::<Result<_, _>>()?;

    octets.try_into().map_err(|_| invalid())
}

/// Builds the 102-byte magic packet: six `0xFF` then the MAC sixteen times.
#[must_use]
pub fn magic_packet(mac: [u8; 6]) -> [u8; 102] {
    let mut packet = [0xFF; 102];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac);
    }
    packet
}

/// Broadcasts a magic packet for `mac` on the local network.
///
/// # Errors
///
/// Returns `ProtocolError` if the MAC is malformed or the send fails.
pub async fn wake_on_lan(mac: &str) -> Result<(), ProtocolError> {
    let packet = magic_packet(parse_mac(mac)?);

    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket
        .send_to(&packet, (Ipv4Addr::BROADCAST, WOL_PORT))
        .await?;

    debug!(mac, "sent wake-on-LAN packet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_separators() {
        let expected = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(parse_mac("00:11:22:aa:bb:cc").unwrap(), expected);
        assert_eq!(parse_mac("00-11-22-AA-BB-CC").unwrap(), expected);
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_mac("AA:BB").is_err());
        assert!(parse_mac("00:11:22:33:44:GG").is_err());
        assert!(parse_mac("001:1:22:33:44:55").is_err());
    }

    #[test]
    fn packet_layout() {
        let mac = [1, 2, 3, 4, 5, 6];
        let packet = magic_packet(mac);
        assert!(packet[..6].iter().all(|b| *b == 0xFF));
        assert_eq!(&packet[6..12], &mac);
        assert_eq!(&packet[96..], &mac);
    }
}

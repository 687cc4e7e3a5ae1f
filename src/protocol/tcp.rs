// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP reachability probe.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::trace;

/// Returns `true` if a TCP connection to `host:port` completes within
/// `timeout`. Every failure, including the timeout, counts as closed.
pub async fn tcp_port_open(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            trace!(host, port, error = %e, "port closed");
            false
        }
        Err(_) => {
            trace!(host, port, "port check timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_port_is_detected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(tcp_port_open("127.0.0.1", port, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn closed_port_is_detected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!tcp_port_open("127.0.0.1", port, Duration::from_secs(2)).await);
    }
}

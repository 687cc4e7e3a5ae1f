// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Readiness probe run before each reconnection attempt.
//!
//! A booting processor brings its web server up first and its control
//! service much later; the protocol port can even accept connections before
//! the service answers. The probe therefore waits for the control port, lets
//! the device settle, then waits for the protocol port and a successful
//! ethernet-status handshake.

use std::future::Future;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::ConnectionSettings;
use crate::protocol::Transport;

/// Result of a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Both ports are open and the service answered.
    Ready,
    /// The probe was cancelled before the device became ready.
    Cancelled,
}

/// Runs `fut` unless `token` fires first. Returns `None` when cancelled.
pub(crate) async fn cancellable<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Polls until the device is ready or `token` is cancelled.
///
/// Never fails: closed ports and failed handshakes only mean "not yet".
pub async fn wait_until_ready<T: Transport>(
    transport: &T,
    host: &str,
    settings: &ConnectionSettings,
    token: &CancellationToken,
) -> Readiness {
    if wait_for_control_port(transport, host, settings, token)
        .await
        .is_none()
    {
        tracing::info!(host, "readiness probe cancelled");
        return Readiness::Cancelled;
    }
    if wait_for_service(transport, host, settings, token)
        .await
        .is_none()
    {
        tracing::info!(host, "readiness probe cancelled");
        return Readiness::Cancelled;
    }
    Readiness::Ready
}

async fn wait_for_control_port<T: Transport>(
    transport: &T,
    host: &str,
    settings: &ConnectionSettings,
    token: &CancellationToken,
) -> Option<()> {
    let port = settings.control_port;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let open = cancellable(
            token,
            transport.port_open(host, port, settings.port_check_timeout),
        )
        .await?;

        if open {
            tracing::info!(host, port, attempts, "control port open, letting the device settle");
            return cancellable(token, sleep(settings.settle_delay)).await;
        }
        if attempts == 1 {
            tracing::debug!(
                host,
                port,
                interval = ?settings.control_poll_interval,
                "control port closed, polling"
            );
        }
        cancellable(token, sleep(settings.control_poll_interval)).await?;
    }
}

async fn wait_for_service<T: Transport>(
    transport: &T,
    host: &str,
    settings: &ConnectionSettings,
    token: &CancellationToken,
) -> Option<()> {
    let port = settings.protocol_port;

    loop {
        let open = cancellable(
            token,
            transport.port_open(host, port, settings.port_check_timeout),
        )
        .await?;

        if open {
            let handshake = cancellable(
                token,
                tokio::time::timeout(settings.handshake_timeout, transport.probe_ethernet(host)),
            )
            .await?;
            match handshake {
                Ok(Ok(status)) => {
                    tracing::info!(host, mac = %status.macaddr, "device is ready");
                    return Some(());
                }
                Ok(Err(e)) => {
                    tracing::debug!(host, error = %e, "handshake failed, service not ready yet");
                }
                Err(_) => tracing::debug!(host, "handshake timed out, service not ready yet"),
            }
        } else {
            tracing::debug!(host, port, "protocol port closed");
        }

        cancellable(token, sleep(settings.protocol_poll_interval)).await?;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cancellable_returns_output() {
        let token = CancellationToken::new();
        assert_eq!(cancellable(&token, async { 7 }).await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellable_observes_cancellation() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            child.cancel();
        });

        let out = cancellable(&token, sleep(Duration::from_secs(60))).await;
        assert_eq!(out, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_wins_over_ready_future() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(cancellable(&token, async { 1 }).await, None);
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device connection bookkeeping.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where a device is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    /// No session and nothing in flight.
    Disconnected,
    /// An immediate connection attempt is running.
    Connecting,
    /// The readiness probe loop is running.
    Probing,
    /// The session is up.
    Connected,
    /// Waiting out the cooldown after an unexpected drop.
    ReconnectWait,
}

impl ConnectionPhase {
    /// Returns `true` if the session is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` while the manager is trying to get a session.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Connecting | Self::Probing | Self::ReconnectWait)
    }
}

/// A background probe or cooldown task.
///
/// At most one exists per device. The generation lets a finishing task tell
/// whether the slot still belongs to it.
#[derive(Debug)]
pub(crate) struct RetryTask {
    pub generation: u64,
    pub token: CancellationToken,
    pub handle: JoinHandle<()>,
}

/// Mutable connection state of one device.
#[derive(Debug)]
pub(crate) struct ConnectionSession {
    pub phase: ConnectionPhase,
    pub connected: bool,
    pub connecting: bool,
    /// Set before a deliberate teardown, cleared on the next connect.
    pub intentional_disconnect: bool,
    pub retry: Option<RetryTask>,
    pub generation: u64,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self {
            phase: ConnectionPhase::Disconnected,
            connected: false,
            connecting: false,
            intentional_disconnect: false,
            retry: None,
            generation: 0,
        }
    }

    /// Advances the generation counter and returns the new value.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Removes the retry task if it still belongs to `generation`.
    pub fn release_retry(&mut self, generation: u64) -> bool {
        if self
            .retry
            .as_ref()
            .is_some_and(|task| task.generation == generation)
        {
            self.retry = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_predicates() {
        assert!(ConnectionPhase::Connected.is_connected());
        assert!(ConnectionPhase::Probing.is_pending());
        assert!(ConnectionPhase::ReconnectWait.is_pending());
        assert!(!ConnectionPhase::Disconnected.is_pending());
    }

    #[tokio::test]
    async fn release_only_matching_generation() {
        let mut session = ConnectionSession::new();
        let generation = session.next_generation();
        session.retry = Some(RetryTask {
            generation,
            token: CancellationToken::new(),
            handle: tokio::spawn(async {}),
        });

        assert!(!session.release_retry(generation + 1));
        assert!(session.retry.is_some());
        assert!(session.release_retry(generation));
        assert!(session.retry.is_none());
    }
}

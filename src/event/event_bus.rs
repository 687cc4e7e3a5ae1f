// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for device events.

use tokio::sync::broadcast;

use super::DeviceEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts [`DeviceEvent`]s to any number of subscribers.
///
/// Every processor owns one bus. Its connection manager publishes lifecycle
/// notifications and attribute updates on it, and each subscriber receives
/// its own copy of every event published after it subscribed.
///
/// # Capacity
///
/// Backed by a tokio broadcast channel with a fixed capacity (default 256).
/// A subscriber that falls more than the capacity behind gets
/// `RecvError::Lagged` and loses the oldest events. Publishing never blocks
/// and never fails, even without subscribers.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::event::{DeviceEvent, DeviceId, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
/// let mut rx2 = bus.subscribe();
///
/// bus.publish(DeviceEvent::Connected { device_id: DeviceId::new("X") });
///
/// assert!(rx.try_recv().unwrap().is_connection());
/// assert!(rx2.try_recv().unwrap().is_connection());
/// assert_eq!(bus.subscriber_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeviceEvent>,
}

impl EventBus {
    /// Creates a bus with the default capacity of 256 events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Dropped silently when nobody listens.
    pub fn publish(&self, event: DeviceEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

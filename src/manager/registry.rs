// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of configured processors.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::TrinnovDevice;
use crate::event::DeviceId;
use crate::protocol::Transport;

/// Map from device id to its connection manager.
///
/// The registry is created once and shared by reference (usually inside an
/// `Arc`) with everything that needs to find a device: the command
/// dispatcher and the bridge.
///
/// # Registration
///
/// The first registration of an id wins. A later [`register`](Self::register)
/// with the same id is rejected and the existing device is kept; replace a
/// device by unregistering it first. [`unregister`](Self::unregister) of an
/// unknown id does nothing.
///
/// Reads and writes are synchronous; the lock is never held across an await.
/// The async fan-out methods work on a snapshot taken from [`all`](Self::all).
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use trinnov_bridge::manager::{DeviceIdentity, DeviceRegistry, TrinnovDevice};
///
/// let registry = Arc::new(DeviceRegistry::new());
/// let identity = DeviceIdentity::new("X", "Trinnov Altitude16", "10.0.0.5", "AA:BB");
///
/// assert!(registry.register(TrinnovDevice::new(identity, transport)));
/// registry.connect_all().await;
/// ```
pub struct DeviceRegistry<T: Transport> {
    devices: RwLock<HashMap<DeviceId, TrinnovDevice<T>>>,
}

impl<T: Transport> Default for DeviceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> std::fmt::Debug for DeviceRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.ids())
            .finish()
    }
}

impl<T: Transport> DeviceRegistry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a device.
    ///
    /// Returns `false` and keeps the existing entry if the id is taken.
    pub fn register(&self, device: TrinnovDevice<T>) -> bool {
        let mut devices = self.devices.write();
        if devices.contains_key(device.id()) {
            tracing::warn!(device_id = %device.id(), "device already registered");
            return false;
        }
        tracing::debug!(device_id = %device.id(), "device registered");
        devices.insert(device.id().clone(), device);
        true
    }

    /// Removes a device. Removing an unknown id is a no-op.
    pub fn unregister(&self, id: &DeviceId) -> Option<TrinnovDevice<T>> {
        let removed = self.devices.write().remove(id);
        if removed.is_some() {
            tracing::debug!(device_id = %id, "device unregistered");
        }
        removed
    }

    /// Looks up a device.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<TrinnovDevice<T>> {
        self.devices.read().get(id).cloned()
    }

    /// Returns `true` if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.read().contains_key(id)
    }

    /// Returns every registered device.
    #[must_use]
    pub fn all(&self) -> Vec<TrinnovDevice<T>> {
        self.devices.read().values().cloned().collect()
    }

    /// Returns every registered id, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<DeviceId> = self.devices.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Removes every device and returns them.
    pub fn clear(&self) -> Vec<TrinnovDevice<T>> {
        self.devices.write().drain().map(|(_, device)| device).collect()
    }

    /// Connects every registered device, one after the other.
    pub async fn connect_all(&self) {
        for device in self.all() {
            device.connect().await;
        }
    }

    /// Disconnects every registered device, one after the other.
    pub async fn disconnect_all(&self) {
        for device in self.all() {
            device.disconnect().await;
        }
    }
}

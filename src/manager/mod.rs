// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection management for Trinnov processors.
//!
//! # Overview
//!
//! Each configured processor gets a [`TrinnovDevice`]: it owns the session
//! through a [`Transport`](crate::protocol::Transport), keeps the
//! [`CachedDeviceState`](crate::state::CachedDeviceState) current from
//! telemetry, and publishes [`DeviceEvent`](crate::event::DeviceEvent)s.
//! The [`DeviceRegistry`] maps device ids to these managers.
//!
//! # Reconnection
//!
//! A failed connect starts one background probe loop per device. The loop
//! waits for the web server port, lets the device settle, waits for the
//! protocol port and a successful ethernet-status handshake, and only then
//! opens the real session. An unexpected disconnect schedules one reconnect
//! after [`ConnectionSettings::reconnect_cooldown`]; an intentional
//! [`disconnect`](TrinnovDevice::disconnect) cancels every pending retry.
//!
//! # Examples
//!
//! ```ignore
//! use trinnov_bridge::manager::{DeviceIdentity, DeviceRegistry, TrinnovDevice};
//!
//! let registry = DeviceRegistry::new();
//! let identity = DeviceIdentity::new("X", "Trinnov Altitude16", "10.0.0.5", "AA:BB:CC:DD:EE:FF");
//! let device = TrinnovDevice::new(identity, transport);
//! registry.register(device.clone());
//!
//! let mut events = device.subscribe();
//! device.connect().await;
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

mod connection;
mod device_config;
mod managed_device;
mod readiness;
mod registry;

pub use connection::{ConnectOutcome, TrinnovDevice};
pub use device_config::{
    ConnectionSettings, DEFAULT_CONTROL_PORT, DEFAULT_PROTOCOL_PORT, DeviceIdentity,
};
pub use managed_device::ConnectionPhase;
pub use readiness::{Readiness, wait_until_ready};
pub use registry::DeviceRegistry;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host platform integration.
//!
//! [`Bridge`] owns the device registry and exposes every configured
//! processor to a [`HostPlatform`] as six entities. It reacts to the host's
//! lifecycle notifications (connect, disconnect, standby, subscriptions)
//! and routes entity commands back to the devices.
//!
//! # Examples
//!
//! ```ignore
//! use trinnov_bridge::bridge::Bridge;
//! use trinnov_bridge::manager::TrinnovDevice;
//!
//! let bridge = Bridge::new(host);
//! bridge.configure_device(TrinnovDevice::new(identity, transport), false).await;
//! bridge.subscribe_entities(&["media_player.X".parse()?]);
//! bridge.on_host_connect().await;
//! ```

mod driver;
mod host;

pub use driver::Bridge;
pub use host::{DeviceConnectionState, HostPlatform};

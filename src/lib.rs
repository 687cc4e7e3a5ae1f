// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trinnov Bridge - expose Trinnov audio processors to remote-control hosts.
//!
//! This library keeps a resilient session to each configured processor,
//! caches its state from telemetry, and presents it to a host platform as a
//! media player, a remote and four sensors.
//!
//! # Features
//!
//! - **Connection management**: immediate connect with a bounded timeout,
//!   then a cancellable readiness probe (control port, settle delay,
//!   protocol port, handshake) until the processor has booted
//! - **Reconnect**: unexpected drops reconnect after a cooldown; deliberate
//!   disconnects never do
//! - **State cache**: telemetry is normalized, deduplicated and fanned out
//!   into per-entity attribute updates
//! - **Commands**: named commands with parameter binding, label lookups
//!   for inputs and upmixers, and percent/dB volume conversion
//! - **Entities**: change filtering per entity, descriptors for
//!   registration, persisted device list, mDNS discovery records
//!
//! The wire protocol itself is not part of this crate. Plug a session in by
//! implementing [`protocol::Transport`] and [`protocol::Executor`].
//!
//! # Quick Start
//!
//! ```ignore
//! use trinnov_bridge::bridge::Bridge;
//! use trinnov_bridge::manager::{DeviceIdentity, TrinnovDevice};
//!
//! #[tokio::main]
//! async fn main() {
//!     let identity = DeviceIdentity::new("X", "Trinnov Altitude16", "10.0.0.5", "AA:BB:CC:DD:EE:FF");
//!     let device = TrinnovDevice::new(identity, MyTransport::new());
//!
//!     let bridge = Bridge::new(MyHost::new());
//!     bridge.configure_device(device, true).await;
//! }
//! ```
//!
//! ## Driving a device directly
//!
//! ```ignore
//! use trinnov_bridge::manager::{ConnectOutcome, TrinnovDevice};
//! use trinnov_bridge::event::DeviceEvent;
//!
//! let device = TrinnovDevice::new(identity, transport);
//! let mut events = device.subscribe();
//!
//! if device.connect().await == ConnectOutcome::Retrying {
//!     // the readiness probe runs in the background
//! }
//! while let Ok(event) = events.recv().await {
//!     if let DeviceEvent::Update { entity_id, attributes } = event {
//!         println!("{entity_id}: {attributes:?}");
//!     }
//! }
//! ```

pub mod bridge;
pub mod command;
pub mod discovery;
pub mod entity;
pub mod error;
pub mod event;
#[cfg(feature = "logging")]
pub mod logging;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;

pub use bridge::{Bridge, DeviceConnectionState, HostPlatform};
pub use command::{Command, CommandDispatcher, DeviceCommand, Params, SimpleCommand, StatusCode};
pub use entity::{Attribute, AttributeValue, Attributes, EntityDescriptor, EntityId, EntityKind};
pub use error::{CommandError, ConfigError, Error, ProtocolError, Result, ValueError};
pub use event::{DeviceEvent, DeviceId, EventBus};
pub use manager::{
    ConnectOutcome, ConnectionPhase, ConnectionSettings, DeviceIdentity, DeviceRegistry,
    TrinnovDevice,
};
pub use protocol::{Executor, Transport};
pub use state::CachedDeviceState;
pub use store::DeviceStore;
pub use types::{MediaState, RemoteState, SensorState, ToggleMode, VolumeDb, VolumePercent};

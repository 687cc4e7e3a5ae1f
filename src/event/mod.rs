// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed device events.
//!
//! Each device owns an [`EventBus`] on which its connection manager
//! publishes [`DeviceEvent`]s. The bridge subscribes once per device and
//! routes the events to host entities.
//!
//! # Examples
//!
//! ```
//! use trinnov_bridge::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::Connected { device_id: DeviceId::new("X") });
//! assert!(rx.try_recv().unwrap().is_connection());
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;

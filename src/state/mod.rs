// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state cache and event translation.
//!
//! [`CachedDeviceState`] holds the last known processor state. Applying a
//! [`StateChange`] updates it and returns the normalized
//! [`AttributeUpdate`]s the host entities need, one per affected attribute.

mod device_state;
mod state_change;

pub use device_state::{CachedDeviceState, UNKNOWN_SAMPLE_RATE};
pub use state_change::{AttributeUpdate, SourceRef, StateChange};

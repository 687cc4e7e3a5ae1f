// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Trinnov device control.
//!
//! # Types
//!
//! - [`VolumeDb`] / [`VolumePercent`] - Main volume and its 0-100 % mapping
//! - [`SampleRate`] - Input sample rate, shown in kHz
//! - [`ToggleMode`] - Off/On/Toggle argument for mute, dim and bypass
//! - [`MediaState`], [`RemoteState`], [`SensorState`] - Host entity states

mod entity_state;
mod power;
mod sample_rate;
mod volume;

pub use entity_state::{MediaState, RemoteState, SensorState};
pub use power::ToggleMode;
pub use sample_rate::SampleRate;
pub use volume::{MAX_DB, MIN_DB, VolumeDb, VolumePercent, db_to_percent, percent_to_db};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw device telemetry.
//!
//! The device session pushes named signals with loosely typed JSON payloads,
//! plus a connection-state signal. This module names those signals and
//! turns their payloads into typed [`StateChange`]s.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use trinnov_bridge::state::StateChange;
//! use trinnov_bridge::telemetry::Signal;
//! use trinnov_bridge::types::VolumeDb;
//!
//! let change = Signal::Volume.parse(&json!(-40.0)).unwrap();
//! assert_eq!(change, StateChange::Volume(VolumeDb::new(-40.0)));
//! ```

mod signal_parser;

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;
use crate::state::StateChange;

/// Named telemetry signals the connection manager listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Audio sync lock status.
    AudioSync,
    /// Currently selected input.
    InputConnector,
    /// Input index to label table.
    InputLabels,
    /// Upmixer key to label table.
    SoundModeList,
    /// Input sample rate in Hz.
    SampleRate,
    /// Selected upmixer key.
    Upmixer,
    /// Main volume in dB.
    Volume,
    /// Mute flag.
    Mute,
}

impl Signal {
    /// All signals, in subscription order.
    pub const ALL: [Self; 8] = [
        Self::AudioSync,
        Self::InputConnector,
        Self::InputLabels,
        Self::SoundModeList,
        Self::SampleRate,
        Self::Upmixer,
        Self::Volume,
        Self::Mute,
    ];

    /// Returns the wire name of the signal.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AudioSync => "audiosync_status",
            Self::InputConnector => "input_connector",
            Self::InputLabels => "input_labels",
            Self::SoundModeList => "sound_mode_list",
            Self::SampleRate => "srate",
            Self::Upmixer => "upmixer",
            Self::Volume => "volume",
            Self::Mute => "mute",
        }
    }

    /// Parses a raw payload for this signal.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTelemetry` if the payload has the wrong shape.
    pub fn parse(&self, value: &serde_json::Value) -> Result<StateChange, ValueError> {
        signal_parser::parse(*self, value)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Signal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|signal| signal.name() == s)
            .ok_or_else(|| ValueError::InvalidTelemetry {
                signal: "signal",
                value: s.to_string(),
            })
    }
}

/// Session connection status reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The session is being opened.
    Connecting,
    /// The session is up.
    Connected,
    /// The session is gone.
    Disconnected,
}

/// A notification pushed by the device session.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSignal {
    /// A named telemetry value.
    Telemetry {
        /// Which signal fired.
        signal: Signal,
        /// Raw payload.
        value: serde_json::Value,
    },
    /// The session changed connection state.
    Connection(ConnectionStatus),
}

impl DeviceSignal {
    /// Shorthand for a telemetry notification.
    #[must_use]
    pub fn telemetry(signal: Signal, value: serde_json::Value) -> Self {
        Self::Telemetry { signal, value }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity state enumerations as the host platform expects them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Play state of a media-player entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaState {
    /// Device is not reachable.
    Unavailable,
    /// State has not been reported yet.
    Unknown,
    /// Device is on.
    On,
    /// Device is off.
    Off,
    /// Device is on and rendering audio.
    Playing,
    /// Device is in standby.
    Standby,
}

impl MediaState {
    /// Returns the host-platform string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "UNAVAILABLE",
            Self::Unknown => "UNKNOWN",
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Playing => "PLAYING",
            Self::Standby => "STANDBY",
        }
    }

    /// Maps this state onto the remote entity's coarser state set.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::types::{MediaState, RemoteState};
    ///
    /// assert_eq!(MediaState::Standby.to_remote(), RemoteState::Off);
    /// assert_eq!(MediaState::Playing.to_remote(), RemoteState::On);
    /// ```
    #[must_use]
    pub const fn to_remote(&self) -> RemoteState {
        match self {
            Self::On | Self::Playing => RemoteState::On,
            Self::Off | Self::Standby => RemoteState::Off,
            Self::Unavailable => RemoteState::Unavailable,
            Self::Unknown => RemoteState::Unknown,
        }
    }
}

impl fmt::Display for MediaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNAVAILABLE" => Ok(Self::Unavailable),
            "UNKNOWN" => Ok(Self::Unknown),
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            "PLAYING" => Ok(Self::Playing),
            "STANDBY" => Ok(Self::Standby),
            _ => Err(ValueError::InvalidMediaState(s.to_string())),
        }
    }
}

/// State of a remote entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteState {
    /// Device is not reachable.
    Unavailable,
    /// State has not been reported yet.
    Unknown,
    /// Device is on.
    On,
    /// Device is off or in standby.
    Off,
}

/// State of a sensor entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorState {
    /// Device is not reachable.
    Unavailable,
    /// Value has not been reported yet.
    Unknown,
    /// Sensor is live.
    On,
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Switch modes for the processor's on/off style controls.
//!
//! Mute, dim and bypass all take the same numeric mode argument.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Mode argument for mute, dim and bypass.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::types::ToggleMode;
///
/// assert_eq!(ToggleMode::Off.as_num(), 0);
/// assert_eq!(ToggleMode::On.as_num(), 1);
/// assert_eq!(ToggleMode::Toggle.as_num(), 2);
/// assert_eq!("toggle".parse::<ToggleMode>().unwrap(), ToggleMode::Toggle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleMode {
    /// Switch off.
    Off,
    /// Switch on.
    On,
    /// Flip the current setting.
    Toggle,
}

impl ToggleMode {
    /// Returns the lowercase suffix used in simple command names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Toggle => "toggle",
        }
    }

    /// Returns the numeric argument the processor expects.
    #[must_use]
    pub const fn as_num(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
            Self::Toggle => 2,
        }
    }

    /// Creates a mode from its numeric argument.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidToggleMode` for anything but 0, 1 or 2.
    pub fn from_num(value: u64) -> Result<Self, ValueError> {
        match value {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            2 => Ok(Self::Toggle),
            other => Err(ValueError::InvalidToggleMode(other.to_string())),
        }
    }
}

impl fmt::Display for ToggleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToggleMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" | "false" => Ok(Self::Off),
            "on" | "1" | "true" => Ok(Self::On),
            "toggle" | "2" => Ok(Self::Toggle),
            _ => Err(ValueError::InvalidToggleMode(s.to_string())),
        }
    }
}

impl From<bool> for ToggleMode {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_numbers() {
        assert_eq!("OFF".parse::<ToggleMode>().unwrap(), ToggleMode::Off);
        assert_eq!("1".parse::<ToggleMode>().unwrap(), ToggleMode::On);
        assert_eq!("Toggle".parse::<ToggleMode>().unwrap(), ToggleMode::Toggle);
        assert!("blink".parse::<ToggleMode>().is_err());
    }

    #[test]
    fn from_num_rejects_unknown() {
        assert_eq!(ToggleMode::from_num(2).unwrap(), ToggleMode::Toggle);
        assert_eq!(
            ToggleMode::from_num(3),
            Err(ValueError::InvalidToggleMode("3".into()))
        );
    }

    #[test]
    fn from_bool() {
        assert_eq!(ToggleMode::from(true), ToggleMode::On);
        assert_eq!(ToggleMode::from(false), ToggleMode::Off);
    }
}

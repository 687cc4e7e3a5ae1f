// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed commands for the processor executor.

use super::Command;
use crate::types::{ToggleMode, VolumeDb};

/// A command the executor can run.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::command::{Command, DeviceCommand};
/// use trinnov_bridge::types::{ToggleMode, VolumeDb};
///
/// let cmd = DeviceCommand::Mute(ToggleMode::Toggle);
/// assert_eq!(cmd.name(), "mute");
/// assert_eq!(cmd.payload(), Some("2".to_string()));
///
/// let cmd = DeviceCommand::Volume(VolumeDb::new(-40.0));
/// assert_eq!(cmd.payload(), Some("-40.0".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Put the processor in standby.
    PowerOff,
    /// Mute, unmute or toggle mute.
    Mute(ToggleMode),
    /// Dim, undim or toggle dim.
    Dim(ToggleMode),
    /// Bypass on, off or toggle.
    Bypass(ToggleMode),
    /// Set the main volume.
    Volume(VolumeDb),
    /// Step volume up.
    VolumeUp,
    /// Step volume down.
    VolumeDown,
    /// Select an input by index.
    SelectSource(u32),
    /// Select an upmixer by key.
    Upmixer(String),
    /// Recall the favourite light preset.
    FavLight,
    /// Menu back.
    Back,
}

impl Command for DeviceCommand {
    fn name(&self) -> String {
        match self {
            Self::PowerOff => "power_off",
            Self::Mute(_) => "mute",
            Self::Dim(_) => "dim",
            Self::Bypass(_) => "bypass",
            Self::Volume(_) => "volume",
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::SelectSource(_) => "select_source",
            Self::Upmixer(_) => "upmixer",
            Self::FavLight => "fav_light",
            Self::Back => "back",
        }
        .to_string()
    }

    fn payload(&self) -> Option<String> {
        match self {
            Self::Mute(mode) | Self::Dim(mode) | Self::Bypass(mode) => {
                Some(mode.as_num().to_string())
            }
            Self::Volume(db) => Some(format!("{:.1}", db.value())),
            Self::SelectSource(index) => Some(index.to_string()),
            Self::Upmixer(key) => Some(key.clone()),
            Self::PowerOff | Self::VolumeUp | Self::VolumeDown | Self::FavLight | Self::Back => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_commands_have_no_payload() {
        assert_eq!(DeviceCommand::PowerOff.payload(), None);
        assert_eq!(DeviceCommand::Back.payload(), None);
        assert_eq!(DeviceCommand::FavLight.name(), "fav_light");
    }

    #[test]
    fn wire_format() {
        assert_eq!(DeviceCommand::SelectSource(3).to_wire(), "select_source 3");
        assert_eq!(DeviceCommand::Dim(ToggleMode::On).to_wire(), "dim 1");
        assert_eq!(DeviceCommand::VolumeUp.to_wire(), "volume_up");
    }
}

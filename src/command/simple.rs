// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simple commands offered by the remote entity.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;
use crate::types::ToggleMode;

/// Named button-style commands the host can send to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SimpleCommand {
    Back,
    BypassOff,
    BypassOn,
    BypassToggle,
    DimOff,
    DimOn,
    DimToggle,
    FavLight,
    MuteOff,
    MuteOn,
    MuteToggle,
    SelectSoundMode,
    SelectSource,
    Volume,
    VolumeDown,
    VolumeUp,
}

impl SimpleCommand {
    /// Every simple command, alphabetically.
    pub const ALL: [Self; 16] = [
        Self::Back,
        Self::BypassOff,
        Self::BypassOn,
        Self::BypassToggle,
        Self::DimOff,
        Self::DimOn,
        Self::DimToggle,
        Self::FavLight,
        Self::MuteOff,
        Self::MuteOn,
        Self::MuteToggle,
        Self::SelectSoundMode,
        Self::SelectSource,
        Self::Volume,
        Self::VolumeDown,
        Self::VolumeUp,
    ];

    /// Returns the command id.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::BypassOff => "bypass_off",
            Self::BypassOn => "bypass_on",
            Self::BypassToggle => "bypass_toggle",
            Self::DimOff => "dim_off",
            Self::DimOn => "dim_on",
            Self::DimToggle => "dim_toggle",
            Self::FavLight => "fav_light",
            Self::MuteOff => "mute_off",
            Self::MuteOn => "mute_on",
            Self::MuteToggle => "mute_toggle",
            Self::SelectSoundMode => "select_sound_mode",
            Self::SelectSource => "select_source",
            Self::Volume => "volume",
            Self::VolumeDown => "volume_down",
            Self::VolumeUp => "volume_up",
        }
    }

    /// Returns the label shown on buttons: first word capitalised, the rest
    /// lower case. `MuteToggle` becomes `"Mute toggle"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let words = self.as_str().replace('_', " ");
        let mut chars = words.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    }

    /// Splits the command into the executor command it drives and, for the
    /// toggle families, the mode argument.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::command::SimpleCommand;
    /// use trinnov_bridge::types::ToggleMode;
    ///
    /// assert_eq!(SimpleCommand::DimToggle.target(), ("dim", Some(ToggleMode::Toggle)));
    /// assert_eq!(SimpleCommand::SelectSoundMode.target(), ("upmixer", None));
    /// ```
    #[must_use]
    pub fn target(&self) -> (&'static str, Option<ToggleMode>) {
        for prefix in ["mute", "dim", "bypass"] {
            if let Some(mode) = parse_toggle_command(prefix, self.as_str()) {
                return (prefix, Some(mode));
            }
        }
        match self {
            Self::SelectSoundMode => ("upmixer", None),
            other => (other.as_str(), None),
        }
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimpleCommand {
    type Err = CommandError;

    /// Parses a command id. Case and spaces are normalised, so
    /// `"Mute toggle"` is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(' ', "_").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == normalized)
            .ok_or_else(|| CommandError::UnknownCommand(s.to_string()))
    }
}

/// Decodes `<prefix>_off|on|toggle` into its mode.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::command::parse_toggle_command;
/// use trinnov_bridge::types::ToggleMode;
///
/// assert_eq!(parse_toggle_command("mute", "mute_on"), Some(ToggleMode::On));
/// assert_eq!(parse_toggle_command("mute", "dim_on"), None);
/// ```
#[must_use]
pub fn parse_toggle_command(prefix: &str, command: &str) -> Option<ToggleMode> {
    match command.strip_prefix(prefix)?.strip_prefix('_')? {
        "off" => Some(ToggleMode::Off),
        "on" => Some(ToggleMode::On),
        "toggle" => Some(ToggleMode::Toggle),
        _ => None,
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of command names and their typed builders.

use std::collections::BTreeMap;

use super::{BoundArgs, DeviceCommand, Params};
use crate::error::CommandError;
use crate::protocol::Executor;
use crate::types::VolumeDb;

type Builder = fn(&BoundArgs) -> Result<DeviceCommand, CommandError>;

#[derive(Clone, Copy)]
struct CommandSpec {
    args: &'static [&'static str],
    build: Builder,
}

/// Maps command names to argument lists and builders.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use trinnov_bridge::command::{CommandTable, DeviceCommand, Params};
/// use trinnov_bridge::types::ToggleMode;
///
/// let table = CommandTable::standard();
/// let cmd = table.resolve("mute", Params::from(json!(2))).unwrap();
/// assert_eq!(cmd, DeviceCommand::Mute(ToggleMode::Toggle));
/// ```
#[derive(Clone)]
pub struct CommandTable {
    commands: BTreeMap<&'static str, CommandSpec>,
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CommandTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Creates the table of every command the processor understands.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with("power_off", &[], |_| Ok(DeviceCommand::PowerOff))
            .with("mute", &["mode"], |a| a.toggle(0).map(DeviceCommand::Mute))
            .with("dim", &["mode"], |a| a.toggle(0).map(DeviceCommand::Dim))
            .with("bypass", &["mode"], |a| a.toggle(0).map(DeviceCommand::Bypass))
            .with("volume", &["db"], |a| {
                a.number(0).map(|db| DeviceCommand::Volume(VolumeDb::new(db)))
            })
            .with("volume_up", &[], |_| Ok(DeviceCommand::VolumeUp))
            .with("volume_down", &[], |_| Ok(DeviceCommand::VolumeDown))
            .with("select_source", &["index"], |a| {
                a.index(0).map(DeviceCommand::SelectSource)
            })
            .with("upmixer", &["mode"], |a| a.text(0).map(DeviceCommand::Upmixer))
            .with("fav_light", &[], |_| Ok(DeviceCommand::FavLight))
            .with("back", &[], |_| Ok(DeviceCommand::Back))
    }

    /// Registers a command, replacing any previous one with the same name.
    #[must_use]
    pub fn with(mut self, name: &'static str, args: &'static [&'static str], build: Builder) -> Self {
        self.commands.insert(name, CommandSpec { args, build });
        self
    }

    /// Returns `true` if the name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Returns the argument names of a command.
    #[must_use]
    pub fn arguments(&self, name: &str) -> Option<&'static [&'static str]> {
        self.commands.get(name).map(|spec| spec.args)
    }

    /// Returns all registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    /// Binds parameters and builds the command.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnknownCommand` for unregistered names, or the
    /// binding error if the parameters do not fit.
    pub fn resolve(&self, name: &str, params: Params) -> Result<DeviceCommand, CommandError> {
        let spec = self
            .commands
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        let args = params.bind(name, spec.args)?;
        (spec.build)(&args)
    }

    /// Returns the registered names the executor does not support.
    #[must_use]
    pub fn missing_capabilities<E: Executor>(&self, executor: &E) -> Vec<&'static str> {
        self.names().filter(|name| !executor.supports(name)).collect()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ToggleMode;

    #[test]
    fn resolves_each_shape() {
        let table = CommandTable::standard();

        assert_eq!(table.resolve("back", Params::None).unwrap(), DeviceCommand::Back);
        assert_eq!(
            table.resolve("dim", Params::from(json!({"mode": "on"}))).unwrap(),
            DeviceCommand::Dim(ToggleMode::On)
        );
        assert_eq!(
            table.resolve("select_source", Params::from(json!([1]))).unwrap(),
            DeviceCommand::SelectSource(1)
        );
        assert_eq!(
            table.resolve("volume", Params::from(json!(-40.0))).unwrap(),
            DeviceCommand::Volume(VolumeDb::new(-40.0))
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            CommandTable::standard().resolve("eject", Params::None),
            Err(CommandError::UnknownCommand("eject".into()))
        );
    }

    #[test]
    fn bad_values_are_rejected() {
        let table = CommandTable::standard();
        assert!(matches!(
            table.resolve("mute", Params::from(json!(7))),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            table.resolve("select_source", Params::from(json!(-1))),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn arguments_are_exposed() {
        let table = CommandTable::standard();
        assert_eq!(table.arguments("upmixer"), Some(&["mode"][..]));
        assert_eq!(table.arguments("back"), Some(&[][..]));
        assert_eq!(table.arguments("eject"), None);
    }
}

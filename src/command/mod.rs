// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command definitions and dispatch.
//!
//! Host commands arrive as a name plus loosely shaped parameters. The
//! [`CommandTable`] turns them into typed [`DeviceCommand`]s, and the
//! [`CommandDispatcher`] runs those on the right device and reports a
//! [`StatusCode`].
//!
//! # Available Commands
//!
//! | Name | Arguments | Example |
//! |------|-----------|---------|
//! | `power_off` | none | standby |
//! | `mute`, `dim`, `bypass` | `mode` (0 off, 1 on, 2 toggle) | `mute 2` |
//! | `volume` | `db` | `volume -40.0` |
//! | `volume_up`, `volume_down` | none | |
//! | `select_source` | `index` | `select_source 1` |
//! | `upmixer` | `mode` key | `upmixer auro3d` |
//! | `fav_light`, `back` | none | |
//!
//! # Parameter binding
//!
//! ```
//! use serde_json::json;
//! use trinnov_bridge::command::{CommandTable, DeviceCommand, Params};
//! use trinnov_bridge::types::ToggleMode;
//!
//! let table = CommandTable::standard();
//!
//! // Scalar, positional and named shapes all bind to the same argument.
//! for params in [json!(1), json!([1]), json!({"mode": 1})] {
//!     let cmd = table.resolve("dim", Params::from(params)).unwrap();
//!     assert_eq!(cmd, DeviceCommand::Dim(ToggleMode::On));
//! }
//! ```

mod device_command;
mod dispatcher;
mod params;
mod simple;
mod status;
mod table;

pub use device_command::DeviceCommand;
pub use dispatcher::CommandDispatcher;
pub use params::{BoundArgs, Params};
pub use simple::{SimpleCommand, parse_toggle_command};
pub use status::StatusCode;
pub use table::CommandTable;

/// A command that can be sent to the processor.
pub trait Command {
    /// Returns the command name, e.g. `"mute"` or `"select_source"`.
    fn name(&self) -> String;

    /// Returns the command argument, if any.
    ///
    /// - `mute 2` has payload `Some("2")`
    /// - `volume_up` has payload `None`
    fn payload(&self) -> Option<String>;

    /// Returns the textual form used in logs: `<name> <payload>` or just
    /// `<name>`.
    fn to_wire(&self) -> String {
        match self.payload() {
            Some(p) => format!("{} {}", self.name(), p),
            None => self.name(),
        }
    }
}

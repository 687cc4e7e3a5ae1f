// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routes host commands to device executors.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{CommandTable, DeviceCommand, Params, SimpleCommand, StatusCode};
use crate::error::{CommandError, Error};
use crate::event::DeviceId;
use crate::manager::{DeviceRegistry, TrinnovDevice};
use crate::protocol::{Executor, Transport};
use crate::types::VolumePercent;

/// Resolves commands by name and runs them on registered devices.
///
/// Every public operation reports a [`StatusCode`]; the error behind a
/// non-OK code is logged here.
pub struct CommandDispatcher<T: Transport> {
    registry: Arc<DeviceRegistry<T>>,
    table: CommandTable,
}

impl<T: Transport> std::fmt::Debug for CommandDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("registry", &self.registry)
            .field("table", &self.table)
            .finish()
    }
}

impl<T: Transport> CommandDispatcher<T> {
    /// Creates a dispatcher over the standard command table.
    #[must_use]
    pub fn new(registry: Arc<DeviceRegistry<T>>) -> Self {
        Self::with_table(registry, CommandTable::standard())
    }

    /// Creates a dispatcher over a custom command table.
    #[must_use]
    pub fn with_table(registry: Arc<DeviceRegistry<T>>, table: CommandTable) -> Self {
        Self { registry, table }
    }

    /// Returns the device registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry<T>> {
        &self.registry
    }

    /// Returns the command table.
    #[must_use]
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Returns the table entries a device's executor cannot run.
    ///
    /// An empty list means every registered command is backed by a
    /// capability. Non-empty results are logged as errors.
    pub fn validate(&self, device: &TrinnovDevice<T>) -> Vec<&'static str> {
        let missing = self.table.missing_capabilities(device.executor());
        if missing.is_empty() {
            tracing::debug!(device_id = %device.id(), "all commands backed by executor");
        } else {
            tracing::error!(device_id = %device.id(), ?missing, "executor lacks commands");
        }
        missing
    }

    /// Runs a named command with loosely shaped parameters.
    ///
    /// | Condition | Status |
    /// |-----------|--------|
    /// | unknown device or no session | `SERVICE_UNAVAILABLE` |
    /// | name not registered or not supported by the executor | `NOT_IMPLEMENTED` |
    /// | parameters do not fit the command | `BAD_REQUEST` |
    /// | delivery failed | `SERVICE_UNAVAILABLE` |
    pub async fn execute(&self, id: &DeviceId, name: &str, params: Params) -> StatusCode {
        let result = self.try_execute(id, name, params).await;
        report(id, name, &result)
    }

    /// Selects an input by its label.
    ///
    /// Returns `BAD_REQUEST` without sending anything if the label is not in
    /// the current input table or the table is empty.
    pub async fn select_source(&self, id: &DeviceId, label: &str) -> StatusCode {
        let result = self.try_select_source(id, label).await;
        report(id, "select_source", &result)
    }

    /// Selects an upmixer by its label.
    ///
    /// Returns `BAD_REQUEST` without sending anything if the label is not in
    /// the current sound-mode table or the table is empty.
    pub async fn select_sound_mode(&self, id: &DeviceId, label: &str) -> StatusCode {
        let result = self.try_select_sound_mode(id, label).await;
        report(id, "select_sound_mode", &result)
    }

    /// Sets the volume from a 0-100 percentage.
    pub async fn set_volume_percent(&self, id: &DeviceId, percent: VolumePercent) -> StatusCode {
        let result = self.try_run(id, DeviceCommand::Volume(percent.to_db())).await;
        report(id, "volume", &result)
    }

    /// Runs a command sequence.
    ///
    /// Only `["volume", "<percent>"]` is understood; anything else is
    /// `NOT_IMPLEMENTED`, and a missing or unparsable percentage is
    /// `BAD_REQUEST`.
    pub async fn execute_sequence(&self, id: &DeviceId, sequence: &[String]) -> StatusCode {
        let [command, rest @ ..] = sequence else {
            tracing::warn!(device_id = %id, "empty command sequence");
            return StatusCode::NotImplemented;
        };
        if command.as_str() != "volume" {
            tracing::warn!(device_id = %id, ?sequence, "unsupported command sequence");
            return StatusCode::NotImplemented;
        }

        let percent = rest
            .first()
            .and_then(|value| parse_percent(&Value::String(value.clone())));
        match percent {
            Some(percent) => self.set_volume_percent(id, percent).await,
            None => {
                tracing::warn!(device_id = %id, ?sequence, "invalid volume percentage");
                StatusCode::BadRequest
            }
        }
    }

    /// Runs one of the remote's simple commands.
    ///
    /// Toggle families (`mute_on`, `dim_toggle`, ...) send their base
    /// command with the decoded mode. `select_source` and
    /// `select_sound_mode` accept a label, and `volume` a percentage; other
    /// parameter shapes go through normal binding.
    pub async fn simple_command(&self, id: &DeviceId, command: SimpleCommand, params: Params) -> StatusCode {
        match (command, params) {
            (SimpleCommand::SelectSource, Params::Scalar(Value::String(label))) => {
                self.select_source(id, &label).await
            }
            (SimpleCommand::SelectSoundMode, Params::Scalar(Value::String(label))) => {
                self.select_sound_mode(id, &label).await
            }
            (SimpleCommand::Volume, Params::Scalar(value)) => match parse_percent(&value) {
                Some(percent) => self.set_volume_percent(id, percent).await,
                None => {
                    tracing::warn!(device_id = %id, %value, "invalid volume percentage");
                    StatusCode::BadRequest
                }
            },
            (command, params) => {
                let (name, mode) = command.target();
                let params = mode.map_or(params, |mode| Params::Scalar(json!(mode.as_num())));
                self.execute(id, name, params).await
            }
        }
    }

    /// Wakes the device if it is off.
    pub async fn power_on(&self, id: &DeviceId) -> StatusCode {
        let result = match self.device(id) {
            Ok(device) => device.power_on().await,
            Err(e) => Err(e),
        };
        report(id, "power_on", &result)
    }

    /// Puts the device in standby if it is on.
    pub async fn power_off(&self, id: &DeviceId) -> StatusCode {
        let result = match self.device(id) {
            Ok(device) => device.power_off().await,
            Err(e) => Err(e),
        };
        report(id, "power_off", &result)
    }

    fn device(&self, id: &DeviceId) -> crate::Result<TrinnovDevice<T>> {
        self.registry
            .get(id)
            .ok_or_else(|| Error::DeviceNotFound(id.clone()))
    }

    fn connected_device(&self, id: &DeviceId) -> crate::Result<TrinnovDevice<T>> {
        let device = self.device(id)?;
        if device.is_connected() {
            Ok(device)
        } else {
            Err(Error::NotConnected)
        }
    }

    async fn try_execute(&self, id: &DeviceId, name: &str, params: Params) -> crate::Result<()> {
        let device = self.connected_device(id)?;
        if !self.table.contains(name) || !device.executor().supports(name) {
            return Err(CommandError::UnknownCommand(name.to_string()).into());
        }
        let command = self.table.resolve(name, params)?;
        device.execute(command).await
    }

    async fn try_run(&self, id: &DeviceId, command: DeviceCommand) -> crate::Result<()> {
        self.connected_device(id)?.execute(command).await
    }

    async fn try_select_source(&self, id: &DeviceId, label: &str) -> crate::Result<()> {
        let device = self.connected_device(id)?;
        let index = device.with_state(|state| state.source_index(label))?;
        device.execute(DeviceCommand::SelectSource(index)).await
    }

    async fn try_select_sound_mode(&self, id: &DeviceId, label: &str) -> crate::Result<()> {
        let device = self.connected_device(id)?;
        let key = device.with_state(|state| state.sound_mode_key(label))?;
        device.execute(DeviceCommand::Upmixer(key)).await
    }
}

fn report(id: &DeviceId, command: &str, result: &crate::Result<()>) -> StatusCode {
    let status = StatusCode::from(result);
    if let Err(e) = result {
        tracing::warn!(device_id = %id, command, %status, error = %e, "command failed");
    }
    status
}

/// Reads a percentage from a number or numeric string, rounding and
/// clamping into 0-100.
fn parse_percent(value: &Value) -> Option<VolumePercent> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if !number.is_finite() {
        return None;
    }
    // Clamped into 0.0..=100.0 before the cast.
    #[allow(clippy::cast_possible_truncation)]
    let percent = number.clamp(0.0, 100.0).round() as i64;
    Some(VolumePercent::clamped(percent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_from_numbers_and_strings() {
        assert_eq!(parse_percent(&json!(60)).map(|p| p.value()), Some(60));
        assert_eq!(parse_percent(&json!("42")).map(|p| p.value()), Some(42));
        assert_eq!(parse_percent(&json!(" 12.6 ")).map(|p| p.value()), Some(13));
    }

    #[test]
    fn percent_clamps() {
        assert_eq!(parse_percent(&json!(150)).map(|p| p.value()), Some(100));
        assert_eq!(parse_percent(&json!(-3)).map(|p| p.value()), Some(0));
    }

    #[test]
    fn percent_rejects_non_numbers() {
        assert!(parse_percent(&json!("loud")).is_none());
        assert!(parse_percent(&json!(null)).is_none());
        assert!(parse_percent(&json!([50])).is_none());
    }
}

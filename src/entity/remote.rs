// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote entity.

use super::{Attribute, AttributeValue, Attributes, EntityId, EntityKind};
use crate::command::{CommandDispatcher, Params, SimpleCommand, StatusCode};
use crate::event::DeviceId;
use crate::protocol::Transport;
use crate::state::CachedDeviceState;
use crate::types::RemoteState;

/// Prefix that redirects a `send_cmd` to one of the remote's own commands.
const REMOTE_PREFIX: &str = "remote.";

/// Tracks the remote's on/off state and runs its commands.
#[derive(Debug, Clone)]
pub struct RemoteAdapter {
    entity_id: EntityId,
    state: Option<RemoteState>,
}

impl RemoteAdapter {
    #[must_use]
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            entity_id: EntityId::new(EntityKind::Remote, device_id),
            state: None,
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    /// Returns the last pushed state, if any.
    #[must_use]
    pub fn state(&self) -> Option<RemoteState> {
        self.state
    }

    /// Builds the remote's attributes from the cache.
    #[must_use]
    pub fn initial_attributes(state: &CachedDeviceState) -> Attributes {
        Attributes::from([(
            Attribute::State,
            AttributeValue::Remote(state.state().to_remote()),
        )])
    }

    /// Maps an incoming state onto the remote's state set and returns it
    /// only if it differs from the last pushed one.
    ///
    /// Accepts media player states, which are mapped, and remote states,
    /// which pass as they are. Every other attribute is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::entity::{Attribute, AttributeValue, Attributes, RemoteAdapter};
    /// use trinnov_bridge::event::DeviceId;
    /// use trinnov_bridge::types::{MediaState, RemoteState};
    ///
    /// let mut remote = RemoteAdapter::new(DeviceId::new("X"));
    /// let standby = Attributes::from([(Attribute::State, AttributeValue::Media(MediaState::Standby))]);
    /// let off = Attributes::from([(Attribute::State, AttributeValue::Media(MediaState::Off))]);
    ///
    /// let changed = remote.filter_changed_attributes(&standby);
    /// assert_eq!(changed.get(&Attribute::State), Some(&AttributeValue::Remote(RemoteState::Off)));
    /// assert!(remote.filter_changed_attributes(&off).is_empty());
    /// ```
    pub fn filter_changed_attributes(&mut self, update: &Attributes) -> Attributes {
        let mapped = match update.get(&Attribute::State) {
            Some(AttributeValue::Media(media)) => Some(media.to_remote()),
            Some(AttributeValue::Remote(remote)) => Some(*remote),
            Some(other) => {
                tracing::warn!(entity_id = %self.entity_id, ?other, "unexpected state value");
                Some(RemoteState::Unknown)
            }
            None => None,
        };

        let mut changed = Attributes::new();
        if let Some(state) = mapped
            && self.state != Some(state)
        {
            self.state = Some(state);
            changed.insert(Attribute::State, AttributeValue::Remote(state));
        }
        changed
    }

    /// Runs a remote command.
    ///
    /// `send_cmd` takes the simple command in `command`. Names are
    /// normalised (lower case, spaces to underscores) and a
    /// `remote.<cmd>` value runs the remote's own `<cmd>` instead.
    /// Unknown simple commands are `NOT_IMPLEMENTED`; a missing `command`
    /// is `BAD_REQUEST`.
    pub async fn handle_command<T: Transport>(
        &self,
        dispatcher: &CommandDispatcher<T>,
        command: &str,
        params: &Params,
    ) -> StatusCode {
        let simple = params.named("command").and_then(|v| v.as_str());
        let command = simple
            .and_then(|s| s.strip_prefix(REMOTE_PREFIX))
            .unwrap_or(command);
        let id = self.entity_id.device_id();
        tracing::info!(entity_id = %self.entity_id, command, "remote command");

        match command {
            "on" => dispatcher.power_on(id).await,
            "off" => dispatcher.power_off(id).await,
            "send_cmd" => {
                let Some(simple) = simple else {
                    tracing::warn!(entity_id = %self.entity_id, "send_cmd without command");
                    return StatusCode::BadRequest;
                };
                match simple.parse::<SimpleCommand>() {
                    Ok(simple) => dispatcher.simple_command(id, simple, Params::None).await,
                    Err(e) => {
                        tracing::warn!(entity_id = %self.entity_id, error = %e, "unknown simple command");
                        StatusCode::NotImplemented
                    }
                }
            }
            "send_cmd_sequence" => {
                let sequence: Option<Vec<String>> = params
                    .named("sequence")
                    .and_then(|v| v.as_array())
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| match item {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect()
                    });
                match sequence {
                    Some(sequence) => dispatcher.execute_sequence(id, &sequence).await,
                    None => StatusCode::NotImplemented,
                }
            }
            _ => {
                tracing::warn!(entity_id = %self.entity_id, command, "unsupported remote command");
                StatusCode::NotImplemented
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaState;

    fn state(value: AttributeValue) -> Attributes {
        Attributes::from([(Attribute::State, value)])
    }

    #[test]
    fn first_state_always_passes() {
        let mut remote = RemoteAdapter::new(DeviceId::new("X"));
        let changed = remote.filter_changed_attributes(&state(AttributeValue::Media(MediaState::Off)));
        assert_eq!(
            changed.get(&Attribute::State),
            Some(&AttributeValue::Remote(RemoteState::Off))
        );
        assert_eq!(remote.state(), Some(RemoteState::Off));
    }

    #[test]
    fn mapped_duplicates_are_suppressed() {
        let mut remote = RemoteAdapter::new(DeviceId::new("X"));
        remote.filter_changed_attributes(&state(AttributeValue::Media(MediaState::On)));
        assert!(
            remote
                .filter_changed_attributes(&state(AttributeValue::Media(MediaState::Playing)))
                .is_empty()
        );
        assert!(
            remote
                .filter_changed_attributes(&state(AttributeValue::Remote(RemoteState::On)))
                .is_empty()
        );
    }

    #[test]
    fn other_attributes_are_ignored() {
        let mut remote = RemoteAdapter::new(DeviceId::new("X"));
        let update = Attributes::from([(Attribute::Volume, AttributeValue::Integer(60))]);
        assert!(remote.filter_changed_attributes(&update).is_empty());
        assert_eq!(remote.state(), None);
    }

    #[test]
    fn initial_state_follows_cache() {
        let attributes = RemoteAdapter::initial_attributes(&CachedDeviceState::new());
        assert_eq!(
            attributes.get(&Attribute::State),
            Some(&AttributeValue::Remote(RemoteState::Off))
        );
    }
}

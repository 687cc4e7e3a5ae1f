// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Media player entity.

use serde_json::json;

use super::{Attribute, AttributeValue, Attributes, EntityId, EntityKind};
use crate::command::{CommandDispatcher, Params, SimpleCommand, StatusCode};
use crate::event::DeviceId;
use crate::protocol::Transport;
use crate::state::CachedDeviceState;
use crate::types::{MediaState, ToggleMode};

/// Keeps the media player's last pushed attributes and runs its commands.
#[derive(Debug, Clone)]
pub struct MediaPlayerAdapter {
    entity_id: EntityId,
    snapshot: Attributes,
}

impl MediaPlayerAdapter {
    /// Creates the adapter with the default attribute set.
    #[must_use]
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            entity_id: EntityId::new(EntityKind::MediaPlayer, device_id),
            snapshot: Self::default_attributes(),
        }
    }

    /// Returns the entity id.
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    /// Returns the last pushed attributes.
    #[must_use]
    pub fn snapshot(&self) -> &Attributes {
        &self.snapshot
    }

    /// Attributes of a freshly registered, switched-off player.
    #[must_use]
    pub fn default_attributes() -> Attributes {
        Attributes::from([
            (Attribute::Muted, AttributeValue::Bool(false)),
            (Attribute::SoundMode, AttributeValue::from("")),
            (Attribute::SoundModeList, AttributeValue::List(Vec::new())),
            (Attribute::Source, AttributeValue::from("")),
            (Attribute::SourceList, AttributeValue::List(Vec::new())),
            (Attribute::State, AttributeValue::Media(MediaState::Off)),
            (Attribute::Volume, AttributeValue::Integer(0)),
        ])
    }

    /// Builds the full attribute set from the cache.
    #[must_use]
    pub fn initial_attributes(state: &CachedDeviceState) -> Attributes {
        let mut attributes = Attributes::from([
            (Attribute::Muted, AttributeValue::Bool(state.muted())),
            (
                Attribute::SoundMode,
                AttributeValue::from(state.current_sound_mode().unwrap_or_default()),
            ),
            (Attribute::SoundModeList, AttributeValue::List(state.sound_mode_list())),
            (
                Attribute::Source,
                AttributeValue::from(state.current_source().unwrap_or_default()),
            ),
            (Attribute::SourceList, AttributeValue::List(state.source_list())),
            (Attribute::State, AttributeValue::Media(state.state())),
            (Attribute::Volume, AttributeValue::from(state.volume_percent().value())),
        ]);
        clear_sources_when_off(&mut attributes);
        attributes
    }

    /// Returns the entries of `update` that differ from the last pushed
    /// attributes and records them.
    ///
    /// When the result switches the player off, source and source list are
    /// forced empty even if `update` did not mention them.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::entity::{Attribute, AttributeValue, Attributes, MediaPlayerAdapter};
    /// use trinnov_bridge::event::DeviceId;
    ///
    /// let mut adapter = MediaPlayerAdapter::new(DeviceId::new("X"));
    /// let update = Attributes::from([(Attribute::Volume, AttributeValue::Integer(60))]);
    ///
    /// assert_eq!(adapter.filter_changed_attributes(&update).len(), 1);
    /// assert!(adapter.filter_changed_attributes(&update).is_empty());
    /// ```
    pub fn filter_changed_attributes(&mut self, update: &Attributes) -> Attributes {
        let mut changed: Attributes = update
            .iter()
            .filter(|&(key, value)| self.snapshot.get(key) != Some(value))
            .map(|(key, value)| (*key, value.clone()))
            .collect();

        clear_sources_when_off(&mut changed);

        for (key, value) in &changed {
            self.snapshot.insert(*key, value.clone());
        }
        changed
    }

    /// Runs a media player command.
    ///
    /// `play_pause`, `next` and `previous` are accepted and ignored. Unknown
    /// commands and missing arguments are `BAD_REQUEST`.
    pub async fn handle_command<T: Transport>(
        &self,
        dispatcher: &CommandDispatcher<T>,
        command: &str,
        params: &Params,
    ) -> StatusCode {
        let id = self.entity_id.device_id();
        tracing::info!(entity_id = %self.entity_id, command, "media player command");

        match command {
            "on" => dispatcher.power_on(id).await,
            "off" => dispatcher.power_off(id).await,
            "play_pause" | "next" | "previous" => StatusCode::Ok,
            "mute" => self.mute(dispatcher, ToggleMode::On).await,
            "unmute" => self.mute(dispatcher, ToggleMode::Off).await,
            "mute_toggle" => self.mute(dispatcher, ToggleMode::Toggle).await,
            "volume_up" => dispatcher.execute(id, "volume_up", Params::None).await,
            "volume_down" => dispatcher.execute(id, "volume_down", Params::None).await,
            "volume" => match params.named("volume") {
                Some(value) => {
                    dispatcher
                        .simple_command(id, SimpleCommand::Volume, Params::Scalar(value.clone()))
                        .await
                }
                None => missing_argument(&self.entity_id, command, "volume"),
            },
            "select_source" => match params.named("source").and_then(|v| v.as_str()) {
                Some(label) => dispatcher.select_source(id, label).await,
                None => missing_argument(&self.entity_id, command, "source"),
            },
            "select_sound_mode" => match params.named("mode").and_then(|v| v.as_str()) {
                Some(label) => dispatcher.select_sound_mode(id, label).await,
                None => missing_argument(&self.entity_id, command, "mode"),
            },
            _ => {
                tracing::warn!(entity_id = %self.entity_id, command, "unsupported media player command");
                StatusCode::BadRequest
            }
        }
    }

    async fn mute<T: Transport>(&self, dispatcher: &CommandDispatcher<T>, mode: ToggleMode) -> StatusCode {
        dispatcher
            .execute(
                self.entity_id.device_id(),
                "mute",
                Params::Scalar(json!(mode.as_num())),
            )
            .await
    }
}

fn clear_sources_when_off(attributes: &mut Attributes) {
    if attributes.get(&Attribute::State) == Some(&AttributeValue::Media(MediaState::Off)) {
        attributes.insert(Attribute::Source, AttributeValue::from(""));
        attributes.insert(Attribute::SourceList, AttributeValue::List(Vec::new()));
    }
}

fn missing_argument(entity_id: &EntityId, command: &str, name: &str) -> StatusCode {
    tracing::warn!(%entity_id, command, argument = name, "missing command argument");
    StatusCode::BadRequest
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity metadata registered with the host.

use serde::Serialize;

use super::{Attributes, EntityId, EntityKind, MediaPlayerAdapter, RemoteAdapter, SensorAdapter};
use crate::command::SimpleCommand;
use crate::manager::DeviceIdentity;
use crate::state::CachedDeviceState;

/// Capabilities advertised by the media player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaPlayerFeature {
    /// Mute.
    Mute,
    /// Mute toggle.
    MuteToggle,
    /// Power on and off.
    OnOff,
    /// Upmixer selection.
    SelectSoundMode,
    /// Input selection.
    SelectSource,
    /// Unmute.
    Unmute,
    /// Absolute volume.
    Volume,
    /// Volume steps.
    VolumeUpDown,
}

impl MediaPlayerFeature {
    /// Every feature the processor's media player offers.
    pub const ALL: [Self; 8] = [
        Self::Mute,
        Self::MuteToggle,
        Self::OnOff,
        Self::SelectSoundMode,
        Self::SelectSource,
        Self::Unmute,
        Self::Volume,
        Self::VolumeUpDown,
    ];
}

/// Capabilities advertised by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteFeature {
    /// Power on and off.
    OnOff,
    /// Simple commands.
    SendCmd,
}

/// Everything the host needs to register one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDescriptor {
    /// Entity id, `<prefix>.<device id>`.
    #[serde(serialize_with = "serialize_display")]
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Entity type.
    #[serde(skip)]
    pub kind: EntityKind,
    /// Media player features; empty for other kinds.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media_player_features: Vec<MediaPlayerFeature>,
    /// Remote features; empty for other kinds.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remote_features: Vec<RemoteFeature>,
    /// Remote simple commands; empty for other kinds.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_commands")]
    pub simple_commands: Vec<SimpleCommand>,
    /// Attributes at registration time.
    pub attributes: Attributes,
}

impl EntityDescriptor {
    /// Builds the descriptor of one entity of a device.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::entity::{EntityDescriptor, EntityKind};
    /// use trinnov_bridge::manager::DeviceIdentity;
    /// use trinnov_bridge::state::CachedDeviceState;
    ///
    /// let identity = DeviceIdentity::new("X", "Altitude", "10.0.0.5", "AA:BB");
    /// let state = CachedDeviceState::new();
    ///
    /// let remote = EntityDescriptor::new(EntityKind::Remote, &identity, &state, false);
    /// assert_eq!(remote.id.to_string(), "remote.X");
    /// assert_eq!(remote.name, "Altitude Remote");
    ///
    /// let sensor = EntityDescriptor::new(EntityKind::SampleRateSensor, &identity, &state, false);
    /// assert_eq!(sensor.name, "Trinnov Sample Rate");
    /// ```
    #[must_use]
    pub fn new(
        kind: EntityKind,
        identity: &DeviceIdentity,
        state: &CachedDeviceState,
        connected: bool,
    ) -> Self {
        let id = EntityId::new(kind, identity.id.clone());
        let mut descriptor = Self {
            id,
            name: display_name(kind, &identity.name),
            kind,
            media_player_features: Vec::new(),
            remote_features: Vec::new(),
            simple_commands: Vec::new(),
            attributes: Attributes::new(),
        };

        match kind {
            EntityKind::MediaPlayer => {
                descriptor.media_player_features = MediaPlayerFeature::ALL.to_vec();
                descriptor.attributes = MediaPlayerAdapter::initial_attributes(state);
            }
            EntityKind::Remote => {
                descriptor.remote_features = vec![RemoteFeature::OnOff, RemoteFeature::SendCmd];
                descriptor.simple_commands = SimpleCommand::ALL.to_vec();
                descriptor.attributes = RemoteAdapter::initial_attributes(state);
            }
            _ => {
                descriptor.attributes = SensorAdapter::initial_attributes(kind, state, connected);
            }
        }
        descriptor
    }

    /// Builds the descriptors of all six entities of a device.
    #[must_use]
    pub fn all(identity: &DeviceIdentity, state: &CachedDeviceState, connected: bool) -> Vec<Self> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| Self::new(kind, identity, state, connected))
            .collect()
    }
}

fn display_name(kind: EntityKind, device_name: &str) -> String {
    match kind {
        EntityKind::MediaPlayer => format!("{device_name} Media Player"),
        EntityKind::Remote => format!("{device_name} Remote"),
        EntityKind::SampleRateSensor => "Trinnov Sample Rate".to_string(),
        EntityKind::AudioSyncSensor => "Trinnov Audio Sync".to_string(),
        EntityKind::VolumeSensor => "Trinnov Volume".to_string(),
        EntityKind::MutedSensor => "Trinnov Muted".to_string(),
    }
}

fn serialize_display<S: serde::Serializer>(id: &EntityId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

fn serialize_commands<S: serde::Serializer>(
    commands: &[SimpleCommand],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(commands.iter().map(SimpleCommand::as_str))
}

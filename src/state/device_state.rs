// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device state.

use std::collections::BTreeMap;

use tracing::debug;

use super::{AttributeUpdate, SourceRef, StateChange};
use crate::entity::{Attribute, EntityKind};
use crate::error::CommandError;
use crate::types::{MediaState, RemoteState, SensorState, VolumeDb, VolumePercent};

/// Sample rate shown before the device reports one.
pub const UNKNOWN_SAMPLE_RATE: &str = "unknown";

/// Last observed state of one processor.
///
/// Owned by the device's connection manager. Every field group is compared
/// against the incoming value, so applying a change that matches the cache
/// yields no updates.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::state::{CachedDeviceState, StateChange};
/// use trinnov_bridge::types::VolumeDb;
///
/// let mut state = CachedDeviceState::new();
///
/// // Volume fans out to the volume sensor and the media player.
/// let updates = state.apply(&StateChange::Volume(VolumeDb::new(-40.0)));
/// assert_eq!(updates.len(), 2);
///
/// // The same value again is suppressed.
/// assert!(state.apply(&StateChange::Volume(VolumeDb::new(-40.0))).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDeviceState {
    state: MediaState,
    volume: Option<VolumeDb>,
    muted: bool,
    audio_sync: bool,
    sample_rate_khz: String,
    source_labels: BTreeMap<u32, String>,
    sound_modes: BTreeMap<String, String>,
    current_source: Option<String>,
    current_sound_mode: Option<String>,
}

impl Default for CachedDeviceState {
    fn default() -> Self {
        Self {
            state: MediaState::Off,
            volume: None,
            muted: false,
            audio_sync: false,
            sample_rate_khz: UNKNOWN_SAMPLE_RATE.to_string(),
            source_labels: BTreeMap::new(),
            sound_modes: BTreeMap::new(),
            current_source: None,
            current_sound_mode: None,
        }
    }
}

impl CachedDeviceState {
    /// Creates the initial state: off, nothing reported yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the media player state.
    #[must_use]
    pub const fn state(&self) -> MediaState {
        self.state
    }

    /// Returns the last reported volume, if any.
    #[must_use]
    pub const fn volume(&self) -> Option<VolumeDb> {
        self.volume
    }

    /// Returns the volume as a percentage, 0 when unknown.
    #[must_use]
    pub fn volume_percent(&self) -> VolumePercent {
        self.volume.map(|v| v.to_percent()).unwrap_or_default()
    }

    /// Returns the mute flag.
    #[must_use]
    pub const fn muted(&self) -> bool {
        self.muted
    }

    /// Returns the audio sync flag.
    #[must_use]
    pub const fn audio_sync(&self) -> bool {
        self.audio_sync
    }

    /// Returns the sample rate in kHz, or `"unknown"`.
    #[must_use]
    pub fn sample_rate_khz(&self) -> &str {
        &self.sample_rate_khz
    }

    /// Returns the input label table.
    #[must_use]
    pub const fn source_labels(&self) -> &BTreeMap<u32, String> {
        &self.source_labels
    }

    /// Returns the sound mode table.
    #[must_use]
    pub const fn sound_modes(&self) -> &BTreeMap<String, String> {
        &self.sound_modes
    }

    /// Returns the input labels in index order.
    #[must_use]
    pub fn source_list(&self) -> Vec<String> {
        self.source_labels.values().cloned().collect()
    }

    /// Returns the sound mode labels in key order.
    #[must_use]
    pub fn sound_mode_list(&self) -> Vec<String> {
        self.sound_modes.values().cloned().collect()
    }

    /// Returns the current source label.
    #[must_use]
    pub fn current_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    /// Returns the current sound mode label.
    #[must_use]
    pub fn current_sound_mode(&self) -> Option<&str> {
        self.current_sound_mode.as_deref()
    }

    /// Finds the input index for a label.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::EmptyLabelTable` before any labels arrived and
    /// `CommandError::UnknownLabel` if the label is absent.
    pub fn source_index(&self, label: &str) -> Result<u32, CommandError> {
        if self.source_labels.is_empty() {
            return Err(CommandError::EmptyLabelTable);
        }
        self.source_labels
            .iter()
            .find_map(|(index, l)| (l == label).then_some(*index))
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    /// Finds the upmixer key for a sound mode label.
    ///
    /// # Errors
    ///
    /// Same as [`source_index`](Self::source_index).
    pub fn sound_mode_key(&self, label: &str) -> Result<String, CommandError> {
        if self.sound_modes.is_empty() {
            return Err(CommandError::EmptyLabelTable);
        }
        self.sound_modes
            .iter()
            .find_map(|(key, l)| (l == label).then(|| key.clone()))
            .ok_or_else(|| CommandError::UnknownLabel(label.to_string()))
    }

    /// Applies a telemetry change.
    ///
    /// Returns one update per affected host attribute, or nothing if the
    /// value matches the cache.
    pub fn apply(&mut self, change: &StateChange) -> Vec<AttributeUpdate> {
        match change {
            StateChange::AudioSync(sync) => {
                if *sync == self.audio_sync {
                    return Vec::new();
                }
                self.audio_sync = *sync;
                vec![AttributeUpdate::new(
                    EntityKind::AudioSyncSensor,
                    Attribute::Value,
                    *sync,
                )]
            }
            StateChange::Mute(muted) => {
                if *muted == self.muted {
                    return Vec::new();
                }
                self.muted = *muted;
                vec![
                    AttributeUpdate::new(EntityKind::MutedSensor, Attribute::Value, *muted),
                    AttributeUpdate::new(EntityKind::MediaPlayer, Attribute::Muted, *muted),
                ]
            }
            StateChange::Volume(volume) => {
                if self.volume == Some(*volume) {
                    return Vec::new();
                }
                self.volume = Some(*volume);
                vec![
                    AttributeUpdate::new(EntityKind::VolumeSensor, Attribute::Value, volume.value()),
                    AttributeUpdate::new(
                        EntityKind::MediaPlayer,
                        Attribute::Volume,
                        volume.to_percent().value(),
                    ),
                ]
            }
            StateChange::SampleRate(rate) => {
                let khz = rate.to_khz_string();
                if khz == self.sample_rate_khz {
                    return Vec::new();
                }
                self.sample_rate_khz.clone_from(&khz);
                vec![AttributeUpdate::new(
                    EntityKind::SampleRateSensor,
                    Attribute::Value,
                    khz,
                )]
            }
            StateChange::InputLabels(labels) => {
                if *labels == self.source_labels {
                    return Vec::new();
                }
                self.source_labels.clone_from(labels);
                vec![AttributeUpdate::new(
                    EntityKind::MediaPlayer,
                    Attribute::SourceList,
                    self.source_list(),
                )]
            }
            StateChange::SoundModes(modes) => {
                if *modes == self.sound_modes {
                    return Vec::new();
                }
                self.sound_modes.clone_from(modes);
                vec![AttributeUpdate::new(
                    EntityKind::MediaPlayer,
                    Attribute::SoundModeList,
                    self.sound_mode_list(),
                )]
            }
            StateChange::Source(source) => {
                let label = match source {
                    SourceRef::Index(index) => self
                        .source_labels
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| index.to_string()),
                    SourceRef::Label(label) => label.clone(),
                };
                if self.current_source.as_deref() == Some(label.as_str()) {
                    return Vec::new();
                }
                self.current_source = Some(label.clone());
                vec![AttributeUpdate::new(
                    EntityKind::MediaPlayer,
                    Attribute::Source,
                    label,
                )]
            }
            StateChange::SoundMode(key) => {
                let label = self
                    .sound_modes
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                if self.current_sound_mode.as_deref() == Some(label.as_str()) {
                    return Vec::new();
                }
                self.current_sound_mode = Some(label.clone());
                vec![AttributeUpdate::new(
                    EntityKind::MediaPlayer,
                    Attribute::SoundMode,
                    label,
                )]
            }
        }
    }

    /// Marks the device on and returns the baseline updates for every entity.
    ///
    /// Cached sources and sound modes are repeated after the state updates.
    /// Going off blanks them on the host, and a device re-sending the same
    /// tables after reconnecting is suppressed by [`apply`](Self::apply).
    pub fn mark_connected(&mut self) -> Vec<AttributeUpdate> {
        debug!(from = %self.state, "cache: connected");
        self.state = MediaState::On;
        let mut updates = vec![
            AttributeUpdate::new(EntityKind::MediaPlayer, Attribute::State, MediaState::On),
            AttributeUpdate::new(EntityKind::Remote, Attribute::State, RemoteState::On),
        ];
        updates.extend(
            EntityKind::SENSORS
                .into_iter()
                .map(|kind| AttributeUpdate::new(kind, Attribute::State, SensorState::On)),
        );
        updates.extend(self.cached_media_updates());
        updates
    }

    fn cached_media_updates(&self) -> Vec<AttributeUpdate> {
        let player = EntityKind::MediaPlayer;
        let mut updates = Vec::new();
        if !self.source_labels.is_empty() {
            updates.push(AttributeUpdate::new(player, Attribute::SourceList, self.source_list()));
        }
        if let Some(source) = &self.current_source {
            updates.push(AttributeUpdate::new(player, Attribute::Source, source.as_str()));
        }
        if !self.sound_modes.is_empty() {
            updates.push(AttributeUpdate::new(
                player,
                Attribute::SoundModeList,
                self.sound_mode_list(),
            ));
        }
        if let Some(mode) = &self.current_sound_mode {
            updates.push(AttributeUpdate::new(player, Attribute::SoundMode, mode.as_str()));
        }
        updates
    }

    /// Marks the device off and returns updates taking every entity down.
    pub fn mark_disconnected(&mut self) -> Vec<AttributeUpdate> {
        debug!(from = %self.state, "cache: disconnected");
        self.state = MediaState::Off;
        let mut updates = vec![
            AttributeUpdate::new(EntityKind::MediaPlayer, Attribute::State, MediaState::Off),
            AttributeUpdate::new(EntityKind::Remote, Attribute::State, RemoteState::Off),
        ];
        updates.extend(EntityKind::SENSORS.into_iter().map(|kind| {
            AttributeUpdate::new(kind, Attribute::State, SensorState::Unavailable)
        }));
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::AttributeValue;
    use crate::types::SampleRate;

    fn labelled() -> CachedDeviceState {
        let mut state = CachedDeviceState::new();
        state.apply(&StateChange::InputLabels(
            [(0, "HDMI1".to_string()), (1, "HDMI2".to_string())].into(),
        ));
        state
    }

    #[test]
    fn initial_state() {
        let state = CachedDeviceState::new();
        assert_eq!(state.state(), MediaState::Off);
        assert_eq!(state.sample_rate_khz(), "unknown");
        assert_eq!(state.volume_percent().value(), 0);
        assert!(state.current_source().is_none());
    }

    #[test]
    fn volume_fans_out_to_sensor_and_player() {
        let mut state = CachedDeviceState::new();
        let updates = state.apply(&StateChange::Volume(VolumeDb::new(-40.0)));

        assert_eq!(
            updates,
            vec![
                AttributeUpdate::new(EntityKind::VolumeSensor, Attribute::Value, -40.0),
                AttributeUpdate::new(EntityKind::MediaPlayer, Attribute::Volume, 60u8),
            ]
        );
    }

    #[test]
    fn repeated_values_are_suppressed() {
        let mut state = CachedDeviceState::new();
        let changes = [
            StateChange::Volume(VolumeDb::new(-20.0)),
            StateChange::Mute(true),
            StateChange::AudioSync(true),
            StateChange::SampleRate(SampleRate::from_hz(48000.0)),
            StateChange::SoundMode("auto".into()),
            StateChange::Source(SourceRef::Label("HDMI1".into())),
        ];
        for change in &changes {
            assert!(!state.apply(change).is_empty(), "{change:?} first time");
            assert!(state.apply(change).is_empty(), "{change:?} second time");
        }
    }

    #[test]
    fn sample_rate_in_khz() {
        let mut state = CachedDeviceState::new();
        let updates = state.apply(&StateChange::SampleRate(SampleRate::from_hz(44100.0)));
        assert_eq!(updates[0].kind, EntityKind::SampleRateSensor);
        assert_eq!(updates[0].value, AttributeValue::Text("44.1".into()));
        assert_eq!(state.sample_rate_khz(), "44.1");
    }

    #[test]
    fn source_index_resolves_through_labels() {
        let mut state = labelled();
        let updates = state.apply(&StateChange::Source(SourceRef::Index(1)));
        assert_eq!(updates[0].value, AttributeValue::Text("HDMI2".into()));
        assert_eq!(state.current_source(), Some("HDMI2"));
    }

    #[test]
    fn sound_mode_resolves_through_table() {
        let mut state = CachedDeviceState::new();
        state.apply(&StateChange::SoundModes(
            [("dts".to_string(), "DTS Neural:X".to_string())].into(),
        ));
        let updates = state.apply(&StateChange::SoundMode("dts".into()));
        assert_eq!(updates[0].value, AttributeValue::Text("DTS Neural:X".into()));
    }

    #[test]
    fn reverse_lookups() {
        let state = labelled();
        assert_eq!(state.source_index("HDMI2"), Ok(1));
        assert_eq!(
            state.source_index("HDMI9"),
            Err(CommandError::UnknownLabel("HDMI9".into()))
        );
        assert_eq!(
            CachedDeviceState::new().source_index("HDMI1"),
            Err(CommandError::EmptyLabelTable)
        );
        assert_eq!(
            CachedDeviceState::new().sound_mode_key("Auto"),
            Err(CommandError::EmptyLabelTable)
        );
    }

    #[test]
    fn connection_baselines_cover_every_entity() {
        let mut state = CachedDeviceState::new();

        let up = state.mark_connected();
        assert_eq!(state.state(), MediaState::On);
        assert_eq!(up.len(), EntityKind::ALL.len());
        assert!(up.iter().all(|u| u.attribute == Attribute::State));

        let down = state.mark_disconnected();
        assert_eq!(state.state(), MediaState::Off);
        assert_eq!(down.len(), EntityKind::ALL.len());
        assert!(
            down.iter()
                .filter(|u| u.kind.is_sensor())
                .all(|u| u.value == AttributeValue::Sensor(SensorState::Unavailable))
        );
    }

    #[test]
    fn reconnect_repeats_cached_sources() {
        let mut state = labelled();
        state.apply(&StateChange::Source(SourceRef::Index(1)));
        state.mark_connected();
        state.mark_disconnected();

        let up = state.mark_connected();
        let player: Vec<_> = up
            .iter()
            .filter(|u| u.kind == EntityKind::MediaPlayer)
            .map(|u| (u.attribute, u.value.clone()))
            .collect();
        assert!(player.contains(&(
            Attribute::SourceList,
            AttributeValue::List(vec!["HDMI1".into(), "HDMI2".into()])
        )));
        assert!(player.contains(&(Attribute::Source, AttributeValue::Text("HDMI2".into()))));
        assert!(!player.iter().any(|(attribute, _)| *attribute == Attribute::SoundMode));

        // Same tables re-sent after reconnecting stay suppressed.
        assert!(
            state
                .apply(&StateChange::InputLabels(
                    [(0, "HDMI1".to_string()), (1, "HDMI2".to_string())].into()
                ))
                .is_empty()
        );
    }
}

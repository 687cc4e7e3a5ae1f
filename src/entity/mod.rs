// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing entities.
//!
//! Every configured processor is exposed as six entities: a media player,
//! a remote and four sensors. Entity ids are `<prefix>.<device id>`.
//!
//! The adapters in this module hold the last attribute set pushed to the
//! host for their entity and only let real changes through.

mod attribute;
mod descriptor;
mod media_player;
mod remote;
mod sensor;

use std::fmt;
use std::str::FromStr;

pub use attribute::{Attribute, AttributeValue, Attributes};
pub use descriptor::{EntityDescriptor, MediaPlayerFeature, RemoteFeature};
pub use media_player::MediaPlayerAdapter;
pub use remote::RemoteAdapter;
pub use sensor::{SensorAdapter, UNKNOWN_VALUE};

use crate::error::ValueError;
use crate::event::DeviceId;

/// The six entity types registered per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Media player.
    MediaPlayer,
    /// Remote.
    Remote,
    /// Input sample rate sensor.
    SampleRateSensor,
    /// Audio sync status sensor.
    AudioSyncSensor,
    /// Main volume sensor.
    VolumeSensor,
    /// Mute state sensor.
    MutedSensor,
}

impl EntityKind {
    /// All kinds, in registration order.
    pub const ALL: [Self; 6] = [
        Self::MediaPlayer,
        Self::Remote,
        Self::SampleRateSensor,
        Self::AudioSyncSensor,
        Self::VolumeSensor,
        Self::MutedSensor,
    ];

    /// The sensor kinds.
    pub const SENSORS: [Self; 4] = [
        Self::SampleRateSensor,
        Self::AudioSyncSensor,
        Self::VolumeSensor,
        Self::MutedSensor,
    ];

    /// Returns the entity id prefix.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::MediaPlayer => "media_player",
            Self::Remote => "remote",
            Self::SampleRateSensor => "sample_rate",
            Self::AudioSyncSensor => "audio_sync",
            Self::VolumeSensor => "volume",
            Self::MutedSensor => "muted",
        }
    }

    /// Returns `true` for the four sensor kinds.
    #[must_use]
    pub const fn is_sensor(&self) -> bool {
        !matches!(self, Self::MediaPlayer | Self::Remote)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for EntityKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.prefix() == s)
            .ok_or_else(|| ValueError::InvalidEntityId(s.to_string()))
    }
}

/// Host entity identifier: an entity kind bound to a device.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::entity::{EntityId, EntityKind};
/// use trinnov_bridge::event::DeviceId;
///
/// let id = EntityId::new(EntityKind::MediaPlayer, DeviceId::new("X"));
/// assert_eq!(id.to_string(), "media_player.X");
/// assert_eq!("media_player.X".parse::<EntityId>().unwrap(), id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    kind: EntityKind,
    device_id: DeviceId,
}

impl EntityId {
    /// Creates an entity id.
    #[must_use]
    pub fn new(kind: EntityKind, device_id: DeviceId) -> Self {
        Self { kind, device_id }
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the owning device.
    #[must_use]
    pub const fn device_id(&self) -> &DeviceId {
        &self.device_id
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.prefix(), self.device_id)
    }
}

impl FromStr for EntityId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, device) = s
            .split_once('.')
            .ok_or_else(|| ValueError::InvalidEntityId(s.to_string()))?;
        if device.is_empty() {
            return Err(ValueError::InvalidEntityId(s.to_string()));
        }
        let kind = prefix
            .parse()
            .map_err(|_| ValueError::InvalidEntityId(s.to_string()))?;
        Ok(Self::new(kind, DeviceId::new(device)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique() {
        let mut prefixes: Vec<_> = EntityKind::ALL.iter().map(EntityKind::prefix).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
    }

    #[test]
    fn sensors_are_flagged() {
        assert!(EntityKind::SENSORS.iter().all(EntityKind::is_sensor));
        assert!(!EntityKind::MediaPlayer.is_sensor());
        assert!(!EntityKind::Remote.is_sensor());
    }

    #[test]
    fn entity_id_keeps_dots_in_device_part() {
        let id: EntityId = "sample_rate.trinnov.lan".parse().unwrap();
        assert_eq!(id.kind(), EntityKind::SampleRateSensor);
        assert_eq!(id.device_id().as_str(), "trinnov.lan");
    }

    #[test]
    fn entity_id_rejects_garbage() {
        assert!("media_player".parse::<EntityId>().is_err());
        assert!("light.X".parse::<EntityId>().is_err());
        assert!("remote.".parse::<EntityId>().is_err());
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor entities: sample rate, audio sync, volume and mute.

use super::{Attribute, AttributeValue, Attributes, EntityId, EntityKind};
use crate::event::DeviceId;
use crate::state::CachedDeviceState;
use crate::types::SensorState;

/// Value shown while a sensor has no reading.
pub const UNKNOWN_VALUE: &str = "unknown";

/// Keeps a sensor's last pushed state and value.
#[derive(Debug, Clone)]
pub struct SensorAdapter {
    entity_id: EntityId,
    snapshot: Attributes,
}

impl SensorAdapter {
    /// Creates the adapter for a sensor kind.
    ///
    /// Non-sensor kinds are accepted but never receive sensor updates.
    #[must_use]
    pub fn new(kind: EntityKind, device_id: DeviceId) -> Self {
        Self {
            entity_id: EntityId::new(kind, device_id),
            snapshot: Attributes::from([
                (Attribute::State, AttributeValue::Sensor(SensorState::Unknown)),
                (Attribute::Value, AttributeValue::from(UNKNOWN_VALUE)),
                (Attribute::Unit, AttributeValue::from(UNKNOWN_VALUE)),
            ]),
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.entity_id.kind()
    }

    #[must_use]
    pub fn snapshot(&self) -> &Attributes {
        &self.snapshot
    }

    /// Returns the unit shown next to the reading.
    #[must_use]
    pub const fn unit(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::SampleRateSensor => "kHz",
            EntityKind::VolumeSensor => "dB",
            _ => "",
        }
    }

    /// Builds the sensor's full attribute set from the cache.
    #[must_use]
    pub fn initial_attributes(kind: EntityKind, state: &CachedDeviceState, connected: bool) -> Attributes {
        let sensor_state = if connected {
            SensorState::On
        } else {
            SensorState::Unavailable
        };
        let value = match kind {
            EntityKind::SampleRateSensor => AttributeValue::from(state.sample_rate_khz()),
            EntityKind::AudioSyncSensor => AttributeValue::Bool(state.audio_sync()),
            EntityKind::MutedSensor => AttributeValue::Bool(state.muted()),
            EntityKind::VolumeSensor => state
                .volume()
                .map_or_else(|| AttributeValue::from(UNKNOWN_VALUE), |db| {
                    AttributeValue::Number(db.value())
                }),
            EntityKind::MediaPlayer | EntityKind::Remote => AttributeValue::from(UNKNOWN_VALUE),
        };
        Attributes::from([
            (Attribute::State, AttributeValue::Sensor(sensor_state)),
            (Attribute::Value, value),
            (Attribute::Unit, AttributeValue::from(Self::unit(kind))),
        ])
    }

    /// Returns the state and value entries of `update` that differ from the
    /// last pushed ones and records them.
    ///
    /// A state change to `UNKNOWN` forces the value to `"unknown"`.
    pub fn filter_changed_attributes(&mut self, update: &Attributes) -> Attributes {
        let mut changed = Attributes::new();
        for key in [Attribute::State, Attribute::Value, Attribute::Unit] {
            if let Some(value) = update.get(&key)
                && self.snapshot.get(&key) != Some(value)
            {
                changed.insert(key, value.clone());
            }
        }

        if changed.get(&Attribute::State) == Some(&AttributeValue::Sensor(SensorState::Unknown)) {
            changed.insert(Attribute::Value, AttributeValue::from(UNKNOWN_VALUE));
        }

        for (key, value) in &changed {
            self.snapshot.insert(*key, value.clone());
        }
        changed
    }
}

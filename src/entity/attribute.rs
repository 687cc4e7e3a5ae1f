// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity attribute keys and values.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{MediaState, RemoteState, SensorState};

/// Attribute keys across all entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Entity state.
    State,
    /// Sensor reading.
    Value,
    /// Sensor unit.
    Unit,
    /// Media player mute flag.
    Muted,
    /// Media player volume, 0-100.
    Volume,
    /// Media player current source label.
    Source,
    /// Media player source labels.
    SourceList,
    /// Media player current sound mode label.
    SoundMode,
    /// Media player sound mode labels.
    SoundModeList,
}

/// An attribute value.
///
/// Serialized untagged, so the host sees plain JSON scalars and arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A flag.
    Bool(bool),
    /// A whole number.
    Integer(i64),
    /// A decimal number.
    Number(f64),
    /// A string.
    Text(String),
    /// A list of strings.
    List(Vec<String>),
    /// A media player state.
    Media(MediaState),
    /// A remote state.
    Remote(RemoteState),
    /// A sensor state.
    Sensor(SensorState),
}

/// Attribute set of one entity.
pub type Attributes = BTreeMap<Attribute, AttributeValue>;

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for AttributeValue {
    fn from(value: u8) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<MediaState> for AttributeValue {
    fn from(value: MediaState) -> Self {
        Self::Media(value)
    }
}

impl From<RemoteState> for AttributeValue {
    fn from(value: RemoteState) -> Self {
        Self::Remote(value)
    }
}

impl From<SensorState> for AttributeValue {
    fn from(value: SensorState) -> Self {
        Self::Sensor(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_json() {
        let mut attrs = Attributes::new();
        attrs.insert(Attribute::State, MediaState::On.into());
        attrs.insert(Attribute::Volume, 60u8.into());
        attrs.insert(Attribute::SourceList, vec!["HDMI1".to_string()].into());

        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "ON", "volume": 60, "source_list": ["HDMI1"]})
        );
    }
}

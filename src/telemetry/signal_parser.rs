// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payload parsing for telemetry signals.
//!
//! The device is lax about types: numbers arrive as JSON numbers or numeric
//! strings, flags as booleans, 0/1 or words.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Signal;
use crate::error::ValueError;
use crate::state::{SourceRef, StateChange};
use crate::types::{SampleRate, VolumeDb};

pub(super) fn parse(signal: Signal, value: &Value) -> Result<StateChange, ValueError> {
    let invalid = || ValueError::InvalidTelemetry {
        signal: signal.name(),
        value: value.to_string(),
    };

    match signal {
        Signal::AudioSync => as_flag(value).map(StateChange::AudioSync).ok_or_else(invalid),
        Signal::Mute => as_flag(value).map(StateChange::Mute).ok_or_else(invalid),
        Signal::Volume => as_number(value)
            .map(|db| StateChange::Volume(VolumeDb::new(db)))
            .ok_or_else(invalid),
        Signal::SampleRate => as_number(value)
            .map(|hz| StateChange::SampleRate(SampleRate::from_hz(hz)))
            .ok_or_else(invalid),
        Signal::InputConnector => as_source(value).map(StateChange::Source).ok_or_else(invalid),
        Signal::Upmixer => as_text(value).map(StateChange::SoundMode).ok_or_else(invalid),
        Signal::InputLabels => as_label_table(value)
            .map(StateChange::InputLabels)
            .ok_or_else(invalid),
        Signal::SoundModeList => as_string_table(value)
            .map(StateChange::SoundModes)
            .ok_or_else(invalid),
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "0" | "false" | "off" => Some(false),
            "1" | "true" | "on" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_source(value: &Value) -> Option<SourceRef> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| u32::try_from(i).ok())
            .map(SourceRef::Index),
        Value::String(s) => Some(SourceRef::Label(s.clone())),
        _ => None,
    }
}

/// Accepts `{"0": "HDMI1", ...}` or `["HDMI1", ...]`.
fn as_label_table(value: &Value) -> Option<BTreeMap<u32, String>> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Some((k.trim().parse().ok()?, as_text(v)?)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| Some((u32::try_from(i).ok()?, as_text(v)?)))
            .collect(),
        _ => None,
    }
}

fn as_string_table(value: &Value) -> Option<BTreeMap<String, String>> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Some((k.clone(), as_text(v)?)))
            .collect(),
        _ => None,
    }
}

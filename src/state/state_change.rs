// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed state changes and the attribute updates they produce.

use std::collections::BTreeMap;

use crate::entity::{Attribute, AttributeValue, Attributes, EntityKind};
use crate::types::{SampleRate, VolumeDb};

/// How the device identified the selected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Index into the input label table.
    Index(u32),
    /// The label itself.
    Label(String),
}

/// A single change reported by device telemetry.
///
/// Produced by [`Signal::parse`](crate::telemetry::Signal::parse) and applied
/// to [`CachedDeviceState`](super::CachedDeviceState).
///
/// # Examples
///
/// ```
/// use trinnov_bridge::state::{CachedDeviceState, StateChange};
///
/// let mut state = CachedDeviceState::new();
/// assert!(!state.apply(&StateChange::Mute(true)).is_empty());
/// assert!(state.apply(&StateChange::Mute(true)).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Audio sync lock changed.
    AudioSync(bool),
    /// Selected input changed.
    Source(SourceRef),
    /// Input label table changed.
    InputLabels(BTreeMap<u32, String>),
    /// Sound mode table changed.
    SoundModes(BTreeMap<String, String>),
    /// Input sample rate changed.
    SampleRate(SampleRate),
    /// Selected upmixer changed, by key.
    SoundMode(String),
    /// Main volume changed.
    Volume(VolumeDb),
    /// Mute changed.
    Mute(bool),
}

/// One normalized attribute change for one entity kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUpdate {
    /// Entity kind the attribute belongs to.
    pub kind: EntityKind,
    /// Attribute key.
    pub attribute: Attribute,
    /// New value.
    pub value: AttributeValue,
}

impl AttributeUpdate {
    /// Creates an update.
    #[must_use]
    pub fn new(kind: EntityKind, attribute: Attribute, value: impl Into<AttributeValue>) -> Self {
        Self {
            kind,
            attribute,
            value: value.into(),
        }
    }

    /// Returns the update as a one-entry attribute map.
    #[must_use]
    pub fn to_attributes(&self) -> Attributes {
        Attributes::from([(self.attribute, self.value.clone())])
    }
}

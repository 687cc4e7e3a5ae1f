// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized device event types.

use crate::entity::{Attributes, EntityId};

use super::DeviceId;

/// Events emitted by a device's connection manager.
///
/// Connection events carry only the device id. Updates are already
/// normalized: each names the host entity it is meant for and the subset of
/// that entity's attributes that changed.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::entity::{Attribute, AttributeValue, Attributes, EntityId, EntityKind};
/// use trinnov_bridge::event::{DeviceEvent, DeviceId};
///
/// let device_id = DeviceId::new("X");
/// let connected = DeviceEvent::Connected { device_id: device_id.clone() };
/// assert!(connected.is_connection());
///
/// let mut attributes = Attributes::new();
/// attributes.insert(Attribute::Value, AttributeValue::Number(-40.0));
/// let update = DeviceEvent::Update {
///     entity_id: EntityId::new(EntityKind::VolumeSensor, device_id),
///     attributes,
/// };
/// assert!(update.is_update());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// A connection attempt started.
    Connecting {
        /// The device.
        device_id: DeviceId,
    },

    /// The protocol session is up.
    Connected {
        /// The device.
        device_id: DeviceId,
    },

    /// The protocol session went away.
    Disconnected {
        /// The device.
        device_id: DeviceId,
    },

    /// One or more attributes of an entity changed.
    Update {
        /// Target entity.
        entity_id: EntityId,
        /// Changed attributes only.
        attributes: Attributes,
    },
}

impl DeviceEvent {
    /// Returns the device this event belongs to.
    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        match self {
            Self::Connecting { device_id }
            | Self::Connected { device_id }
            | Self::Disconnected { device_id } => device_id,
            Self::Update { entity_id, .. } => entity_id.device_id(),
        }
    }

    /// Returns `true` for connecting, connected and disconnected events.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        !self.is_update()
    }

    /// Returns `true` for attribute updates.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }

    /// Creates an update event for a single attribute set.
    #[must_use]
    pub fn update(entity_id: EntityId, attributes: Attributes) -> Self {
        Self::Update {
            entity_id,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn device_id_extraction() {
        let id = DeviceId::new("X");

        let event = DeviceEvent::Disconnected {
            device_id: id.clone(),
        };
        assert_eq!(event.device_id(), &id);

        let update = DeviceEvent::update(
            EntityId::new(EntityKind::MediaPlayer, id.clone()),
            Attributes::new(),
        );
        assert_eq!(update.device_id(), &id);
    }

    #[test]
    fn classification() {
        let id = DeviceId::new("X");
        assert!(DeviceEvent::Connecting { device_id: id.clone() }.is_connection());
        let update =
            DeviceEvent::update(EntityId::new(EntityKind::Remote, id), Attributes::new());
        assert!(update.is_update());
        assert!(!update.is_connection());
    }
}

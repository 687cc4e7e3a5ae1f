// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host platform collaborator.

use std::fmt;

use crate::entity::{Attributes, EntityDescriptor, EntityId};

/// Connection state reported to the host for the whole integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceConnectionState {
    /// At least one processor session is up, or the host asked to connect.
    Connected,
    /// Sessions are down.
    Disconnected,
}

impl DeviceConnectionState {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
        }
    }
}

impl fmt::Display for DeviceConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The remote-control platform the entities are exposed to.
///
/// Calls are made from device event tasks and must not block.
pub trait HostPlatform: Send + Sync + 'static {
    /// Makes an entity available, replacing one with the same id.
    fn register_entity(&self, descriptor: EntityDescriptor);

    /// Removes an entity. Unknown ids are ignored.
    fn remove_entity(&self, entity_id: &EntityId);

    /// Pushes changed attributes of an entity.
    ///
    /// Returns `false` if the host does not know the entity.
    fn update_entity_attributes(&self, entity_id: &EntityId, attributes: Attributes) -> bool;

    /// Reports the integration's connection state.
    fn set_device_connection_state(&self, state: DeviceConnectionState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(DeviceConnectionState::Connected.to_string(), "CONNECTED");
        assert_eq!(DeviceConnectionState::Disconnected.as_str(), "DISCONNECTED");
    }
}

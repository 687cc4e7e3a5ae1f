// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a configured Trinnov processor.
///
/// Devices report a stable serial-derived id over discovery, so the id is a
/// plain string rather than a generated value. It is the key for the
/// registry, the persisted store and every entity id.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::event::DeviceId;
///
/// let id = DeviceId::new("X");
/// assert_eq!(id.as_str(), "X");
/// assert_eq!(id.to_string(), "X");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for DeviceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_value() {
        assert_eq!(DeviceId::new("abc"), DeviceId::from("abc"));
        assert_ne!(DeviceId::new("abc"), DeviceId::new("abd"));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", DeviceId::new("X")), "DeviceId(X)");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&DeviceId::new("srp-1")).unwrap();
        assert_eq!(json, "\"srp-1\"");
        let back: DeviceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "srp-1");
    }

    #[test]
    fn hashable_and_borrowable() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(DeviceId::new("X"), 1);
        assert_eq!(map.get("X"), Some(&1));
    }
}

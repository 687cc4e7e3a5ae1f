// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted list of configured processors.
//!
//! A JSON array of [`DeviceIdentity`] records in one file. Every mutation is
//! written back immediately.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;
use crate::event::DeviceId;
use crate::manager::DeviceIdentity;

/// File name used inside the data directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// JSON-file-backed device list.
///
/// # Examples
///
/// ```no_run
/// use trinnov_bridge::manager::DeviceIdentity;
/// use trinnov_bridge::store::DeviceStore;
///
/// # fn example() -> Result<(), trinnov_bridge::error::ConfigError> {
/// let mut store = DeviceStore::open("/data");
/// store.add(DeviceIdentity::new("X", "Trinnov Altitude16", "10.0.0.5", "AA:BB"))?;
/// assert!(store.contains(&"X".into()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceStore {
    path: PathBuf,
    devices: Vec<DeviceIdentity>,
}

impl DeviceStore {
    /// Creates an empty store writing to `<data_dir>/config.json`.
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_path(data_dir.as_ref().join(DEFAULT_CONFIG_FILE))
    }

    /// Creates an empty store writing to `path`.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            devices: Vec::new(),
        }
    }

    /// Creates a store in `data_dir` and loads whatever is there.
    #[must_use]
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let mut store = Self::new(data_dir);
        store.load();
        store
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory list with the file content.
    ///
    /// A missing file gives an empty list. An unreadable or malformed file
    /// gives an empty list and an error log. Records that fail validation
    /// are skipped with a warning. Returns `true` if the file was read.
    pub fn load(&mut self) -> bool {
        self.devices.clear();

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no config file, starting empty");
                return false;
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "cannot open the config file");
                return false;
            }
        };

        let items: Vec<Value> = match serde_json::from_str(&content) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "config file contains invalid JSON");
                return false;
            }
        };

        for item in items {
            match serde_json::from_value::<DeviceIdentity>(item.clone()) {
                Ok(identity) if identity.is_valid() => {
                    if self.contains(&identity.id) {
                        tracing::warn!(device_id = %identity.id, "skipping duplicate config item");
                    } else {
                        self.devices.push(identity);
                    }
                }
                Ok(_) => tracing::warn!(%item, "skipping invalid config item"),
                Err(e) => tracing::warn!(%item, error = %e, "invalid device format"),
            }
        }
        tracing::debug!(count = self.devices.len(), "config loaded");
        true
    }

    /// Returns the number of stored devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterates over the stored devices.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceIdentity> {
        self.devices.iter()
    }

    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.iter().any(|d| &d.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceIdentity> {
        self.devices.iter().find(|d| &d.id == id)
    }

    /// Adds a device and writes the file.
    ///
    /// Returns `Ok(false)` without writing if the id is already stored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file could not be written.
    pub fn add(&mut self, identity: DeviceIdentity) -> Result<bool, ConfigError> {
        if self.contains(&identity.id) {
            tracing::warn!(device_id = %identity.id, "device already exists");
            return Ok(false);
        }
        let id = identity.id.clone();
        let mut devices = self.devices.clone();
        devices.push(identity);
        self.commit(devices)?;
        tracing::info!(device_id = %id, "device added and stored");
        Ok(true)
    }

    /// Replaces a stored device with the same id and writes the file.
    ///
    /// Returns `Ok(false)` if the id is not stored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file could not be written.
    pub fn update(&mut self, identity: DeviceIdentity) -> Result<bool, ConfigError> {
        let Some(index) = self.devices.iter().position(|d| d.id == identity.id) else {
            tracing::warn!(device_id = %identity.id, "device not found for update");
            return Ok(false);
        };
        let id = identity.id.clone();
        let mut devices = self.devices.clone();
        devices[index] = identity;
        self.commit(devices)?;
        tracing::info!(device_id = %id, "device updated and stored");
        Ok(true)
    }

    /// Removes a device and writes the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file could not be written.
    pub fn remove(&mut self, id: &DeviceId) -> Result<Option<DeviceIdentity>, ConfigError> {
        let Some(index) = self.devices.iter().position(|d| &d.id == id) else {
            tracing::warn!(device_id = %id, "device not found for removal");
            return Ok(None);
        };
        let mut devices = self.devices.clone();
        let removed = devices.remove(index);
        self.commit(devices)?;
        tracing::info!(device_id = %id, "device removed and changes stored");
        Ok(Some(removed))
    }

    /// Forgets every device and deletes the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but could not be removed.
    pub fn clear(&mut self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.devices.clear();
        tracing::info!("all devices cleared and config file removed");
        Ok(())
    }

    /// Writes `devices` to the file, then makes them the current list.
    /// On error the current list is left as it was.
    fn commit(&mut self, devices: Vec<DeviceIdentity>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&devices)?;
        fs::write(&self.path, json)?;
        self.devices = devices;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DeviceStore {
    type Item = &'a DeviceIdentity;
    type IntoIter = std::slice::Iter<'a, DeviceIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn altitude(id: &str) -> DeviceIdentity {
        DeviceIdentity::new(id, "Trinnov Altitude16", "10.0.0.5", "AA:BB:CC:DD:EE:FF")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        assert!(!store.load());
        assert!(store.is_empty());
    }

    #[test]
    fn mutations_are_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        assert!(store.add(altitude("X")).unwrap());
        assert!(store.add(altitude("Y")).unwrap());

        let reloaded = DeviceStore::open(dir.path());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(&"X".into()).map(|d| d.ip.as_str()), Some("10.0.0.5"));

        assert!(store.remove(&"X".into()).unwrap().is_some());
        assert_eq!(DeviceStore::open(dir.path()).len(), 1);
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        assert!(store.add(altitude("X")).unwrap());
        assert!(!store.add(altitude("X").with_model_name("Altitude32")).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"X".into()).and_then(|d| d.model_name.clone()), None);
    }

    #[test]
    fn update_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        store.add(altitude("X")).unwrap();

        assert!(store.update(altitude("X").with_software_version("4.3")).unwrap());
        assert!(!store.update(altitude("Z")).unwrap());

        let reloaded = DeviceStore::open(dir.path());
        assert_eq!(
            reloaded.get(&"X".into()).and_then(|d| d.software_version.as_deref()),
            Some("4.3")
        );
    }

    #[test]
    fn invalid_records_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"[
                {"id": "X", "name": "Trinnov", "ip": "10.0.0.5", "mac": "AA:BB"},
                {"id": "", "name": "Trinnov", "ip": "10.0.0.6", "mac": "AA:BC"},
                {"name": "no id"},
                42
            ]"#,
        )
        .unwrap();

        let store = DeviceStore::open(dir.path());
        assert_eq!(store.len(), 1);
        assert!(store.contains(&"X".into()));
    }

    #[test]
    fn invalid_json_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{not json").unwrap();
        let mut store = DeviceStore::new(dir.path());
        assert!(!store.load());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        store.add(altitude("X")).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn failed_write_leaves_devices_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DeviceStore::new(dir.path());
        store.add(altitude("X")).unwrap();

        // A directory in place of the file makes every write fail.
        fs::remove_file(store.path()).unwrap();
        fs::create_dir(store.path()).unwrap();

        assert!(store.add(altitude("Y")).is_err());
        assert!(store.update(altitude("X").with_software_version("4.3")).is_err());
        assert!(store.remove(&"X".into()).is_err());

        assert_eq!(store.len(), 1);
        assert!(!store.contains(&"Y".into()));
        let kept = store.get(&"X".into()).unwrap();
        assert_eq!(kept.software_version, None);
    }
}

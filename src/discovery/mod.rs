// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! mDNS discovery results for Trinnov processors.
//!
//! Processors advertise [`SERVICE_TYPE`] on the local network. The mDNS
//! browsing itself is done by a [`ServiceBrowser`] implementation; this
//! module bounds the wait and turns the first answer into a
//! [`DeviceIdentity`].
//!
//! # TXT records
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `srpid` | Serial-derived product id, used as device id |
//! | `id` | MAC address |
//! | `machine_class_name` | Model, e.g. `Altitude16` |
//! | `version` | Firmware version |
//!
//! # Examples
//!
//! ```ignore
//! use trinnov_bridge::discovery::{DiscoveryOptions, discover};
//!
//! if let Some(found) = discover(&browser, &DiscoveryOptions::new()).await {
//!     let identity = found.to_identity();
//!     println!("found {identity}");
//! }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manager::DeviceIdentity;

/// Service type advertised by the processor.
pub const SERVICE_TYPE: &str = "_trinnovtelnet._tcp.local.";

/// Default discovery timeout.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder for TXT keys the device did not send.
const UNKNOWN: &str = "Unknown";

/// A processor found on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// IPv4 address.
    pub ip: String,
    /// Advertised port.
    pub port: u16,
    /// Host name, without the trailing dot.
    pub hostname: String,
    /// Decoded TXT records.
    pub txt_records: HashMap<String, String>,
}

impl DiscoveredDevice {
    /// Creates a record without TXT entries.
    #[must_use]
    pub fn new(ip: impl Into<String>, port: u16, hostname: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            hostname: hostname.into(),
            txt_records: HashMap::new(),
        }
    }

    /// Adds a TXT record.
    #[must_use]
    pub fn with_txt(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.txt_records.insert(key.into(), value.into());
        self
    }

    /// Returns a TXT value.
    #[must_use]
    pub fn txt(&self, key: &str) -> Option<&str> {
        self.txt_records.get(key).map(String::as_str)
    }

    /// Returns the product id.
    #[must_use]
    pub fn srpid(&self) -> Option<&str> {
        self.txt("srpid")
    }

    /// Returns the MAC address.
    #[must_use]
    pub fn mac(&self) -> Option<&str> {
        self.txt("id")
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.txt("machine_class_name")
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.txt("version")
    }

    /// Builds the identity to persist for this device.
    ///
    /// Missing TXT keys become `"Unknown"`. The name is `"Trinnov <model>"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trinnov_bridge::discovery::DiscoveredDevice;
    ///
    /// let found = DiscoveredDevice::new("10.0.0.5", 44100, "altitude")
    ///     .with_txt("srpid", "1234")
    ///     .with_txt("id", "AA:BB:CC:DD:EE:FF")
    ///     .with_txt("machine_class_name", "Altitude16");
    ///
    /// let identity = found.to_identity();
    /// assert_eq!(identity.id.as_str(), "1234");
    /// assert_eq!(identity.name, "Trinnov Altitude16");
    /// assert_eq!(identity.software_version.as_deref(), Some("Unknown"));
    /// ```
    #[must_use]
    pub fn to_identity(&self) -> DeviceIdentity {
        let model = self.model().unwrap_or(UNKNOWN);
        if self.srpid().is_none() {
            tracing::warn!(ip = %self.ip, "discovered device has no srpid");
        }
        DeviceIdentity::new(
            self.srpid().unwrap_or(UNKNOWN),
            format!("Trinnov {model}"),
            self.ip.clone(),
            self.mac().unwrap_or(UNKNOWN),
        )
        .with_model_name(model)
        .with_software_version(self.version().unwrap_or(UNKNOWN))
    }
}

/// Options for a discovery run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    timeout: Option<Duration>,
    service_type: Option<String>,
}

impl DiscoveryOptions {
    /// Creates options with a 5 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discovery timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the service type browsed for.
    #[must_use]
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_DISCOVERY_TIMEOUT)
    }

    #[must_use]
    pub fn service_type(&self) -> &str {
        self.service_type.as_deref().unwrap_or(SERVICE_TYPE)
    }
}

/// Source of mDNS answers.
pub trait ServiceBrowser: Send + Sync {
    /// Resolves once the first device advertising `service_type` answers.
    ///
    /// May stay pending forever; [`discover`] bounds the wait.
    fn browse(&self, service_type: &str) -> impl Future<Output = Option<DiscoveredDevice>> + Send;
}

/// Waits for the first processor to answer, up to the configured timeout.
pub async fn discover<B: ServiceBrowser>(browser: &B, options: &DiscoveryOptions) -> Option<DiscoveredDevice> {
    let timeout = options.timeout();
    tracing::info!(
        service_type = options.service_type(),
        timeout_secs = timeout.as_secs(),
        "searching for Trinnov device via mDNS"
    );

    match tokio::time::timeout(timeout, browser.browse(options.service_type())).await {
        Ok(Some(found)) => {
            tracing::info!(hostname = %found.hostname, ip = %found.ip, port = found.port, "found Trinnov");
            tracing::debug!(txt = ?found.txt_records, "TXT records");
            Some(found)
        }
        Ok(None) | Err(_) => {
            tracing::warn!("no Trinnov device found via mDNS");
            None
        }
    }
}

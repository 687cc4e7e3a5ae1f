// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Volume types and the dB/percent mapping.
//!
//! The processor works in dB. Host entities that model volume as a slider
//! use a 0-100 percentage instead. Both directions go through the same
//! linear mapping of `[-100.0, 0.0]` dB onto `[0, 100]` %, clamped at both
//! ends.

use std::fmt;

use crate::error::ValueError;

/// Lower end of the mapped dB range.
pub const MIN_DB: f64 = -100.0;

/// Upper end of the mapped dB range.
pub const MAX_DB: f64 = 0.0;

/// Main volume in device-native dB.
///
/// Any finite value is accepted; the device itself may report levels
/// outside the mapped range, which only clamp when converted to percent.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::types::VolumeDb;
///
/// let vol = VolumeDb::new(-40.0);
/// assert_eq!(vol.to_percent().value(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct VolumeDb(f64);

impl VolumeDb {
    /// Creates a volume from a dB value.
    #[must_use]
    pub const fn new(db: f64) -> Self {
        Self(db)
    }

    /// Returns the raw dB value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }

    /// Converts to the host-facing percentage.
    #[must_use]
    pub fn to_percent(&self) -> VolumePercent {
        VolumePercent(db_to_percent(self.0))
    }
}

impl fmt::Display for VolumeDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} dB", self.0)
    }
}

impl From<f64> for VolumeDb {
    fn from(db: f64) -> Self {
        Self(db)
    }
}

/// Volume as a percentage (0-100) of the mapped dB range.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::types::VolumePercent;
///
/// let pct = VolumePercent::new(75).unwrap();
/// assert!((pct.to_db().value() - -25.0).abs() < f64::EPSILON);
///
/// assert!(VolumePercent::new(101).is_err());
/// assert_eq!(VolumePercent::clamped(-5).value(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Creates a percentage.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::PercentOutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::PercentOutOfRange(i64::from(value)));
        }
        Ok(Self(value))
    }

    /// Creates a percentage, clamping to 0-100.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        // Clamped into 0..=100 first, so the narrowing is lossless.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = value.clamp(0, 100) as u8;
        Self(value)
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Converts to device-native dB.
    #[must_use]
    pub fn to_db(&self) -> VolumeDb {
        VolumeDb(percent_to_db(self.0))
    }
}

impl fmt::Display for VolumePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Maps a dB level onto 0-100 %, clamping outside `[MIN_DB, MAX_DB]`.
///
/// Rounds to the nearest integer so that [`percent_to_db`] followed by this
/// function is the identity for every integer percentage.
#[must_use]
pub fn db_to_percent(db: f64) -> u8 {
    let percent = (db - MIN_DB) / (MAX_DB - MIN_DB) * 100.0;
    // Clamped into 0.0..=100.0, so the cast cannot truncate or lose sign.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = percent.clamp(0.0, 100.0).round() as u8;
    percent
}

/// Maps a percentage onto `[MIN_DB, MAX_DB]`. Values above 100 clamp to 100.
#[must_use]
pub fn percent_to_db(percent: u8) -> f64 {
    let percent = f64::from(percent.min(100));
    percent / 100.0 * (MAX_DB - MIN_DB) + MIN_DB
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Audio sample rate.

use std::fmt;

/// Input sample rate as reported by the processor, in Hz.
///
/// Displayed in kHz with one decimal, which is how the sample-rate sensor
/// presents it.
///
/// # Examples
///
/// ```
/// use trinnov_bridge::types::SampleRate;
///
/// assert_eq!(SampleRate::from_hz(48000.0).to_khz_string(), "48.0");
/// assert_eq!(SampleRate::from_hz(44100.0).to_khz_string(), "44.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f64);

impl SampleRate {
    /// Creates a sample rate from a value in Hz.
    #[must_use]
    pub const fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    /// Returns the rate in Hz.
    #[must_use]
    pub const fn hz(&self) -> f64 {
        self.0
    }

    /// Returns the rate in kHz.
    #[must_use]
    pub fn khz(&self) -> f64 {
        self.0 / 1000.0
    }

    /// Formats the rate in kHz with one decimal.
    #[must_use]
    pub fn to_khz_string(&self) -> String {
        format!("{:.1}", self.khz())
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.to_khz_string())
    }
}

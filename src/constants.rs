// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Sidereal times are always in
radians within the library; user-facing windows are in seconds.
 */

pub use std::f64::consts::{PI, TAU};

/// The number of seconds in a (sidereal) day, used to convert sidereal-time
/// windows into angles.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Observations within this many seconds of sidereal time of each other are
/// paired for the temperature fit.
pub const DEFAULT_LST_WINDOW_SECONDS: f64 = 600.0;

/// Two consecutive runs must share at least this many observations in LST
/// before a relative scale between them is computed.
pub const DEFAULT_MIN_OVERLAP: usize = 15;

/// The lower edge of the frequency band used for an observation's median
/// power [MHz].
pub const DEFAULT_BAND_LOW_MHZ: f64 = 40.0;

/// The upper edge of the frequency band used for an observation's median
/// power [MHz].
pub const DEFAULT_BAND_HIGH_MHZ: f64 = 70.0;

/// An observation needs at least this many LST neighbours before it
/// contributes power ratios to the temperature fit.
pub const MIN_FIT_NEIGHBOURS: usize = 2;

/// LWA1 longitude [degrees]
pub const LWA1_LONG_DEG: f64 = -107.628350;

/// The suffix appended to an observation's file stem to name its gain
/// correction file.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_gain_corr.txt";

/// Convert a sidereal-time duration in seconds into radians of LST.
pub fn lst_seconds_to_radians(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY * TAU
}

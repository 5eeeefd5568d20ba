// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Gain-drift corrections for drift-scan total-power spectra from the Long
Wavelength Array (LWA).

Each observation's correction is the product of a temperature-dependent
part, from a plane fitted to the power ratios of observations close in
sidereal time, and the relative scale of its observing run, found from the
sidereal overlap between consecutive runs.
 */

mod cli;
pub mod constants;
mod drift;
mod filenames;
mod io;
pub(crate) mod math;
mod observation;
mod params;
mod telemetry;

use crossbeam_utils::atomic::AtomicCell;

lazy_static::lazy_static! {
    /// Are progress bars being drawn? This should only ever be enabled by CLI
    /// code.
    static ref PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
}

// Re-exports.
pub use cli::{Driftcal, DriftcalError};
pub use drift::{
    estimate_gain_drift, DriftError, DriftSettings, DriftSolution, GainCorrection,
};
pub use observation::ObservationRecord;

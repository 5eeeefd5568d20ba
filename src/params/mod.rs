// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for `driftcal` subcommands.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly.

mod gain_drift;
mod telemetry_summary;

pub(crate) use gain_drift::{GainDriftError, GainDriftParams};
pub(crate) use telemetry_summary::TelemetrySummaryParams;

use std::path::PathBuf;

use crate::telemetry::{load_telemetry, IndoorSource, Telemetry, TelemetryError};

/// Where the temperature telemetry comes from.
#[derive(Debug, Clone)]
pub(crate) struct TelemetryParams {
    pub(crate) weather_log: PathBuf,
    /// Empty if the indoor temperature comes from the weather log.
    pub(crate) subsystem_logs: Vec<PathBuf>,
    pub(crate) indoor_source: IndoorSource,
}

impl TelemetryParams {
    pub(crate) fn load(&self) -> Result<Telemetry, TelemetryError> {
        load_telemetry(&self.weather_log, &self.subsystem_logs, self.indoor_source)
    }
}

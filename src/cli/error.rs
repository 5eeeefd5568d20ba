// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for everything the `driftcal` binary can run into. The library
//! API only adds `DriftError`.

use thiserror::Error;

use super::{common::TelemetryArgsError, gain_drift::GainDriftArgsError};
use crate::{
    drift::DriftError,
    filenames::InputFileError,
    io::{write::CorrectionWriteError, GlobError},
    observation::ObservationError,
    params::GainDriftError,
    telemetry::TelemetryError,
};

/// The error reported by driftcal's command line. Each error message should
/// include a hint, unless it's "generic".
#[derive(Error, Debug)]
pub enum DriftcalError {
    /// An error related to gain-drift arguments.
    #[error("{0}\n\nSee `driftcal gain-drift --help` for the available options.")]
    GainDrift(String),

    /// An error related to telemetry logs.
    #[error("{0}\n\nWeather logs need a unix timestamp in field 0 and temperatures in fields 6 and 7; subsystem logs need rows of \"timestamp, t1, t2, t3, t4\".")]
    Telemetry(String),

    /// An error related to observation archives.
    #[error("{0}\n\nObservation archives are JSON (optionally gzipped) with \"date\", \"freq\" and \"spectra\" fields.")]
    Observation(String),

    /// The gain-temperature plane couldn't be fitted.
    #[error("{0}\n\nThe temperatures must vary between observations that are close in LST; a wider LST window (--lst-window) may help.")]
    Fit(String),

    /// An error related to writing gain corrections.
    #[error("{0}")]
    Output(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files may be toml or json, with the same names as the command-line arguments.")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<GainDriftArgsError> for DriftcalError {
    fn from(e: GainDriftArgsError) -> Self {
        match e {
            GainDriftArgsError::InputFile(e) => Self::from(e),
            GainDriftArgsError::Output(e) => Self::from(e),
            GainDriftArgsError::NoData
            | GainDriftArgsError::BadLstWindow(_)
            | GainDriftArgsError::ZeroMinOverlap
            | GainDriftArgsError::BandNeedsTwoValues(_)
            | GainDriftArgsError::BadBand { .. }
            | GainDriftArgsError::BadLongitude(_)
            | GainDriftArgsError::BadDut1(_)
            | GainDriftArgsError::EmptySuffix => Self::GainDrift(e.to_string()),
        }
    }
}

impl From<TelemetryArgsError> for DriftcalError {
    fn from(e: TelemetryArgsError) -> Self {
        match e {
            TelemetryArgsError::InputFile(e) => Self::from(e),
            TelemetryArgsError::Glob(e) => Self::from(e),
            TelemetryArgsError::NoWeatherLog
            | TelemetryArgsError::NoSubsystemLogs
            | TelemetryArgsError::BadIndoorSource(_) => Self::Telemetry(e.to_string()),
        }
    }
}

impl From<GainDriftError> for DriftcalError {
    fn from(e: GainDriftError) -> Self {
        match e {
            GainDriftError::Telemetry(e) => Self::from(e),
            GainDriftError::Observation(e) => Self::from(e),
            GainDriftError::Drift(e) => Self::from(e),
            GainDriftError::Write(e) => Self::from(e),
        }
    }
}

impl From<TelemetryError> for DriftcalError {
    fn from(e: TelemetryError) -> Self {
        let s = e.to_string();
        match e {
            TelemetryError::EmptySeries { .. } | TelemetryError::NoFiles { .. } => {
                Self::Telemetry(s)
            }
            TelemetryError::IO { .. } => Self::Generic(s),
        }
    }
}

impl From<ObservationError> for DriftcalError {
    fn from(e: ObservationError) -> Self {
        let s = e.to_string();
        match e {
            ObservationError::IO { .. } => Self::Generic(s),
            ObservationError::Decode { .. }
            | ObservationError::BadDate { .. }
            | ObservationError::NoSpectra { .. }
            | ObservationError::RaggedSpectra { .. }
            | ObservationError::EmptyBand { .. }
            | ObservationError::BadPower { .. } => Self::Observation(s),
        }
    }
}

impl From<DriftError> for DriftcalError {
    fn from(e: DriftError) -> Self {
        let s = e.to_string();
        match e {
            DriftError::NoObservations => Self::GainDrift(s),
            DriftError::SingularFit { .. } => Self::Fit(s),
        }
    }
}

impl From<CorrectionWriteError> for DriftcalError {
    fn from(e: CorrectionWriteError) -> Self {
        Self::Output(e.to_string())
    }
}

impl From<InputFileError> for DriftcalError {
    fn from(e: InputFileError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<GlobError> for DriftcalError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for DriftcalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

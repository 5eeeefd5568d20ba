// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `gain-drift` and
//! `telemetry-summary` subcommands read the same telemetry logs, so the
//! telemetry arguments are shared between them.

mod printers;
#[cfg(test)]
mod tests;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    filenames::{telemetry_files, InputFileError},
    io::{single_glob_file, GlobError},
    params::TelemetryParams,
    telemetry::{IndoorSource, INDOOR_SOURCES_COMMA_SEPARATED},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref INDOOR_SOURCE_HELP: String =
        format!("Where the indoor temperature comes from. Supported sources: {}. Default: {}", *INDOOR_SOURCES_COMMA_SEPARATED, IndoorSource::default());
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(DriftcalError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(DriftcalError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(DriftcalError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments for the temperature telemetry.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TelemetryArgs {
    /// Path to the weather-station log (optionally gzipped). Field 0 of each
    /// row is a unix timestamp, field 6 the indoor temperature and field 7 the
    /// outdoor temperature. A glob matching exactly one file may be used.
    #[clap(short, long, help_heading = "TELEMETRY")]
    pub(super) weather: Option<String>,

    /// Paths or globs to the subsystem-temperature logs (optionally gzipped).
    /// Each row is "timestamp, t1, t2, t3, t4".
    #[clap(short, long, multiple_values(true), help_heading = "TELEMETRY")]
    pub(super) subsystem_temps: Option<Vec<String>>,

    #[clap(long, help = INDOOR_SOURCE_HELP.as_str(), help_heading = "TELEMETRY")]
    pub(super) indoor_source: Option<String>,
}

impl TelemetryArgs {
    /// Merge two sets of telemetry arguments, preferring `self`.
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            weather: self.weather.or(other.weather),
            subsystem_temps: self.subsystem_temps.or(other.subsystem_temps),
            indoor_source: self.indoor_source.or(other.indoor_source),
        }
    }

    pub(super) fn parse(self) -> Result<TelemetryParams, TelemetryArgsError> {
        let Self {
            weather,
            subsystem_temps,
            indoor_source,
        } = self;

        let indoor_source = match indoor_source {
            None => IndoorSource::default(),
            Some(s) => IndoorSource::from_str(&s.to_lowercase())
                .map_err(|_| TelemetryArgsError::BadIndoorSource(s))?,
        };

        let weather_log = match weather {
            None => return Err(TelemetryArgsError::NoWeatherLog),
            Some(w) => {
                if Path::new(&w).exists() {
                    PathBuf::from(w)
                } else {
                    single_glob_file(&w, "weather log")?
                }
            }
        };

        let subsystem_logs = match (indoor_source, subsystem_temps) {
            (IndoorSource::Subsystem, None) => return Err(TelemetryArgsError::NoSubsystemLogs),
            (IndoorSource::Subsystem, Some(s)) => {
                telemetry_files(&s, "subsystem temperature logs")?.into_vec()
            }
            (IndoorSource::Weather, Some(_)) => {
                "Subsystem temperature logs are ignored when the indoor temperature comes from the weather log".warn();
                vec![]
            }
            (IndoorSource::Weather, None) => vec![],
        };

        debug!("Weather log: {}", weather_log.display());
        debug!("Subsystem temperature logs: {subsystem_logs:?}");
        Ok(TelemetryParams {
            weather_log,
            subsystem_logs,
            indoor_source,
        })
    }
}

#[derive(Error, Debug)]
pub(super) enum TelemetryArgsError {
    #[error("No weather log was supplied")]
    NoWeatherLog,

    #[error("No subsystem temperature logs were supplied; these are needed when the indoor temperature comes from the subsystem")]
    NoSubsystemLogs,

    #[error("Unrecognised indoor temperature source '{0}'. Supported sources: {srcs}", srcs = *INDOOR_SOURCES_COMMA_SEPARATED)]
    BadIndoorSource(String),

    #[error(transparent)]
    InputFile(#[from] InputFileError),

    #[error(transparent)]
    Glob(#[from] GlobError),
}

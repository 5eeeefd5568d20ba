// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.


use std::path::PathBuf;

use clap::Parser;
use hifitime::Duration;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, TelemetryArgs, ARG_FILE_HELP};
use crate::{
    constants::{
        lst_seconds_to_radians, DEFAULT_BAND_HIGH_MHZ, DEFAULT_BAND_LOW_MHZ,
        DEFAULT_LST_WINDOW_SECONDS, DEFAULT_MIN_OVERLAP, DEFAULT_OUTPUT_SUFFIX, LWA1_LONG_DEG,
    },
    drift::DriftSettings,
    filenames::{observation_files, InputFileError},
    io::write::{prepare_outputs, CorrectionWriteError},
    observation::{file_id, Site, SubBand},
    params::GainDriftParams,
    DriftcalError,
};

lazy_static::lazy_static! {
    static ref LST_WINDOW_HELP: String =
        format!("Observations closer than this in sidereal time are compared for the temperature fit [seconds]. Default: {DEFAULT_LST_WINDOW_SECONDS}");

    static ref MIN_OVERLAP_HELP: String =
        format!("The number of observations that consecutive runs must share in LST before one is scaled to the other. Default: {DEFAULT_MIN_OVERLAP}");

    static ref BAND_HELP: String =
        format!("The frequency band used for each observation's median power [MHz]. Channels strictly between the edges are used. Default: {DEFAULT_BAND_LOW_MHZ} {DEFAULT_BAND_HIGH_MHZ}");

    static ref LONGITUDE_HELP: String =
        format!("The longitude of the telescope, used for sidereal times [degrees]. Default (LWA1): {LWA1_LONG_DEG}");

    static ref SUFFIX_HELP: String =
        format!("Appended to each observation's file stem to name its gain correction file. Default: {DEFAULT_OUTPUT_SUFFIX}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct GainDriftArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// Paths to the observation archives (JSON, optionally gzipped). Globs are
    /// allowed. A single ".txt" file is read as a list of archives, one per
    /// line.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    pub(super) data: Option<Vec<String>>,

    #[clap(flatten)]
    #[serde(rename = "telemetry")]
    #[serde(default)]
    pub(super) telemetry_args: TelemetryArgs,

    #[clap(long, help = LST_WINDOW_HELP.as_str(), help_heading = "DRIFT ESTIMATION")]
    pub(super) lst_window: Option<f64>,

    #[clap(long, help = MIN_OVERLAP_HELP.as_str(), help_heading = "DRIFT ESTIMATION")]
    pub(super) min_overlap: Option<usize>,

    #[clap(long, number_of_values = 2, value_names = &["LOW_MHZ", "HIGH_MHZ"], help = BAND_HELP.as_str(), help_heading = "DRIFT ESTIMATION")]
    pub(super) band: Option<Vec<f64>>,

    #[clap(long, allow_hyphen_values = true, help = LONGITUDE_HELP.as_str(), help_heading = "DRIFT ESTIMATION")]
    pub(super) longitude: Option<f64>,

    /// The difference between UT1 and UTC used for sidereal times [seconds].
    /// Default: 0
    #[clap(long, allow_hyphen_values = true, help_heading = "DRIFT ESTIMATION")]
    pub(super) dut1: Option<f64>,

    /// The directory to write gain corrections into. It is created if it
    /// doesn't exist. Default: the current directory
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output_dir: Option<PathBuf>,

    #[clap(long, help = SUFFIX_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) suffix: Option<String>,
}

impl GainDriftArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<GainDriftArgs, DriftcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let GainDriftArgs {
                args_file: _,
                data,
                telemetry_args,
                lst_window,
                min_overlap,
                band,
                longitude,
                dut1,
                output_dir,
                suffix,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(GainDriftArgs {
                args_file: None,
                data: cli_args.data.or(data),
                telemetry_args: cli_args.telemetry_args.merge(telemetry_args),
                lst_window: cli_args.lst_window.or(lst_window),
                min_overlap: cli_args.min_overlap.or(min_overlap),
                band: cli_args.band.or(band),
                longitude: cli_args.longitude.or(longitude),
                dut1: cli_args.dut1.or(dut1),
                output_dir: cli_args.output_dir.or(output_dir),
                suffix: cli_args.suffix.or(suffix),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<GainDriftParams, DriftcalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data,
            telemetry_args,
            lst_window,
            min_overlap,
            band,
            longitude,
            dut1,
            output_dir,
            suffix,
        } = self;

        let data = data.ok_or(GainDriftArgsError::NoData)?;
        let observations = observation_files(&data).map_err(GainDriftArgsError::from)?;
        let telemetry = telemetry_args.parse()?;

        let lst_window_seconds = lst_window.unwrap_or(DEFAULT_LST_WINDOW_SECONDS);
        if !lst_window_seconds.is_finite() || lst_window_seconds <= 0.0 {
            return Err(GainDriftArgsError::BadLstWindow(lst_window_seconds).into());
        }
        let min_overlap = min_overlap.unwrap_or(DEFAULT_MIN_OVERLAP);
        if min_overlap == 0 {
            return Err(GainDriftArgsError::ZeroMinOverlap.into());
        }

        let (low_mhz, high_mhz) = match band.as_deref() {
            None => (DEFAULT_BAND_LOW_MHZ, DEFAULT_BAND_HIGH_MHZ),
            Some(&[low, high]) => (low, high),
            Some(b) => return Err(GainDriftArgsError::BandNeedsTwoValues(b.len()).into()),
        };
        if !(low_mhz.is_finite() && high_mhz.is_finite() && 0.0 <= low_mhz && low_mhz < high_mhz)
        {
            return Err(GainDriftArgsError::BadBand {
                low: low_mhz,
                high: high_mhz,
            }
            .into());
        }

        let longitude_deg = longitude.unwrap_or(LWA1_LONG_DEG);
        if !longitude_deg.is_finite() || longitude_deg.abs() > 360.0 {
            return Err(GainDriftArgsError::BadLongitude(longitude_deg).into());
        }
        let dut1_seconds = dut1.unwrap_or(0.0);
        if !dut1_seconds.is_finite() {
            return Err(GainDriftArgsError::BadDut1(dut1_seconds).into());
        }

        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
        let suffix = suffix.unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        if suffix.is_empty() {
            return Err(GainDriftArgsError::EmptySuffix.into());
        }
        let file_ids: Vec<String> = observations.iter().map(|f| file_id(f)).collect();
        let outputs = prepare_outputs(&output_dir, file_ids.iter().map(|s| s.as_str()), &suffix)
            .map_err(GainDriftArgsError::from)?;

        let mut input_printer = InfoPrinter::new("Inputs".into());
        input_printer.push_line(format!("Observation archives: {}", observations.len()).into());
        let mut telemetry_block = vec![format!(
            "Weather log: {}",
            telemetry.weather_log.display()
        )
        .into()];
        if !telemetry.subsystem_logs.is_empty() {
            telemetry_block.push(
                format!(
                    "Subsystem temperature logs: {}",
                    telemetry.subsystem_logs.len()
                )
                .into(),
            );
        }
        telemetry_block.push(format!("Indoor temperature from: {}", telemetry.indoor_source).into());
        input_printer.push_block(telemetry_block);
        input_printer.display();

        let mut settings_printer = InfoPrinter::new("Settings".into());
        settings_printer.push_block(vec![
            format!("LST window: {lst_window_seconds} s").into(),
            format!("Minimum run overlap: {min_overlap} observations").into(),
            format!("Band: {low_mhz} to {high_mhz} MHz").into(),
            format!("Longitude: {longitude_deg}°, DUT1: {dut1_seconds} s").into(),
        ]);
        settings_printer.push_line(
            format!(
                "Writing to {} (e.g. {})",
                output_dir.display(),
                outputs[0].display()
            )
            .into(),
        );
        settings_printer.display();

        display_warnings();

        Ok(GainDriftParams {
            observations,
            telemetry,
            band: SubBand {
                low_hz: low_mhz * 1e6,
                high_hz: high_mhz * 1e6,
            },
            site: Site {
                longitude_rad: longitude_deg.to_radians(),
                dut1: Duration::from_seconds(dut1_seconds),
            },
            settings: DriftSettings {
                lst_window_rad: lst_seconds_to_radians(lst_window_seconds),
                min_overlap,
            },
            outputs,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), DriftcalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(super) enum GainDriftArgsError {
    #[error("No observation archives were supplied")]
    NoData,

    #[error("The LST window must be a positive number of seconds, but got {0}")]
    BadLstWindow(f64),

    #[error("The minimum run overlap must be at least 1")]
    ZeroMinOverlap,

    #[error("The band needs exactly two values (low and high edges), but got {0}")]
    BandNeedsTwoValues(usize),

    #[error("The band edges must be non-negative and increasing, but got {low} and {high} MHz")]
    BadBand { low: f64, high: f64 },

    #[error("The longitude must be between -360 and 360 degrees, but got {0}")]
    BadLongitude(f64),

    #[error("DUT1 must be finite, but got {0}")]
    BadDut1(f64),

    #[error("The output suffix cannot be empty")]
    EmptySuffix,

    #[error(transparent)]
    InputFile(#[from] InputFileError),

    #[error(transparent)]
    Output(#[from] CorrectionWriteError),
}

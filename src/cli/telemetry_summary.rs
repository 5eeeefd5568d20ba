// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Summarise temperature telemetry without estimating gain drift.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, TelemetryArgs, ARG_FILE_HELP};
use crate::{params::TelemetrySummaryParams, DriftcalError};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct TelemetrySummaryArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "telemetry")]
    #[serde(default)]
    pub(super) telemetry_args: TelemetryArgs,
}

impl TelemetrySummaryArgs {
    pub(super) fn merge(self) -> Result<TelemetrySummaryArgs, DriftcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;
        if let Some(arg_file) = cli_args.args_file {
            let TelemetrySummaryArgs {
                args_file: _,
                telemetry_args,
            } = unpack_arg_file!(arg_file);

            Ok(TelemetrySummaryArgs {
                args_file: None,
                telemetry_args: cli_args.telemetry_args.merge(telemetry_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<TelemetrySummaryParams, DriftcalError> {
        let telemetry = self.telemetry_args.parse()?;
        display_warnings();
        Ok(TelemetrySummaryParams { telemetry })
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

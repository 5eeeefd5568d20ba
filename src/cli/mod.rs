// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code. More specific options for `driftcal`
//! subcommands are contained in modules.
//!
//! All booleans must have `#[serde(default)]` annotated, and anything that
//! isn't a boolean must be optional. This allows all arguments to be optional
//! *and* usable in an arguments file.
//!
//! Only `Driftcal`, `Driftcal::run` and `DriftcalError` are public here.

#[macro_use]
mod common;
mod error;
mod gain_drift;
mod telemetry_summary;

pub(crate) use common::{InfoPrinter, Warn};
pub use error::DriftcalError;

use std::path::PathBuf;

use clap::{AppSettings, Args, Parser, Subcommand};
use log::{debug, info};

use crate::PROGRESS_BARS;

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = r#"Gain-drift correction for drift-scan spectra from the Long Wavelength Array (LWA).
Relative gain corrections are derived from electronics and ambient temperatures
and from the overlap in sidereal time between consecutive observing runs."#
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_subcommands = true)]
#[clap(propagate_version = true)]
#[clap(infer_long_args = true)]
pub struct Driftcal {
    #[clap(flatten)]
    global_opts: GlobalArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Hide the progress bar shown while archives are read.
    #[clap(long, global = true)]
    no_progress_bars: bool,

    /// More output with each use (-v for debug messages, -vv for trace
    /// messages, -vvv to also show where messages come from).
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Check the arguments and inputs, report what would be done, and stop
    /// before reading any archives.
    #[clap(long, global = true)]
    dry_run: bool,

    /// Write the merged arguments to this TOML file. It can be given back as
    /// an arguments file to repeat the run.
    #[clap(long, global = true)]
    save_toml: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
#[clap(arg_required_else_help = true)]
enum Command {
    #[clap(alias = "connected-gain")]
    #[clap(
        about = "Estimate each observation's gain correction from temperatures and run overlaps, and write one correction file per observation."
    )]
    GainDrift(gain_drift::GainDriftArgs),

    #[clap(about = "Read temperature telemetry and summarise what would be used.")]
    TelemetrySummary(telemetry_summary::TelemetrySummaryArgs),
}

impl Driftcal {
    pub fn run(self) -> Result<(), DriftcalError> {
        let GlobalArgs {
            verbosity,
            dry_run,
            no_progress_bars,
            save_toml,
        } = self.global_opts;
        setup_logging(verbosity).expect("Failed to initialise logging.");
        PROGRESS_BARS.store(!no_progress_bars);

        let sub_command = match &self.command {
            Command::GainDrift(_) => "gain-drift",
            Command::TelemetrySummary(_) => "telemetry-summary",
        };
        info!("driftcal {} {}", sub_command, env!("CARGO_PKG_VERSION"));
        display_build_info();

        // Arguments files are merged in before anything is saved, so a saved
        // file holds everything that was used.
        macro_rules! merge_save_run {
            ($args:expr) => {{
                let args = $args.merge()?;
                if let Some(toml_file) = save_toml {
                    use std::io::Write;

                    let toml_str = toml::to_string(&args).map_err(|e| {
                        DriftcalError::ArgFile(format!("Couldn't serialise arguments to toml: {e}"))
                    })?;
                    let mut f = std::io::BufWriter::new(std::fs::File::create(&toml_file)?);
                    f.write_all(toml_str.as_bytes())?;
                    f.flush()?;
                    debug!("Saved arguments to {}", toml_file.display());
                }
                args.run(dry_run)?;
            }};
        }

        match self.command {
            Command::GainDrift(args) => merge_save_run!(args),
            Command::TelemetrySummary(args) => merge_save_run!(args),
        }

        info!("driftcal {} complete.", sub_command);
        Ok(())
    }
}

/// Send log messages to `stdout` through `env_logger`. Colours are only used
/// on a tty. From `-vvv` onwards, each message also shows where in the source
/// it came from.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder
        .target(env_logger::Target::Stdout)
        .format_target(false)
        .filter_level(level);
    if verbosity >= 3 {
        builder.format(|buf, record| {
            use std::io::Write;

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp(),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    }
    builder.try_init()
}

/// Report how this executable was built.
fn display_build_info() {
    let commit = match (GIT_COMMIT_HASH_SHORT, GIT_DIRTY) {
        (Some(hash), Some(true)) => format!("{hash} (dirty)"),
        (Some(hash), _) => hash.to_string(),
        (None, _) => "<no git info>".to_string(),
    };
    let mut printer = InfoPrinter::new("Build".into());
    let mut git_block = vec![format!("git commit: {commit}").into()];
    if let Some(head_ref) = GIT_HEAD_REF {
        git_block.push(format!("git head ref: {head_ref}").into());
    }
    printer.push_block(git_block);
    printer.push_line(format!("built {BUILT_TIME_UTC} with {RUSTC_VERSION}").into());
    printer.display();
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;
use vec1::Vec1;

use super::TelemetryParams;
use crate::{
    cli::InfoPrinter,
    drift::{estimate_gain_drift, DriftError, DriftSettings, DriftSolution},
    io::write::{write_gain_corrections, CorrectionWriteError},
    math::min_max,
    observation::{read_observation, ObservationError, ObservationRecord, Site, SubBand},
    telemetry::TelemetryError,
    PROGRESS_BARS,
};

pub(crate) struct GainDriftParams {
    /// The observation archives, in input order.
    pub(crate) observations: Vec1<PathBuf>,
    pub(crate) telemetry: TelemetryParams,
    pub(crate) band: SubBand,
    pub(crate) site: Site,
    pub(crate) settings: DriftSettings,
    /// Where each observation's correction is written; one per observation.
    pub(crate) outputs: Vec<PathBuf>,
}

impl GainDriftParams {
    pub(crate) fn run(&self) -> Result<DriftSolution, GainDriftError> {
        let Self {
            observations,
            telemetry,
            band,
            site,
            settings,
            outputs,
        } = self;

        info!("Loading telemetry");
        let telemetry = telemetry.load()?;

        let progress_bar = ProgressBar::with_draw_target(
            Some(observations.len() as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:18}: [{wide_bar:.blue}] {pos:2}/{len:2} archives ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Reading archives");

        // Collecting into a `Vec` keeps the input order.
        let summaries = observations
            .par_iter()
            .progress_with(progress_bar.clone())
            .map(|file| read_observation(file, *band, site))
            .collect::<Result<Vec<_>, _>>()?;
        progress_bar.abandon_with_message("Finished reading archives");

        let records: Vec<ObservationRecord> = summaries
            .par_iter()
            .map(|summary| {
                let (temp_in, temp_out) = telemetry.temperatures_at(summary.timestamp);
                ObservationRecord::new(summary, temp_in, temp_out)
            })
            .collect();
        debug!("Matched {} observations to telemetry", records.len());

        info!("Estimating gain drift");
        let solution = estimate_gain_drift(&records, settings)?;
        report(&solution, records.len());

        info!("Writing {} gain corrections", outputs.len());
        write_gain_corrections(&solution.corrections, outputs)?;
        Ok(solution)
    }
}

fn report(solution: &DriftSolution, num_files: usize) {
    let mut printer = InfoPrinter::new("Gain drift".into());
    printer.push_block(vec![
        format!("Files processed: {num_files}").into(),
        format!(
            "Observations without enough LST neighbours: {}",
            solution.num_insufficient_neighbours
        )
        .into(),
        format!(
            "Observations without a temperature correction: {}",
            solution.num_unfit
        )
        .into(),
    ]);

    let plane = solution.plane;
    printer.push_block(vec![
        format!(
            "ratio = {:.6} Δt_in + {:.6} Δt_out + {:.6}",
            plane.a, plane.b, plane.c
        )
        .into(),
        format!("Fit residual: {:.6e}", solution.fit_residual).into(),
        format!(
            "Ratio scatter before/after correcting: {:.6e} / {:.6e}",
            solution.residual_before, solution.residual_after
        )
        .into(),
    ]);
    let mut check_block = vec![];
    if let Some((min, max)) = min_max(solution.temperature_corrections.iter().copied()) {
        check_block.push(format!("Temperature corrections from {min:.6} to {max:.6}").into());
    }
    match solution.corrected_plane {
        Some(p) => check_block.push(
            format!(
                "Slopes after correcting: {:.3e} Δt_in, {:.3e} Δt_out",
                p.a, p.b
            )
            .into(),
        ),
        None => check_block.push("Couldn't refit the corrected power ratios".into()),
    }
    printer.push_block(check_block);

    let run_scales = &solution.run_scales;
    let mut run_block = vec![format!(
        "Runs: {} (MJD {} to {})",
        solution.run_mjds.len(),
        solution.run_mjds.first().copied().unwrap_or_default(),
        solution.run_mjds.last().copied().unwrap_or_default(),
    )
    .into()];
    if !run_scales.transitions.is_empty() {
        run_block.push(
            format!(
                "Run transitions skipped for overlap: {}/{}",
                run_scales.num_skipped(),
                run_scales.transitions.len()
            )
            .into(),
        );
    }
    if let Some(closure) = run_scales.closure {
        run_block.push(format!("Closure scale (not applied): {:.6}", closure.scale()).into());
    }
    if run_scales.num_wrap_shifts > 0 {
        run_block.push(format!("LST wrap shifts: {}", run_scales.num_wrap_shifts).into());
    }
    printer.push_block(run_block);
    printer.display();
}

#[derive(Error, Debug)]
pub(crate) enum GainDriftError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    #[error(transparent)]
    Write(#[from] CorrectionWriteError),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Estimating gain drift from a set of observations.
//!
//! The correction of each observation has two parts. The first comes from a
//! plane fitted to power ratios against temperature changes (see [`fit`]),
//! and the second is the scale of the observation's run relative to the first
//! run, found through the sidereal overlap of consecutive runs (see
//! [`overlap`]).

mod error;
pub(crate) mod fit;
pub(crate) mod lst;
pub(crate) mod overlap;

pub use error::DriftError;

use log::{debug, info};

use crate::{constants::TAU, observation::ObservationRecord};
use fit::{temperature_corrections, GainPlane, RatioPool};
use lst::LstIndex;
use overlap::{group_runs, propagate_run_scales, RunScales};

/// The knobs of the drift estimation.
#[derive(Debug, Clone, Copy)]
pub struct DriftSettings {
    /// Observations closer than this in LST [radians] are compared.
    pub lst_window_rad: f64,
    /// The fewest LST-overlapping observations needed to scale one run to
    /// another.
    pub min_overlap: usize,
}

/// The gain correction for a single observation.
#[derive(Debug, Clone, PartialEq)]
pub struct GainCorrection {
    pub file_id: String,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct DriftSolution {
    pub(crate) plane: GainPlane,

    /// The sum of squared residuals of the raw power ratios about the fitted
    /// plane.
    pub(crate) fit_residual: f64,

    /// The sum of squared deviations from 1 of the power ratios of LST
    /// neighbours, before and after applying the corrections.
    pub(crate) residual_before: f64,
    pub(crate) residual_after: f64,

    /// A plane fitted to the corrected power ratios. Its slopes should be
    /// close to zero.
    pub(crate) corrected_plane: Option<GainPlane>,

    /// The temperature-based correction of each observation.
    pub(crate) temperature_corrections: Vec<f64>,

    /// The number of observations whose temperature correction couldn't be
    /// calculated (they use 1).
    pub(crate) num_unfit: usize,

    /// The number of observations with too few LST neighbours to contribute
    /// to the fit.
    pub(crate) num_insufficient_neighbours: usize,

    pub(crate) run_mjds: Vec<i64>,
    pub(crate) run_scales: RunScales,

    /// The final correction of each observation, in input order.
    pub corrections: Vec<GainCorrection>,
}

/// Estimate the gain correction of every observation. The records must
/// already have their temperatures.
pub fn estimate_gain_drift(
    records: &[ObservationRecord],
    settings: &DriftSettings,
) -> Result<DriftSolution, DriftError> {
    if records.is_empty() {
        return Err(DriftError::NoObservations);
    }

    // LSTs from library callers may be outside [0, 2π).
    let mut lst: Vec<f64> = records.iter().map(|r| r.lst.rem_euclid(TAU)).collect();
    let temp_in: Vec<f64> = records.iter().map(|r| r.temp_in).collect();
    let temp_out: Vec<f64> = records.iter().map(|r| r.temp_out).collect();
    let raw_power: Vec<f64> = records.iter().map(|r| r.median_power).collect();
    let mjds: Vec<i64> = records.iter().map(|r| r.mjd).collect();

    let index = LstIndex::new(&lst);
    let pool = RatioPool::collect(
        &index,
        settings.lst_window_rad,
        &temp_in,
        &temp_out,
        &raw_power,
    );
    let plane = pool.fit()?;
    let fit_residual = pool.residual(&plane);
    info!(
        "Gain plane: {:.6} per indoor degree, {:.6} per outdoor degree, offset {:.6}",
        plane.a, plane.b, plane.c
    );

    let (temperature_corrections, num_unfit) =
        temperature_corrections(&plane, &temp_in, &temp_out);
    let mut power: Vec<f64> = raw_power
        .iter()
        .zip(temperature_corrections.iter())
        .map(|(p, c)| p * c)
        .collect();

    let runs = group_runs(&mjds);
    debug!("{} observations in {} runs", records.len(), runs.len());
    let run_scales = propagate_run_scales(&runs, &mut lst, &mut power, settings.min_overlap);

    let mut run_correction = vec![1.0; records.len()];
    for (run, scale) in runs.iter().zip(run_scales.scales.iter()) {
        for &i in &run.indices {
            run_correction[i] = *scale;
        }
    }
    let corrections: Vec<GainCorrection> = records
        .iter()
        .zip(temperature_corrections.iter())
        .zip(run_correction.iter())
        .map(|((record, c1), c2)| {
            let value = c1 * c2;
            GainCorrection {
                file_id: record.file_id.clone(),
                value: if value.is_finite() && value > 0.0 {
                    value
                } else {
                    1.0
                },
            }
        })
        .collect();

    // How well do the corrections flatten the power ratios?
    let unity = GainPlane {
        a: 0.0,
        b: 0.0,
        c: 1.0,
    };
    let corrected_power: Vec<f64> = raw_power
        .iter()
        .zip(corrections.iter())
        .map(|(p, c)| p * c.value)
        .collect();
    let corrected_pool = RatioPool::collect(
        &index,
        settings.lst_window_rad,
        &temp_in,
        &temp_out,
        &corrected_power,
    );
    let residual_before = pool.residual(&unity);
    let residual_after = corrected_pool.residual(&unity);
    let corrected_plane = corrected_pool.fit().ok();
    debug!("Plane fitted to the corrected powers: {corrected_plane:?}");

    Ok(DriftSolution {
        plane,
        fit_residual,
        residual_before,
        residual_after,
        corrected_plane,
        temperature_corrections,
        num_unfit,
        num_insufficient_neighbours: pool.num_insufficient,
        run_mjds: runs.iter().map(|r| r.mjd).collect(),
        run_scales,
        corrections,
    })
}

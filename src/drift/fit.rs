// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The planar fit of power ratios against indoor and outdoor temperature
//! changes.
//!
//! Observations at (nearly) the same LST see the same sky, so the ratio of
//! their powers should only depend on how the receiver's gain differs between
//! them. We model that ratio as a plane in the temperature differences:
//!
//! `ratio ≈ a Δt_in + b Δt_out + c`
//!
//! Pairs from all observations are pooled into a single least-squares
//! problem.

use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

use super::{lst::LstIndex, DriftError};
use crate::constants::MIN_FIT_NEIGHBOURS;

/// Normal matrices whose smallest singular value is below this fraction of
/// the largest are treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// The fitted gain-temperature plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GainPlane {
    /// Power ratio per unit indoor temperature difference
    pub(crate) a: f64,
    /// Power ratio per unit outdoor temperature difference
    pub(crate) b: f64,
    pub(crate) c: f64,
}

impl GainPlane {
    pub(crate) fn evaluate(&self, delta_in: f64, delta_out: f64) -> f64 {
        self.a * delta_in + self.b * delta_out + self.c
    }
}

/// Temperature differences and power ratios from all pairs of observations
/// that are close in LST.
#[derive(Debug, Default, Clone)]
pub(crate) struct RatioPool {
    pub(crate) delta_in: Vec<f64>,
    pub(crate) delta_out: Vec<f64>,
    pub(crate) ratio: Vec<f64>,
    /// The number of observations that contributed pairs.
    pub(crate) num_contributors: usize,
    /// The number of observations that had too few LST neighbours to
    /// contribute.
    pub(crate) num_insufficient: usize,
}

impl RatioPool {
    /// Collect the power ratios of every observation against its LST
    /// neighbours. Observations are processed in parallel, but the pool is
    /// always in observation order.
    pub(crate) fn collect(
        index: &LstIndex,
        window: f64,
        temp_in: &[f64],
        temp_out: &[f64],
        power: &[f64],
    ) -> RatioPool {
        let per_record: Vec<Option<Vec<(f64, f64, f64)>>> = (0..index.len())
            .into_par_iter()
            .map(|i| {
                let neighbours = index.neighbours(i, window);
                if neighbours.len() < MIN_FIT_NEIGHBOURS {
                    trace!(
                        "Observation {i} has only {} LST neighbours; not using it in the fit",
                        neighbours.len()
                    );
                    return None;
                }
                Some(
                    neighbours
                        .into_iter()
                        .map(|j| {
                            (
                                temp_in[j] - temp_in[i],
                                temp_out[j] - temp_out[i],
                                power[j] / power[i],
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        let mut pool = RatioPool::default();
        for pairs in per_record {
            match pairs {
                Some(pairs) => {
                    pool.num_contributors += 1;
                    for (delta_in, delta_out, ratio) in pairs {
                        pool.delta_in.push(delta_in);
                        pool.delta_out.push(delta_out);
                        pool.ratio.push(ratio);
                    }
                }
                None => pool.num_insufficient += 1,
            }
        }
        debug!(
            "{} ratio pairs from {} observations ({} with too few LST neighbours)",
            pool.len(),
            pool.num_contributors,
            pool.num_insufficient
        );
        pool
    }

    pub(crate) fn len(&self) -> usize {
        self.ratio.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ratio.is_empty()
    }

    /// The sum of squared residuals of the ratios about a plane.
    pub(crate) fn residual(&self, plane: &GainPlane) -> f64 {
        self.delta_in
            .iter()
            .zip(self.delta_out.iter())
            .zip(self.ratio.iter())
            .map(|((&d_in, &d_out), &r)| (r - plane.evaluate(d_in, d_out)).powi(2))
            .sum()
    }

    /// Fit a plane to the pool with ordinary least squares. If the problem is
    /// degenerate (e.g. no pairs, or the temperatures never change), there is
    /// no unique solution and an error is returned.
    pub(crate) fn fit(&self) -> Result<GainPlane, DriftError> {
        if self.is_empty() {
            return Err(DriftError::SingularFit {
                num_pairs: 0,
                reason: "no observations have enough LST neighbours",
            });
        }

        let n = self.len();
        let singular = DriftError::SingularFit {
            num_pairs: n,
            reason: "the temperature differences don't constrain the plane",
        };

        let mut normal = Matrix3::<f64>::zeros();
        let mut rhs = Vector3::<f64>::zeros();
        for ((&d_in, &d_out), &r) in self
            .delta_in
            .iter()
            .zip(self.delta_out.iter())
            .zip(self.ratio.iter())
        {
            let row = Vector3::new(d_in, d_out, 1.0);
            normal += row * row.transpose();
            rhs += row * r;
        }

        let singular_values = normal.singular_values();
        let largest = singular_values.max();
        if !largest.is_finite() || singular_values.min() <= largest * SINGULAR_TOLERANCE {
            return Err(singular);
        }
        let solution = match normal.lu().solve(&rhs) {
            Some(x) if x.iter().all(|v| v.is_finite()) => x,
            _ => return Err(singular),
        };

        let plane = GainPlane {
            a: solution.x,
            b: solution.y,
            c: solution.z,
        };
        debug!("Fitted gain plane: {plane:?}");
        Ok(plane)
    }
}

/// The temperature-based correction for each observation: the inverse of the
/// fitted plane, evaluated at the observation's temperatures relative to the
/// first observation's. A plane value that isn't positive and finite can't be
/// inverted into a gain, so those observations get a correction of 1; the
/// number of them is also returned.
pub(crate) fn temperature_corrections(
    plane: &GainPlane,
    temp_in: &[f64],
    temp_out: &[f64],
) -> (Vec<f64>, usize) {
    let (origin_in, origin_out) = match (temp_in.first(), temp_out.first()) {
        (Some(&t_in), Some(&t_out)) => (t_in, t_out),
        _ => return (vec![], 0),
    };

    let mut num_unfit = 0;
    let corrections = temp_in
        .iter()
        .zip(temp_out.iter())
        .map(|(&t_in, &t_out)| {
            let divisor = plane.evaluate(t_in - origin_in, t_out - origin_out);
            let correction = divisor.recip();
            if divisor > 0.0 && correction.is_finite() {
                correction
            } else {
                num_unfit += 1;
                1.0
            }
        })
        .collect();
    (corrections, num_unfit)
}

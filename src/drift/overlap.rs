// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tying observing runs together through their sidereal overlap.
//!
//! Runs are visited in ascending MJD order. Each run is compared with the one
//! after it: where their LSTs overlap, they saw the same sky, so the ratio of
//! their median powers is the relative gain between them. The ratio rescales
//! the later run before it is itself compared with its successor, so the
//! scales chain. This is inherently sequential.

use std::collections::BTreeMap;

use log::{debug, info};

use super::lst::{run_is_wrapped, PhaseShifter};
use crate::math::{median, min_max};

/// The observations sharing one MJD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunGroup {
    pub(crate) mjd: i64,
    /// Indices into the record arrays, ascending.
    pub(crate) indices: Vec<usize>,
}

/// Group record indices by MJD. The groups are ordered by MJD.
pub(crate) fn group_runs(mjds: &[i64]) -> Vec<RunGroup> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &mjd) in mjds.iter().enumerate() {
        groups.entry(mjd).or_default().push(i);
    }
    groups
        .into_iter()
        .map(|(mjd, indices)| RunGroup { mjd, indices })
        .collect()
}

/// The outcome of comparing a run with its successor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Transition {
    Scaled {
        from_mjd: i64,
        to_mjd: i64,
        num_overlap: usize,
        scale: f64,
    },

    /// Not enough overlap (or no usable power) to compare the runs. The later
    /// run stays at the level of the earlier one.
    Skipped {
        from_mjd: i64,
        to_mjd: i64,
        num_overlap: usize,
    },
}

impl Transition {
    /// The measured ratio between the two runs, or 1 if they weren't compared.
    pub(crate) fn scale(&self) -> f64 {
        match self {
            Transition::Scaled { scale, .. } => *scale,
            Transition::Skipped { .. } => 1.0,
        }
    }

    pub(crate) fn is_skipped(&self) -> bool {
        matches!(self, Transition::Skipped { .. })
    }
}

/// The result of propagating scales through all runs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunScales {
    /// The scale of each run, in the same order as the runs. Each run was
    /// compared with its already-rescaled predecessor, so this brings the run
    /// onto the level of the first run, which always has a scale of 1. A run
    /// whose comparison was skipped takes its predecessor's scale.
    pub(crate) scales: Vec<f64>,
    /// Each run's comparison with the next, not including the closure.
    pub(crate) transitions: Vec<Transition>,
    /// The comparison of the last run with the first. This isn't applied,
    /// but a value far from 1 indicates that the chain has drifted.
    pub(crate) closure: Option<Transition>,
    /// The number of half-day LST shifts made for wrapped runs.
    pub(crate) num_wrap_shifts: usize,
}

impl RunScales {
    pub(crate) fn num_skipped(&self) -> usize {
        self.transitions.iter().filter(|t| t.is_skipped()).count()
    }
}

/// Compare run `m` with run `o`. Run `o`'s records overlapping the LST span
/// of `m` are found; if there are at least `min_overlap` of them, the scale
/// that brings `o` onto `m` is the ratio of `m`'s median power to `o`'s, both
/// over the LST span of the overlap.
pub(crate) fn compare_runs(
    m: &RunGroup,
    o: &RunGroup,
    lst: &[f64],
    power: &[f64],
    min_overlap: usize,
) -> Transition {
    let skipped = |num_overlap| Transition::Skipped {
        from_mjd: m.mjd,
        to_mjd: o.mjd,
        num_overlap,
    };

    let (m_min, m_max) = match min_max(m.indices.iter().map(|&i| lst[i])) {
        Some(span) => span,
        None => return skipped(0),
    };
    let overlap: Vec<usize> = o
        .indices
        .iter()
        .copied()
        .filter(|&i| lst[i] >= m_min && lst[i] <= m_max)
        .collect();
    let num_overlap = overlap.len();
    if num_overlap < min_overlap.max(1) {
        info!(
            "Runs {} and {} share only {num_overlap} observations in LST (need {min_overlap}); not scaling run {}",
            m.mjd, o.mjd, o.mjd
        );
        return skipped(num_overlap);
    }

    let (o_min, o_max) = match min_max(overlap.iter().map(|&i| lst[i])) {
        Some(span) => span,
        None => return skipped(num_overlap),
    };
    let o_median = median(overlap.iter().map(|&i| power[i]));
    let m_median = median(
        m.indices
            .iter()
            .copied()
            .filter(|&i| lst[i] >= o_min && lst[i] <= o_max)
            .map(|i| power[i]),
    );
    match (m_median, o_median) {
        (Some(m_median), Some(o_median)) => {
            let scale = m_median / o_median;
            if scale.is_finite() && scale > 0.0 {
                debug!(
                    "Runs {} -> {}: {num_overlap} overlapping observations, scale {scale}",
                    m.mjd, o.mjd
                );
                Transition::Scaled {
                    from_mjd: m.mjd,
                    to_mjd: o.mjd,
                    num_overlap,
                    scale,
                }
            } else {
                info!(
                    "Runs {} -> {}: unusable scale {scale}; not scaling run {}",
                    m.mjd, o.mjd, o.mjd
                );
                skipped(num_overlap)
            }
        }
        _ => {
            info!(
                "Run {} has no observations within its overlap with run {}; not scaling run {}",
                m.mjd, o.mjd, o.mjd
            );
            skipped(num_overlap)
        }
    }
}

/// Visit every run in MJD order, comparing it with its successor (the last
/// run's successor is the first run) and rescaling the successor's powers.
///
/// Before a run is compared, it is checked for straddling the 0/2π LST
/// boundary; if it does, all LSTs are rotated by half a day. At the end, the
/// LSTs are returned to their original phase. `lst` and `power` are indexed by
/// record, and `power` is left rescaled.
pub(crate) fn propagate_run_scales(
    runs: &[RunGroup],
    lst: &mut [f64],
    power: &mut [f64],
    min_overlap: usize,
) -> RunScales {
    let num_runs = runs.len();
    let mut scales = vec![1.0; num_runs];
    let mut transitions = Vec::with_capacity(num_runs.saturating_sub(1));
    let mut closure = None;
    let mut shifter = PhaseShifter::default();

    if num_runs > 1 {
        for (i_m, m) in runs.iter().enumerate() {
            if run_is_wrapped(lst, &m.indices) {
                debug!("Run {} straddles LST 0; shifting all LSTs by 12h", m.mjd);
                shifter.shift(lst);
            }

            let i_o = (i_m + 1) % num_runs;
            let o = &runs[i_o];
            let transition = compare_runs(m, o, lst, power, min_overlap);
            if i_o == 0 {
                if let Transition::Scaled { scale, .. } = transition {
                    info!(
                        "Closing the chain (run {} -> run {}) would scale by {scale}; not applied",
                        m.mjd, o.mjd
                    );
                }
                closure = Some(transition);
            } else {
                // A skipped run keeps its predecessor's level in the chain.
                let scale = match transition {
                    Transition::Scaled { scale, .. } => scale,
                    Transition::Skipped { .. } => scales[i_m],
                };
                for &i in &o.indices {
                    power[i] *= scale;
                }
                scales[i_o] = scale;
                transitions.push(transition);
            }
        }
    }

    let num_wrap_shifts = shifter.restore(lst);
    debug!("{num_wrap_shifts} LST wrap shifts");
    RunScales {
        scales,
        transitions,
        closure,
        num_wrap_shifts,
    }
}

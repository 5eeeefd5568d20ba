// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Circular (modulo 2π) local sidereal time helpers.

use crate::{
    constants::{PI, TAU},
    math::min_max,
};

/// The angular distance between two LSTs [radians], taking the wrap at 2π into
/// account. The result is always between 0 and π.
pub(crate) fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(TAU);
    d.min(TAU - d)
}

/// Does the run described by `indices` straddle the 0/2π boundary? This is
/// detected as the run's LSTs spanning more than half a day.
pub(crate) fn run_is_wrapped(lst: &[f64], indices: &[usize]) -> bool {
    min_max(indices.iter().map(|&i| lst[i]))
        .map(|(min, max)| max - min > PI)
        .unwrap_or(false)
}

/// Keeps track of the global half-day phase shifts applied to LSTs, so that
/// their net effect can be undone.
#[derive(Debug, Default)]
pub(crate) struct PhaseShifter {
    num_shifts: usize,
}

impl PhaseShifter {
    /// Rotate every LST by π.
    pub(crate) fn shift(&mut self, lst: &mut [f64]) {
        for l in lst.iter_mut() {
            *l = (*l + PI).rem_euclid(TAU);
        }
        self.num_shifts += 1;
    }

    /// Undo the net effect of all shifts: an odd count means the LSTs are off
    /// by π, so one more shift restores them. The total number of shifts that
    /// were made (not counting the restoring one) is returned.
    pub(crate) fn restore(mut self, lst: &mut [f64]) -> usize {
        let num_shifts = self.num_shifts;
        if num_shifts % 2 == 1 {
            self.shift(lst);
        }
        num_shifts
    }
}

/// LSTs sorted for fast window queries.
#[derive(Debug, Clone)]
pub(crate) struct LstIndex {
    /// The original LSTs, by record index.
    lst: Vec<f64>,
    /// (LST, record index), sorted by LST.
    sorted: Vec<(f64, usize)>,
}

impl LstIndex {
    pub(crate) fn new(lst: &[f64]) -> LstIndex {
        let mut sorted: Vec<(f64, usize)> = lst.iter().copied().zip(0..).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        LstIndex {
            lst: lst.to_vec(),
            sorted,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lst.len()
    }

    /// All sorted entries with `low <= LST <= high`.
    fn range(&self, low: f64, high: f64) -> &[(f64, usize)] {
        let start = self.sorted.partition_point(|&(l, _)| l < low);
        let end = self.sorted.partition_point(|&(l, _)| l <= high);
        &self.sorted[start..end.max(start)]
    }

    /// The indices of all other records whose LST is strictly less than
    /// `window` [radians] away from record `i`'s LST, in ascending order.
    pub(crate) fn neighbours(&self, i: usize, window: f64) -> Vec<usize> {
        let centre = self.lst[i];
        let is_neighbour = |&(l, j): &(f64, usize)| j != i && circular_distance(centre, l) < window;

        let mut neighbours: Vec<usize> = if window > PI {
            // Everything is within the window.
            self.sorted
                .iter()
                .filter(|e| is_neighbour(*e))
                .map(|&(_, j)| j)
                .collect()
        } else {
            let low = centre - window;
            let high = centre + window;
            let mut candidates = self.range(low.max(0.0), high.min(TAU)).to_vec();
            if low < 0.0 {
                candidates.extend_from_slice(self.range(low + TAU, TAU));
            }
            if high > TAU {
                candidates.extend_from_slice(self.range(0.0, high - TAU));
            }
            candidates
                .iter()
                .filter(|e| is_neighbour(*e))
                .map(|&(_, j)| j)
                .collect()
        };
        neighbours.sort_unstable();
        neighbours.dedup();
        neighbours
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with estimating gain drift.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("No observations were supplied")]
    NoObservations,

    #[error("Couldn't fit a gain-temperature plane to {num_pairs} power ratios: {reason}")]
    SingularFit {
        num_pairs: usize,
        reason: &'static str,
    },
}

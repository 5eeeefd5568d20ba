// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading observation archives.

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum ObservationError {
    #[error("Couldn't read observation archive {file}: {err}")]
    IO { file: String, err: std::io::Error },

    #[error("Couldn't decode observation archive {file}: {err}")]
    Decode {
        file: String,
        err: serde_json::Error,
    },

    #[error("Observation archive {file} has an unrecognised date '{date}'; expected something like '2019/11/16 12:34:56.7'")]
    BadDate { file: String, date: String },

    #[error("Observation archive {file} has no spectra")]
    NoSpectra { file: String },

    #[error("Observation archive {file}: spectrum {row} has {got} channels, but the frequency axis has {expected}")]
    RaggedSpectra {
        file: String,
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Observation archive {file} has no channels between {low_mhz} and {high_mhz} MHz")]
    EmptyBand {
        file: String,
        low_mhz: f64,
        high_mhz: f64,
    },

    #[error("Observation archive {file} has a median power of {power}; it must be positive and finite")]
    BadPower { file: String, power: f64 },
}

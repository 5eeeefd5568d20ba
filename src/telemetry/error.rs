// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading telemetry logs.

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum TelemetryError {
    #[error("No usable {stream} samples were found in {files}; cannot match observations to temperatures")]
    EmptySeries { stream: &'static str, files: String },

    #[error("No {stream} logs were supplied")]
    NoFiles { stream: &'static str },

    #[error("Couldn't read telemetry log {file}: {err}")]
    IO { file: String, err: std::io::Error },
}

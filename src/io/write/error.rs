// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with writing out gain corrections.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CorrectionWriteError {
    #[error("Cannot write to the specified file '{file}'. Do you have write permissions set?")]
    FileNotWritable { file: String },

    #[error(
        "Couldn't create directory '{0}' for output files. Do you have write permissions set?"
    )]
    NewDirectory(PathBuf),

    #[error("Two observations would both write their gain correction to '{0}'")]
    DuplicateOutput(PathBuf),

    #[error("Couldn't write gain correction to '{file}': {err}")]
    Persist { file: String, err: std::io::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Expanding glob patterns into input files.

use std::path::PathBuf;

use log::trace;
use thiserror::Error;

/// Every path matching a glob pattern, in lexical order.
pub(crate) fn glob_files(pattern: &str) -> Result<Vec<PathBuf>, GlobError> {
    let mut matches = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
    matches.sort_unstable();
    trace!("Glob '{pattern}' matched {} paths", matches.len());
    Ok(matches)
}

/// The one path matching a glob pattern. `what` names the expected file in
/// errors.
pub(crate) fn single_glob_file(pattern: &str, what: &'static str) -> Result<PathBuf, GlobError> {
    let mut matches = glob_files(pattern)?;
    match matches.len() {
        0 => Err(GlobError::NoMatches {
            what,
            glob: pattern.to_string(),
        }),
        1 => Ok(matches.swap_remove(0)),
        n => Err(GlobError::MoreThanOneMatch {
            what,
            glob: pattern.to_string(),
            num_matches: n,
        }),
    }
}

#[derive(Error, Debug)]
pub enum GlobError {
    #[error("No {what} matches '{glob}'")]
    NoMatches { what: &'static str, glob: String },

    #[error("'{glob}' matches {num_matches} paths, but only one {what} may be used")]
    MoreThanOneMatch {
        what: &'static str,
        glob: String,
        num_matches: usize,
    },

    #[error("Couldn't read a glob match: {0}")]
    Unreadable(#[from] glob::GlobError),

    #[error("Invalid glob pattern: {0}")]
    BadPattern(#[from] glob::PatternError),
}

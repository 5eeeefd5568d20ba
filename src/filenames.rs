// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to turn user-supplied file names into paths.
//!
//! Each string may be a file or a glob. Observation archives may additionally
//! be listed one per line in a single ".txt" file.

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;
use vec1::Vec1;

use crate::io::{glob_files, GlobError};

/// The extensions of observation archives (a trailing ".gz" is also allowed).
const OBSERVATION_EXTENSIONS: [&str; 1] = ["json"];

/// Observation archives, in the order they were given.
pub(crate) fn observation_files(inputs: &[String]) -> Result<Vec1<PathBuf>, InputFileError> {
    let mut files = vec![];
    match inputs {
        [list] if list.ends_with(".txt") => {
            let list_path = PathBuf::from(list);
            exists_and_is_readable(&list_path)?;
            let contents = std::fs::read_to_string(&list_path)
                .map_err(|e| InputFileError::IO(list.clone(), e))?;
            let entries: Vec<&str> = contents
                .lines()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect();
            debug!("{} entries in file list {list}", entries.len());
            for entry in entries {
                file_checker(&mut files, entry, FileKind::Observation)?;
            }
        }

        _ => {
            for input in inputs {
                file_checker(&mut files, input, FileKind::Observation)?;
            }
        }
    }

    Vec1::try_from_vec(files).map_err(|_| InputFileError::NoFiles("observation archives"))
}

/// Telemetry logs. These can have any name.
pub(crate) fn telemetry_files(
    inputs: &[String],
    what: &'static str,
) -> Result<Vec1<PathBuf>, InputFileError> {
    let mut files = vec![];
    for input in inputs {
        file_checker(&mut files, input, FileKind::Telemetry)?;
    }
    Vec1::try_from_vec(files).map_err(|_| InputFileError::NoFiles(what))
}

#[derive(Debug, Clone, Copy)]
enum FileKind {
    Observation,
    Telemetry,
}

fn is_observation_archive(file: &str) -> bool {
    let file = file.strip_suffix(".gz").unwrap_or(file);
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| OBSERVATION_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn exists_and_is_readable(file: &Path) -> Result<(), InputFileError> {
    if !file.exists() {
        return Err(InputFileError::DoesNotExist(file.display().to_string()));
    }
    match OpenOptions::new()
        .read(true)
        .open(file)
        .map_err(|io_error| io_error.kind())
    {
        Ok(_) => (),
        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(InputFileError::CouldNotRead(file.display().to_string()))
        }
        Err(e) => return Err(InputFileError::IO(file.display().to_string(), e.into())),
    }

    Ok(())
}

// Given a file (as a string), check it exists and is readable, then check that
// it's the kind of file we want and add it to the list. If the file string
// doesn't exist, then check if it's a glob string, and act recursively on the
// glob results.
fn file_checker(files: &mut Vec<PathBuf>, file: &str, kind: FileKind) -> Result<(), InputFileError> {
    let file_pb = PathBuf::from(file);
    // Is this a file, and is it readable?
    match exists_and_is_readable(&file_pb) {
        Ok(_) => (),

        // If this string isn't a file, maybe it's a glob.
        Err(InputFileError::DoesNotExist(f)) => {
            let glob_results = glob_files(file)?;
            // If there were no glob matches, then just return the original
            // error (the file does not exist).
            if glob_results.is_empty() {
                return Err(InputFileError::DoesNotExist(f));
            }

            for pb in glob_results {
                file_checker(files, pb.display().to_string().as_str(), kind)?;
            }
            return Ok(());
        }

        // Propagate all other errors.
        Err(e) => return Err(e),
    };

    if file_pb.is_dir() {
        return Err(InputFileError::NotRecognised(file.to_string()));
    }
    if let FileKind::Observation = kind {
        if !is_observation_archive(file) {
            return Err(InputFileError::NotRecognised(file.to_string()));
        }
    }
    files.push(file_pb);
    Ok(())
}

#[derive(Debug, Error)]
pub(crate) enum InputFileError {
    #[error("Specified file does not exist: {0}")]
    DoesNotExist(String),

    #[error("Could not read specified file: {0}")]
    CouldNotRead(String),

    #[error("The specified file '{0}' was not a recognised file type. Observation archives must be .json or .json.gz")]
    NotRecognised(String),

    #[error("No {0} were specified")]
    NoFiles(&'static str),

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error("IO error when attempting to read file '{0}': {1}")]
    IO(String, std::io::Error),
}

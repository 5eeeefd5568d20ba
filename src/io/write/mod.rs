// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to handle writing out gain corrections.
//!
//! Each observation gets its own file containing a single number. All of the
//! files are written only once everything has been calculated, and each is
//! written to a temporary file first and then renamed, so a reader never sees
//! a partially-written file.

mod error;

pub(crate) use error::CorrectionWriteError;

use std::{
    collections::HashSet,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use tempfile::NamedTempFile;

use crate::{cli::Warn, drift::GainCorrection};

/// The file that an observation's gain correction is written to.
pub(crate) fn correction_path(output_dir: &Path, file_id: &str, suffix: &str) -> PathBuf {
    output_dir.join(format!("{file_id}{suffix}"))
}

/// Work out where each observation's gain correction goes and check that we
/// can write there. The output directory is created if necessary, and a
/// warning is emitted for every existing file that will be overwritten.
///
/// With this approach, we potentially avoid doing a whole drift estimation
/// only to be unable to write the results at the end. This code _doesn't_
/// alter any existing files.
pub(crate) fn prepare_outputs<'a, I>(
    output_dir: &Path,
    file_ids: I,
    suffix: &str,
) -> Result<Vec<PathBuf>, CorrectionWriteError>
where
    I: IntoIterator<Item = &'a str>,
{
    can_write_to_dir(output_dir)?;

    let mut seen = HashSet::new();
    let mut outputs = vec![];
    for file_id in file_ids {
        let output = correction_path(output_dir, file_id, suffix);
        if !seen.insert(output.clone()) {
            return Err(CorrectionWriteError::DuplicateOutput(output));
        }
        can_write_to_file(&output)?;
        outputs.push(output);
    }
    Ok(outputs)
}

/// Make sure that `dir` exists and isn't read only.
fn can_write_to_dir(dir: &Path) -> Result<(), CorrectionWriteError> {
    trace!("Testing whether we can write to {}", dir.display());

    if !dir.exists() {
        match std::fs::DirBuilder::new()
            .recursive(true)
            .create(dir)
            .map_err(|e| e.kind())
        {
            Ok(()) => (),
            Err(std::io::ErrorKind::PermissionDenied) => {
                return Err(CorrectionWriteError::NewDirectory(dir.to_path_buf()))
            }
            Err(e) => return Err(CorrectionWriteError::IO(e.into())),
        }
    }

    let permissions = std::fs::metadata(dir)?.permissions();
    if permissions.readonly() {
        return Err(CorrectionWriteError::FileNotWritable {
            file: dir.display().to_string(),
        });
    }
    Ok(())
}

/// Check that `file` can be written. If it already exists, a warning is
/// emitted, but it isn't modified.
fn can_write_to_file(file: &Path) -> Result<(), CorrectionWriteError> {
    let file_exists = file.exists();
    if !file_exists {
        return Ok(());
    }
    if file.is_dir() {
        return Err(CorrectionWriteError::FileNotWritable {
            file: file.display().to_string(),
        });
    }

    match std::fs::OpenOptions::new()
        .append(true)
        .open(file)
        .map_err(|e| e.kind())
    {
        Ok(_) => {
            format!("Will overwrite the existing file '{}'", file.display()).warn();
            Ok(())
        }

        Err(std::io::ErrorKind::PermissionDenied) => Err(CorrectionWriteError::FileNotWritable {
            file: file.display().to_string(),
        }),

        Err(e) => Err(CorrectionWriteError::IO(e.into())),
    }
}

/// Write each correction to its corresponding output file.
pub(crate) fn write_gain_corrections(
    corrections: &[GainCorrection],
    outputs: &[PathBuf],
) -> Result<(), CorrectionWriteError> {
    assert_eq!(corrections.len(), outputs.len());

    for (correction, output) in corrections.iter().zip(outputs.iter()) {
        // The debug representation of a float always has a decimal point and
        // round trips.
        write_atomically(output, &format!("{:?}", correction.value))?;
        trace!("Wrote {} to {}", correction.value, output.display());
    }
    debug!("Wrote {} gain corrections", corrections.len());
    Ok(())
}

fn write_atomically(file: &Path, contents: &str) -> Result<(), CorrectionWriteError> {
    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(file)
        .map_err(|e| CorrectionWriteError::Persist {
            file: file.display().to_string(),
            err: e.error,
        })?;
    Ok(())
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Observation archives, and the records derived from them.
//!
//! An archive is a JSON document (optionally gzipped) with a UTC date string,
//! a frequency axis [Hz] and a 2D power spectrum ([integration][channel]):
//!
//! ```json
//! {"date": "2019/11/16 12:34:56.7", "freq": [...], "spectra": [[...], ...]}
//! ```
//!
//! Only the median power over a sub-band and the sidereal time of the
//! observation are used.

mod error;
#[cfg(test)]
mod tests;

pub(crate) use error::ObservationError;

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use flate2::read::GzDecoder;
use hifitime::{Duration, Epoch};
use log::trace;
use marlu::precession::get_lmst;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::TAU;

/// Date formats accepted in archives. All are UTC.
const DATE_FORMATS: [&str; 3] = [
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// The contents of an observation archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ObservationArchive {
    pub(crate) date: String,
    pub(crate) freq: Vec<f64>,
    pub(crate) spectra: Vec<Vec<f64>>,
}

/// A frequency band. Channels strictly between the edges are used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SubBand {
    pub(crate) low_hz: f64,
    pub(crate) high_hz: f64,
}

impl SubBand {
    /// The indices of the channels inside this band.
    pub(crate) fn channels(&self, freqs: &[f64]) -> Vec<usize> {
        freqs
            .iter()
            .enumerate()
            .filter(|(_, f)| **f > self.low_hz && **f < self.high_hz)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Where and how sidereal times are calculated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site {
    pub(crate) longitude_rad: f64,
    pub(crate) dut1: Duration,
}

/// The quantities derived from a single observation archive.
#[derive(Debug, Clone)]
pub(crate) struct ObservationSummary {
    pub(crate) file: PathBuf,
    pub(crate) timestamp: f64,
    pub(crate) mjd: i64,
    pub(crate) lst: f64,
    pub(crate) median_power: f64,
}

/// Everything the drift estimation needs to know about one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Identifies the observation; usually the archive's file stem.
    pub file_id: String,
    /// The integer modified Julian date of the observation (UTC); observations
    /// sharing an MJD belong to the same run.
    pub mjd: i64,
    /// Unix timestamp [seconds, UTC]
    pub timestamp: f64,
    /// Local sidereal time [radians, 0 to 2π]
    pub lst: f64,
    /// Subsystem (electronics) temperature
    pub temp_in: f64,
    /// Ambient temperature
    pub temp_out: f64,
    pub median_power: f64,
}

impl ObservationRecord {
    pub(crate) fn new(summary: &ObservationSummary, temp_in: f64, temp_out: f64) -> Self {
        ObservationRecord {
            file_id: file_id(&summary.file),
            mjd: summary.mjd,
            timestamp: summary.timestamp,
            lst: summary.lst,
            temp_in,
            temp_out,
            median_power: summary.median_power,
        }
    }
}

/// The name used to identify an observation file: its file name without the
/// last extension (and without ".gz").
pub(crate) fn file_id(file: &Path) -> String {
    let file = if file.extension().and_then(|e| e.to_str()) == Some("gz") {
        file.with_extension("")
    } else {
        file.to_path_buf()
    };
    file.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

/// Parse a UTC date string.
pub(crate) fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
        .map(|naive| naive.and_utc())
}

/// Get the local mean sidereal time [radians] at a unix time.
pub(crate) fn unix_to_lst(unix_seconds: f64, site: &Site) -> f64 {
    let epoch = Epoch::from_unix_seconds(unix_seconds);
    get_lmst(site.longitude_rad, epoch, site.dut1).rem_euclid(TAU)
}

/// Get the integer (UTC) modified Julian date of a unix time.
pub(crate) fn unix_to_mjd(unix_seconds: f64) -> i64 {
    Epoch::from_unix_seconds(unix_seconds)
        .to_mjd_utc_days()
        .floor() as i64
}

impl ObservationArchive {
    pub(crate) fn read(file: &Path) -> Result<ObservationArchive, ObservationError> {
        let fh = File::open(file).map_err(|err| ObservationError::IO {
            file: file.display().to_string(),
            err,
        })?;
        let reader: Box<dyn Read> = match file.extension().and_then(|e| e.to_str()) {
            Some("gz") => Box::new(GzDecoder::new(fh)),
            _ => Box::new(fh),
        };
        serde_json::from_reader(BufReader::new(reader)).map_err(|err| ObservationError::Decode {
            file: file.display().to_string(),
            err,
        })
    }

    /// The median power over all integrations and the channels inside `band`.
    pub(crate) fn median_power(&self, file: &Path, band: SubBand) -> Result<f64, ObservationError> {
        let num_chans = self.freq.len();
        if self.spectra.is_empty() {
            return Err(ObservationError::NoSpectra {
                file: file.display().to_string(),
            });
        }
        let mut flat = Vec::with_capacity(self.spectra.len() * num_chans);
        for (row, spectrum) in self.spectra.iter().enumerate() {
            if spectrum.len() != num_chans {
                return Err(ObservationError::RaggedSpectra {
                    file: file.display().to_string(),
                    row,
                    expected: num_chans,
                    got: spectrum.len(),
                });
            }
            flat.extend_from_slice(spectrum);
        }
        // The shape was checked above.
        let spectra = Array2::from_shape_vec((self.spectra.len(), num_chans), flat)
            .expect("spectra are rectangular");

        let channels = band.channels(&self.freq);
        if channels.is_empty() {
            return Err(ObservationError::EmptyBand {
                file: file.display().to_string(),
                low_mhz: band.low_hz / 1e6,
                high_mhz: band.high_hz / 1e6,
            });
        }
        let in_band = spectra.select(Axis(1), &channels);

        let power = crate::math::median(in_band.iter().copied()).unwrap_or(f64::NAN);
        if !power.is_finite() || power <= 0.0 {
            return Err(ObservationError::BadPower {
                file: file.display().to_string(),
                power,
            });
        }
        Ok(power)
    }
}

/// Read an observation archive and derive its time, run and power.
pub(crate) fn read_observation(
    file: &Path,
    band: SubBand,
    site: &Site,
) -> Result<ObservationSummary, ObservationError> {
    let archive = ObservationArchive::read(file)?;

    let date = parse_date(&archive.date).ok_or_else(|| ObservationError::BadDate {
        file: file.display().to_string(),
        date: archive.date.clone(),
    })?;
    let timestamp = date.timestamp() as f64 + f64::from(date.timestamp_subsec_nanos()) / 1e9;
    let median_power = archive.median_power(file, band)?;

    let summary = ObservationSummary {
        file: file.to_path_buf(),
        timestamp,
        mjd: unix_to_mjd(timestamp),
        lst: unix_to_lst(timestamp, site),
        median_power,
    };
    trace!("{summary:?}");
    Ok(summary)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Temperature telemetry logs.
//!
//! Two streams are understood:
//!
//! * a weather-station log (usually a `wview` database dump), where each row
//!   has a unix timestamp in field 0, the indoor temperature in field 6 and the
//!   outdoor temperature in field 7;
//! * subsystem (analog receiver) temperature logs, where each row is
//!   `timestamp, t1, t2, t3, t4` and the temperature is the mean of the four
//!   sensors.
//!
//! Lines that can't be understood (including lines that aren't UTF-8) are
//! skipped. Files ending in ".gz" are
//! decompressed on the fly.

mod error;

pub(crate) use error::TelemetryError;

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

/// The number of sensor readings on each subsystem-temperature line.
const NUM_SUBSYSTEM_SENSORS: usize = 4;

lazy_static::lazy_static! {
    pub(crate) static ref INDOOR_SOURCES_COMMA_SEPARATED: String = IndoorSource::iter().join(", ");
}

/// Where the "indoor" temperature comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize)]
pub(crate) enum IndoorSource {
    /// The subsystem (electronics) temperature logs.
    #[default]
    #[strum(serialize = "subsystem")]
    #[serde(rename = "subsystem")]
    Subsystem,

    /// The weather station's indoor sensor.
    #[strum(serialize = "weather")]
    #[serde(rename = "weather")]
    Weather,
}

/// A single telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TelemetrySample {
    /// Unix timestamp [seconds, UTC]
    pub(crate) timestamp: f64,
    pub(crate) value: f64,
}

/// A time series of telemetry, sorted by timestamp. There is always at least
/// one sample.
#[derive(Debug, Clone)]
pub(crate) struct TelemetrySeries {
    samples: Vec1<TelemetrySample>,
}

impl TelemetrySeries {
    /// Create a new series from unsorted samples. The sort is stable, so
    /// samples with the same timestamp keep their relative order. `None` is
    /// returned if there are no samples.
    pub(crate) fn new(mut samples: Vec<TelemetrySample>) -> Option<TelemetrySeries> {
        samples.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Vec1::try_from_vec(samples)
            .ok()
            .map(|samples| TelemetrySeries { samples })
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn first(&self) -> &TelemetrySample {
        self.samples.first()
    }

    pub(crate) fn last(&self) -> &TelemetrySample {
        self.samples.last()
    }

    /// The (minimum, maximum) value of the series.
    pub(crate) fn value_range(&self) -> (f64, f64) {
        crate::math::min_max(self.samples.iter().map(|s| s.value))
            .unwrap_or((self.first().value, self.first().value))
    }

    /// Get the value of the sample closest in time to `timestamp`. If two
    /// samples are equally close, the earlier one is used. This is a binary
    /// search, so O(log n).
    pub(crate) fn nearest(&self, timestamp: f64) -> f64 {
        let samples = self.samples.as_slice();
        // The index of the first sample at or after the timestamp.
        let after = samples.partition_point(|s| s.timestamp < timestamp);
        let i = if after == 0 {
            0
        } else if after == samples.len() {
            samples.len() - 1
        } else {
            let before = after - 1;
            let d_before = (timestamp - samples[before].timestamp).abs();
            let d_after = (samples[after].timestamp - timestamp).abs();
            if d_after < d_before {
                after
            } else {
                before
            }
        };
        samples[i].value
    }
}

/// Counts of lines read from telemetry logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineCounts {
    pub(crate) kept: usize,
    pub(crate) skipped: usize,
}

/// The streams in a weather log.
#[derive(Debug, Clone)]
pub(crate) struct WeatherTelemetry {
    pub(crate) indoor: TelemetrySeries,
    pub(crate) outdoor: TelemetrySeries,
    pub(crate) counts: LineCounts,
}

/// Open a file for line-by-line reading, decompressing it if its name ends in
/// ".gz".
fn open_log(file: &Path) -> Result<Box<dyn BufRead>, TelemetryError> {
    let fh = File::open(file).map_err(|err| TelemetryError::IO {
        file: file.display().to_string(),
        err,
    })?;
    let reader: Box<dyn Read> = match file.extension().and_then(|e| e.to_str()) {
        Some("gz") => Box::new(GzDecoder::new(fh)),
        _ => Box::new(fh),
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Call `on_line` with each line of a log. A line that isn't valid UTF-8 is
/// given as `None`; only a failure to read the file is an error.
fn read_log_lines(
    file: &Path,
    mut on_line: impl FnMut(Option<&str>),
) -> Result<(), TelemetryError> {
    for bytes in open_log(file)?.split(b'\n') {
        let bytes = bytes.map_err(|err| TelemetryError::IO {
            file: file.display().to_string(),
            err,
        })?;
        on_line(std::str::from_utf8(&bytes).ok());
    }
    Ok(())
}

/// Parse a field as a finite float.
fn parse_field(field: &str) -> Option<f64> {
    field
        .trim()
        .trim_end_matches(|c| c == ')' || c == ';')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a weather-log line into (timestamp, indoor temperature, outdoor
/// temperature).
pub(crate) fn parse_weather_line(line: &str) -> Option<(f64, f64, f64)> {
    let line = line.trim();
    let row = if line.starts_with("INSERT INTO") {
        line.split_once('(')?.1
    } else {
        line
    };

    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < 8 {
        return None;
    }
    let timestamp = parse_field(fields[0])?;
    let indoor = parse_field(fields[6])?;
    let outdoor = parse_field(fields[7])?;
    Some((timestamp, indoor, outdoor))
}

/// Parse a subsystem-temperature line into (timestamp, mean temperature).
pub(crate) fn parse_subsystem_line(line: &str) -> Option<(f64, f64)> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != NUM_SUBSYSTEM_SENSORS + 1 {
        return None;
    }
    let timestamp = parse_field(fields[0])?;
    let mut sum = 0.0;
    for field in &fields[1..] {
        sum += parse_field(field)?;
    }
    Some((timestamp, sum / NUM_SUBSYSTEM_SENSORS as f64))
}

/// Read a weather log.
pub(crate) fn read_weather_log(file: &Path) -> Result<WeatherTelemetry, TelemetryError> {
    debug!("Reading weather log {}", file.display());
    let mut indoor = vec![];
    let mut outdoor = vec![];
    let mut counts = LineCounts::default();

    read_log_lines(file, |line| match line.and_then(parse_weather_line) {
        Some((timestamp, t_in, t_out)) => {
            indoor.push(TelemetrySample {
                timestamp,
                value: t_in,
            });
            outdoor.push(TelemetrySample {
                timestamp,
                value: t_out,
            });
            counts.kept += 1;
        }
        None => {
            trace!("Skipping weather line {line:?}");
            counts.skipped += 1;
        }
    })?;
    debug!(
        "Weather log {}: {} lines used, {} skipped",
        file.display(),
        counts.kept,
        counts.skipped
    );

    let empty = || TelemetryError::EmptySeries {
        stream: "weather",
        files: file.display().to_string(),
    };
    Ok(WeatherTelemetry {
        indoor: TelemetrySeries::new(indoor).ok_or_else(empty)?,
        outdoor: TelemetrySeries::new(outdoor).ok_or_else(empty)?,
        counts,
    })
}

/// Read and combine subsystem-temperature logs. The files are read in sorted
/// order and all samples are then sorted by time.
pub(crate) fn read_subsystem_logs(
    files: &[PathBuf],
) -> Result<(TelemetrySeries, LineCounts), TelemetryError> {
    if files.is_empty() {
        return Err(TelemetryError::NoFiles {
            stream: "subsystem temperature",
        });
    }

    let mut samples = vec![];
    let mut counts = LineCounts::default();
    for file in files.iter().sorted() {
        debug!("Reading subsystem temperature log {}", file.display());
        read_log_lines(file, |line| match line.and_then(parse_subsystem_line) {
            Some((timestamp, value)) => {
                samples.push(TelemetrySample { timestamp, value });
                counts.kept += 1;
            }
            None => {
                trace!("Skipping subsystem temperature line {line:?}");
                counts.skipped += 1;
            }
        })?;
    }
    debug!(
        "Subsystem temperature logs: {} lines used, {} skipped",
        counts.kept, counts.skipped
    );

    let series = TelemetrySeries::new(samples).ok_or_else(|| TelemetryError::EmptySeries {
        stream: "subsystem temperature",
        files: files.iter().map(|f| f.display()).join(", "),
    })?;
    Ok((series, counts))
}

/// Both temperature streams used to characterise observations.
#[derive(Debug, Clone)]
pub(crate) struct Telemetry {
    pub(crate) indoor: TelemetrySeries,
    pub(crate) outdoor: TelemetrySeries,
    pub(crate) indoor_source: IndoorSource,
    pub(crate) weather_counts: LineCounts,
    /// Only populated when the subsystem logs were read.
    pub(crate) subsystem_counts: Option<LineCounts>,
}

impl Telemetry {
    /// The indoor and outdoor temperatures nearest to a time.
    pub(crate) fn temperatures_at(&self, timestamp: f64) -> (f64, f64) {
        (
            self.indoor.nearest(timestamp),
            self.outdoor.nearest(timestamp),
        )
    }
}

/// Load the weather log and, if they provide the indoor temperature, the
/// subsystem logs.
pub(crate) fn load_telemetry(
    weather_log: &Path,
    subsystem_logs: &[PathBuf],
    indoor_source: IndoorSource,
) -> Result<Telemetry, TelemetryError> {
    let weather = read_weather_log(weather_log)?;
    let (indoor, subsystem_counts) = match indoor_source {
        IndoorSource::Subsystem => {
            let (series, counts) = read_subsystem_logs(subsystem_logs)?;
            (series, Some(counts))
        }
        IndoorSource::Weather => (weather.indoor, None),
    };
    Ok(Telemetry {
        indoor,
        outdoor: weather.outdoor,
        indoor_source,
        weather_counts: weather.counts,
        subsystem_counts,
    })
}

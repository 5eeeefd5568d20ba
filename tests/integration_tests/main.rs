// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod gain_drift;
mod no_stderr;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use flate2::{write::GzEncoder, Compression};

fn driftcal() -> Command {
    Command::cargo_bin("driftcal").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// 2020-05-31 12:00:00 UTC
const START: i64 = 1590926400;
const NUM_PER_RUN: usize = 30;
const NUM_RUNS: usize = 2;

struct Files {
    data: Vec<String>,
    weather: String,
    subsystem: String,
}

fn temperatures(i: usize) -> (f64, f64) {
    let i = i as f64;
    (20.0 + 5.0 * (0.7 * i).sin(), 10.0 + 8.0 * (0.3 * i).cos())
}

/// Two nights of one-minute observations starting at the same UTC time, so
/// the nights overlap almost entirely in LST. The power depends linearly on
/// both temperatures. Every second archive is gzipped.
fn make_drift_scan(dir: &Path) -> Files {
    let mut data = vec![];
    let mut weather = String::new();
    let mut subsystem = String::new();

    for run in 0..NUM_RUNS {
        for i in 0..NUM_PER_RUN {
            let timestamp = START + run as i64 * 86400 + i as i64 * 60;
            let k = run * NUM_PER_RUN + i;
            let (temp_in, temp_out) = temperatures(k);
            let gain = 1.0 + 0.01 * (temp_in - 20.0) + 0.005 * (temp_out - 10.0);
            let power = 1000.0 * gain;

            let date = chrono::DateTime::from_timestamp(timestamp, 0)
                .unwrap()
                .format("%Y/%m/%d %H:%M:%S")
                .to_string();
            let archive = serde_json::json!({
                "date": date,
                "freq": [30e6, 50e6, 60e6, 80e6],
                "spectra": [
                    [1.0, power, power, 1.0],
                    [1.0, power, power, 1.0],
                ],
            })
            .to_string();

            let name = format!("{:06}_{:06}.json", 59000 + run, i);
            let path = if k % 2 == 0 {
                let path = dir.join(name);
                std::fs::write(&path, archive).unwrap();
                path
            } else {
                let path = dir.join(format!("{name}.gz"));
                let mut gz = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
                gz.write_all(archive.as_bytes()).unwrap();
                gz.finish().unwrap();
                path
            };
            data.push(path.display().to_string());

            weather.push_str(&format!(
                "INSERT INTO weather VALUES ({timestamp}, 0, 0, 0, 0, 0, {:.3}, {temp_out:.3});\n",
                temp_in + 1.0
            ));
            subsystem.push_str(&format!(
                "{timestamp}, {t:.3}, {t:.3}, {t:.3}, {t:.3}\n",
                t = temp_in
            ));
        }
    }

    let weather_path = dir.join("weather.sql");
    std::fs::write(&weather_path, weather).unwrap();
    let subsystem_path = dir.join("temps.txt");
    std::fs::write(&subsystem_path, subsystem).unwrap();

    Files {
        data,
        weather: weather_path.display().to_string(),
        subsystem: subsystem_path.display().to_string(),
    }
}

/// The correction files in `dir`, sorted.
fn read_corrections(dir: &Path) -> Vec<(PathBuf, f64)> {
    let mut corrections: Vec<(PathBuf, f64)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with("_gain_corr.txt"))
        .map(|p| {
            let value = std::fs::read_to_string(&p)
                .unwrap()
                .trim()
                .parse::<f64>()
                .unwrap();
            (p, value)
        })
        .collect();
    corrections.sort_by(|a, b| a.0.cmp(&b.0));
    corrections
}

#[test]
fn test_help() {
    let cmd = driftcal().arg("--help").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("gain-drift"));
    assert!(stdout.contains("telemetry-summary"));
    assert!(stderr.is_empty());
}

#[test]
fn test_no_subcommand_is_an_error() {
    let cmd = driftcal().ok();
    assert!(cmd.is_err());
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{
    driftcal, get_cmd_output, make_drift_scan, read_corrections, Files, NUM_PER_RUN, NUM_RUNS,
};

#[test]
fn test_gain_drift_writes_one_correction_per_archive() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let out = tmp_dir.path().join("corrections");
    let Files {
        data,
        weather,
        subsystem,
    } = make_drift_scan(tmp_dir.path());

    let mut args = vec!["gain-drift".to_string(), "--data".to_string()];
    args.extend(data);
    #[rustfmt::skip]
    args.extend([
        "--weather", &weather,
        "--subsystem-temps", &subsystem,
        "--output-dir", &out.display().to_string(),
        "--no-progress-bars",
    ].iter().map(|s| s.to_string()));

    let cmd = driftcal().args(&args).ok();
    assert!(cmd.is_ok(), "gain-drift failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("driftcal gain-drift"), "{stdout}");
    assert!(stdout.contains("complete."), "{stdout}");

    let corrections = read_corrections(&out);
    assert_eq!(corrections.len(), NUM_RUNS * NUM_PER_RUN);
    assert!(corrections[0]
        .0
        .ends_with("059000_000000_gain_corr.txt"));
    for (file, value) in &corrections {
        assert!(
            value.is_finite() && *value > 0.0,
            "{}: {value}",
            file.display()
        );
    }

    // Running again overwrites the same files with the same values.
    let cmd = driftcal().args(&args).ok();
    assert!(cmd.is_ok(), "gain-drift failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Will overwrite"), "{stdout}");
    assert_eq!(read_corrections(&out), corrections);
}

#[test]
fn test_gain_drift_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let out = tmp_dir.path().join("corrections");
    let Files { data, weather, .. } = make_drift_scan(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = driftcal()
        .args([
            "gain-drift",
            "--data", &data[0], &data[1],
            "--weather", &weather,
            "--indoor-source", "weather",
            "--output-dir", &out.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(read_corrections(&out).is_empty());
}

#[test]
fn test_saved_arguments_reproduce_a_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let out = tmp_dir.path().join("corrections");
    let toml = tmp_dir.path().join("args.toml");
    let Files { data, weather, .. } = make_drift_scan(tmp_dir.path());

    let mut args = vec![
        "connected-gain".to_string(),
        "--dry-run".to_string(),
        "--save-toml".to_string(),
        toml.display().to_string(),
        "--data".to_string(),
    ];
    args.extend(data);
    #[rustfmt::skip]
    args.extend([
        "--weather", &weather,
        "--indoor-source", "weather",
        "--lst-window", "900",
        "--output-dir", &out.display().to_string(),
    ].iter().map(|s| s.to_string()));
    let cmd = driftcal().args(&args).ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    assert!(toml.exists());
    assert!(read_corrections(&out).is_empty());

    let cmd = driftcal()
        .args([
            "gain-drift",
            &toml.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    assert_eq!(read_corrections(&out).len(), NUM_RUNS * NUM_PER_RUN);
}

#[test]
fn test_empty_weather_log_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let out = tmp_dir.path().join("corrections");
    let Files { data, .. } = make_drift_scan(tmp_dir.path());
    let weather = tmp_dir.path().join("empty.txt");
    std::fs::write(&weather, "no temperatures here\n").unwrap();

    #[rustfmt::skip]
    let cmd = driftcal()
        .args([
            "gain-drift",
            "--data", &data[0], &data[1], &data[2],
            "--weather", &weather.display().to_string(),
            "--indoor-source", "weather",
            "--output-dir", &out.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error:"), "{stderr}");
    assert!(read_corrections(&out).is_empty());
}

#[test]
fn test_missing_subsystem_logs_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files { data, weather, .. } = make_drift_scan(tmp_dir.path());

    let cmd = driftcal()
        .args(["gain-drift", "--data", &data[0], "--weather", &weather])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("subsystem"), "{stderr}");
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{driftcal, get_cmd_output, make_drift_scan, Files};

#[test]
fn test_gain_drift_no_stderr() {
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
    ].iter().map(|s| s.to_string()));

    let cmd = driftcal().args(&args).ok();
    assert!(
        cmd.is_ok(),
        "gain-drift failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_telemetry_summary_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let Files {
        weather, subsystem, ..
    } = make_drift_scan(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = driftcal()
        .args([
            "telemetry-summary",
            "--weather", &weather,
            "--subsystem-temps", &subsystem,
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "telemetry-summary failed: {}",
        cmd.err().unwrap()
    );
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("Telemetry"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against command-line interfaces that aren't big enough to go in their
//! own modules.

use tempfile::{NamedTempFile, TempDir};

use super::{TelemetryArgs, TelemetryArgsError};
use crate::telemetry::IndoorSource;

#[test]
fn test_telemetry_args_merge_prefers_self() {
    let cli = TelemetryArgs {
        weather: Some("cli.txt".to_string()),
        ..Default::default()
    };
    let file = TelemetryArgs {
        weather: Some("file.txt".to_string()),
        subsystem_temps: Some(vec!["temps.gz".to_string()]),
        indoor_source: Some("weather".to_string()),
    };
    let merged = cli.merge(file);
    assert_eq!(merged.weather.as_deref(), Some("cli.txt"));
    assert_eq!(merged.subsystem_temps, Some(vec!["temps.gz".to_string()]));
    assert_eq!(merged.indoor_source.as_deref(), Some("weather"));
}

#[test]
fn test_telemetry_args_parse() {
    let weather = NamedTempFile::new().unwrap();
    let subsystem = NamedTempFile::new().unwrap();
    let weather_str = weather.path().display().to_string();
    let subsystem_str = subsystem.path().display().to_string();

    let params = TelemetryArgs {
        weather: Some(weather_str.clone()),
        subsystem_temps: Some(vec![subsystem_str.clone()]),
        indoor_source: None,
    }
    .parse()
    .unwrap();
    assert_eq!(params.indoor_source, IndoorSource::Subsystem);
    assert_eq!(params.weather_log, weather.path());
    assert_eq!(params.subsystem_logs, vec![subsystem.path().to_path_buf()]);

    let params = TelemetryArgs {
        weather: Some(weather_str.clone()),
        subsystem_temps: Some(vec![subsystem_str]),
        indoor_source: Some("Weather".to_string()),
    }
    .parse()
    .unwrap();
    assert_eq!(params.indoor_source, IndoorSource::Weather);
    assert!(params.subsystem_logs.is_empty());

    let result = TelemetryArgs {
        weather: Some(weather_str.clone()),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(TelemetryArgsError::NoSubsystemLogs)));

    let result = TelemetryArgs {
        weather: Some(weather_str),
        subsystem_temps: None,
        indoor_source: Some("attic".to_string()),
    }
    .parse();
    assert!(matches!(result, Err(TelemetryArgsError::BadIndoorSource(_))));

    let result = TelemetryArgs::default().parse();
    assert!(matches!(result, Err(TelemetryArgsError::NoWeatherLog)));
}

#[test]
fn test_weather_log_glob() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("wview_backup.sql"), "").unwrap();

    let params = TelemetryArgs {
        weather: Some(format!("{}/wview*", dir.path().display())),
        indoor_source: Some("weather".to_string()),
        ..Default::default()
    }
    .parse()
    .unwrap();
    assert_eq!(params.weather_log, dir.path().join("wview_backup.sql"));

    // Two matches are ambiguous.
    std::fs::write(dir.path().join("wview_backup2.sql"), "").unwrap();
    let result = TelemetryArgs {
        weather: Some(format!("{}/wview*", dir.path().display())),
        indoor_source: Some("weather".to_string()),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(TelemetryArgsError::Glob(_))));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use tempfile::Builder;

use super::*;
use crate::constants::SECONDS_PER_DAY;

fn lwa1() -> Site {
    Site {
        longitude_rad: crate::constants::LWA1_LONG_DEG.to_radians(),
        dut1: Duration::from_seconds(0.0),
    }
}

fn band() -> SubBand {
    SubBand {
        low_hz: 40e6,
        high_hz: 70e6,
    }
}

fn archive(date: &str) -> ObservationArchive {
    ObservationArchive {
        date: date.to_string(),
        freq: vec![30e6, 45e6, 55e6, 65e6, 80e6],
        spectra: vec![
            vec![1000.0, 1.0, 2.0, 3.0, 1000.0],
            vec![-5.0, 4.0, 5.0, 6.0, -5.0],
        ],
    }
}

#[test]
fn test_parse_date() {
    let a = parse_date("2020/05/31 12:00:00").unwrap();
    let b = parse_date("2020-05-31 12:00:00.000000").unwrap();
    let c = parse_date(" 2020-05-31T12:00:00 ").unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a.timestamp(), 1590926400);

    let d = parse_date("2020/05/31 12:00:00.5").unwrap();
    assert_eq!(d.timestamp_subsec_millis(), 500);

    assert!(parse_date("31/05/2020").is_none());
    assert!(parse_date("").is_none());
}

#[test]
fn test_unix_to_mjd() {
    // 2020-05-31 is MJD 59000.
    assert_eq!(unix_to_mjd(1590926400.0), 59000);
    assert_eq!(unix_to_mjd(1590883200.0 + 1.0), 59000);
    assert_eq!(unix_to_mjd(1590883200.0 - 1.0), 58999);
}

#[test]
fn test_lst_is_in_range_and_advances_sidereally() {
    let site = lwa1();
    let t = 1590926400.0;
    let lst1 = unix_to_lst(t, &site);
    let lst2 = unix_to_lst(t + 3600.0, &site);
    assert!((0.0..TAU).contains(&lst1));
    assert!((0.0..TAU).contains(&lst2));

    // One solar hour is slightly more than one sidereal hour.
    let expected = 3600.0 * 1.002_737_909 / SECONDS_PER_DAY * TAU;
    let diff = (lst2 - lst1).rem_euclid(TAU);
    assert_abs_diff_eq!(diff, expected, epsilon = 1e-6);
}

#[test]
fn test_file_id() {
    assert_eq!(file_id(Path::new("/data/059000_000123.json")), "059000_000123");
    assert_eq!(file_id(Path::new("059000_000123.json.gz")), "059000_000123");
    assert_eq!(file_id(Path::new("obs")), "obs");
}

#[test]
fn test_sub_band_channels() {
    let freqs = [39e6, 40e6, 41e6, 69e6, 70e6, 71e6];
    assert_eq!(band().channels(&freqs), vec![2, 3]);
}

#[test]
fn test_median_power_uses_only_the_band() {
    let a = archive("2020/05/31 12:00:00");
    let power = a.median_power(Path::new("a.json"), band()).unwrap();
    // In-band values are 1..=6.
    assert_abs_diff_eq!(power, 3.5);
}

#[test]
fn test_median_power_errors() {
    let file = Path::new("a.json");

    let mut a = archive("2020/05/31 12:00:00");
    a.spectra[1].pop();
    assert!(matches!(
        a.median_power(file, band()),
        Err(ObservationError::RaggedSpectra {
            row: 1,
            expected: 5,
            got: 4,
            ..
        })
    ));

    let a = archive("2020/05/31 12:00:00");
    let narrow = SubBand {
        low_hz: 46e6,
        high_hz: 54e6,
    };
    assert!(matches!(
        a.median_power(file, narrow),
        Err(ObservationError::EmptyBand { .. })
    ));

    let mut a = archive("2020/05/31 12:00:00");
    a.spectra.clear();
    assert!(matches!(
        a.median_power(file, band()),
        Err(ObservationError::NoSpectra { .. })
    ));

    let mut a = archive("2020/05/31 12:00:00");
    for spectrum in a.spectra.iter_mut() {
        spectrum.iter_mut().for_each(|p| *p = 0.0);
    }
    assert!(matches!(
        a.median_power(file, band()),
        Err(ObservationError::BadPower { .. })
    ));
}

#[test]
fn test_read_observation() {
    let mut file = Builder::new()
        .prefix("059000_0001")
        .suffix(".json")
        .tempfile()
        .expect("Couldn't make tmp file");
    let json = serde_json::to_string(&archive("2020/05/31 12:00:00.25")).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let site = lwa1();
    let summary = read_observation(file.path(), band(), &site).unwrap();
    assert_abs_diff_eq!(summary.timestamp, 1590926400.25);
    assert_eq!(summary.mjd, 59000);
    assert_abs_diff_eq!(summary.lst, unix_to_lst(1590926400.25, &site));
    assert_abs_diff_eq!(summary.median_power, 3.5);

    let record = ObservationRecord::new(&summary, 25.0, 10.0);
    assert!(record.file_id.starts_with("059000_0001"));
    assert_abs_diff_eq!(record.temp_in, 25.0);
    assert_abs_diff_eq!(record.temp_out, 10.0);
}

#[test]
fn test_read_bad_observations() {
    let site = lwa1();

    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(b"{\"date\": 5}").unwrap();
    assert!(matches!(
        read_observation(file.path(), band(), &site),
        Err(ObservationError::Decode { .. })
    ));

    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    let json = serde_json::to_string(&archive("yesterday")).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    assert!(matches!(
        read_observation(file.path(), band(), &site),
        Err(ObservationError::BadDate { .. })
    ));

    assert!(matches!(
        read_observation(Path::new("/does/not/exist.json"), band(), &site),
        Err(ObservationError::IO { .. })
    ));
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use hifitime::Epoch;

use super::TelemetryParams;
use crate::{
    cli::InfoPrinter,
    telemetry::{LineCounts, Telemetry, TelemetryError, TelemetrySeries},
};

pub(crate) struct TelemetrySummaryParams {
    pub(crate) telemetry: TelemetryParams,
}

impl TelemetrySummaryParams {
    pub(crate) fn run(&self) -> Result<Telemetry, TelemetryError> {
        let telemetry = self.telemetry.load()?;

        let mut printer = InfoPrinter::new("Telemetry".into());
        printer.push_block(series_block(
            format!("Indoor ({})", telemetry.indoor_source),
            &telemetry.indoor,
        ));
        printer.push_block(series_block("Outdoor".to_string(), &telemetry.outdoor));
        printer.push_line(counts_line("Weather log", telemetry.weather_counts));
        if let Some(counts) = telemetry.subsystem_counts {
            printer.push_line(counts_line("Subsystem logs", counts));
        }
        printer.display();

        Ok(telemetry)
    }
}

fn series_block(name: String, series: &TelemetrySeries) -> Vec<Cow<'static, str>> {
    let (min, max) = series.value_range();
    vec![
        format!("{name}: {} samples", series.len()).into(),
        format!(
            "from {} to {}",
            Epoch::from_unix_seconds(series.first().timestamp),
            Epoch::from_unix_seconds(series.last().timestamp)
        )
        .into(),
        format!("values between {min:.2} and {max:.2}").into(),
    ]
}

fn counts_line(name: &str, counts: LineCounts) -> Cow<'static, str> {
    format!(
        "{name}: {} lines used, {} skipped",
        counts.kept, counts.skipped
    )
    .into()
}

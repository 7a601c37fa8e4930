//! Report assembly: static meter fields + readings + UTC timestamp, serialized as pretty JSON.
use std::fmt::Write as _;

use serde::Serialize;
use tracing::warn;

use crate::error::DecodeError;
use crate::readings::ReadingMap;

/// Sentinel written to `timestamp` when the clock cannot be rendered.
pub const UNKNOWN_TIMESTAMP: &str = "unknown_timestamp";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Source of the report timestamp (`YYYY-MM-DDTHH:MM:SSZ`, UTC).
pub trait Clock {
    fn now(&self) -> String;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        let mut out = String::new();
        match write!(out, "{}", chrono::Utc::now().format(TIMESTAMP_FORMAT)) {
            Ok(()) => out,
            Err(_) => {
                warn!("timestamp: format failed, using sentinel");
                UNKNOWN_TIMESTAMP.to_string()
            }
        }
    }
}

/// Clock that always returns the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

/// Static report fields. A real decoder would fill these from the telegram header and
/// data records; today they are placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefaults {
    pub kind: String,
    pub media: String,
    pub meter: String,
    pub id: String,
    pub meter_datetime: String,
    pub set_date: String,
    pub total_m3: f64,
    pub current_status: String,
    pub status: String,
    /// Decimal places kept on every reading.
    pub decimals: u32,
}

impl Default for ReportDefaults {
    fn default() -> Self {
        Self {
            kind: "telegram".into(),
            media: "water".into(),
            meter: "generic_meter".into(),
            id: "unknown".into(),
            meter_datetime: "2025-09-26 16:36".into(),
            set_date: "2128-03-31".into(),
            total_m3: 4.48,
            current_status: "OK".into(),
            status: "OK".into(),
            decimals: 2,
        }
    }
}

/// Serialized shape; field order here is output order.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(rename = "_")]
    pub kind: &'a str,
    pub media: &'a str,
    pub meter: &'a str,
    pub id: &'a str,
    #[serde(flatten)]
    pub readings: ReadingMap,
    pub meter_datetime: &'a str,
    pub set_date: &'a str,
    pub total_m3: f64,
    pub current_status: &'a str,
    pub status: &'a str,
    pub timestamp: &'a str,
}

/// Round to `decimals` places so output does not leak binary float noise (0.07000000000000001).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

impl<'a> Report<'a> {
    pub fn new(readings: &ReadingMap, timestamp: &'a str, defaults: &'a ReportDefaults) -> Self {
        let readings = readings.iter().map(|(k, v)| (k.clone(), round_to(*v, defaults.decimals))).collect();
        Report {
            kind: &defaults.kind,
            media: &defaults.media,
            meter: &defaults.meter,
            id: &defaults.id,
            readings,
            meter_datetime: &defaults.meter_datetime,
            set_date: &defaults.set_date,
            total_m3: defaults.total_m3,
            current_status: &defaults.current_status,
            status: &defaults.status,
            timestamp,
        }
    }
}

/// Render the report as pretty-printed JSON terminated by a newline.
pub fn format_report(readings: &ReadingMap, timestamp: &str, defaults: &ReportDefaults) -> Result<String, DecodeError> {
    let report = Report::new(readings, timestamp, defaults);
    let mut out = serde_json::to_string_pretty(&report)?;
    out.push('\n');
    Ok(out)
}

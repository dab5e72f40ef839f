//! Calendar date and time-of-day helpers.
//!
//! Dates are plain calendar dates (no time zone). Spreadsheet serials use the
//! 1900 date system: serial 1 is 1900-01-01 once the phantom 1900-02-29 is
//! accounted for, which is why the epoch below is 1899-12-30.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::error::QueryError;

const SECONDS_PER_DAY: f64 = 86_400.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%B %d, %Y",
];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("serial epoch is a valid date")
}

/// How a time-of-day cutoff treats a value exactly at the cutoff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCutoff {
    /// `time < cutoff`
    #[default]
    Before,
    /// `time <= cutoff`
    AtOrBefore,
}

impl TimeCutoff {
    pub fn symbol(self) -> &'static str {
        match self {
            TimeCutoff::Before => "<",
            TimeCutoff::AtOrBefore => "<=",
        }
    }
}

/// Shift a date by a whole number of days (negative moves backwards).
pub fn add_days(date: NaiveDate, delta: i64) -> Result<NaiveDate, QueryError> {
    let shifted = if delta >= 0 {
        date.checked_add_days(Days::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(delta.unsigned_abs()))
    };
    shifted.ok_or(QueryError::DateOutOfRange)
}

pub fn compare_time(time: NaiveTime, cutoff: NaiveTime, mode: TimeCutoff) -> bool {
    match mode {
        TimeCutoff::Before => time < cutoff,
        TimeCutoff::AtOrBefore => time <= cutoff,
    }
}

/// `TIME(h, m, s)`.
pub fn time_of(hour: u32, minute: u32, second: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// `DATE(y, m, d)`.
pub fn date_of(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn date_serial(date: NaiveDate) -> f64 {
    (date - serial_epoch()).num_days() as f64
}

pub fn time_serial(time: NaiveTime) -> f64 {
    f64::from(time.num_seconds_from_midnight()) / SECONDS_PER_DAY
}

/// Date part of a spreadsheet serial.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    serial_epoch().checked_add_days(Days::new(serial.floor() as u64))
}

/// Time-of-day part of a spreadsheet serial, rounded to the second.
pub fn time_from_serial(serial: f64) -> Option<NaiveTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = (serial.fract() * SECONDS_PER_DAY).round() as u32 % 86_400;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    if !text.contains(':') {
        return None;
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.time())
        })
}

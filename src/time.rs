// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic over [`LocalTime`].
//!
//! Instants are epoch milliseconds. Boundaries (start of day, next month, ...)
//! are always derived on the calendar fields and converted back afterwards,
//! never by adding fixed durations to an instant.

use crate::error::TimeError;
use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
    Timelike, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// Keeps conversions inside chrono's representable range.
const MAX_MILLIS: i64 = 8_000_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalTime {
    pub year: i32,
    pub month: u32, // 1-12
    pub day: u32,   // 1-based
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub milli: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl LocalTime {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        milli: u32,
    ) -> Result<Self, TimeError> {
        let lt = LocalTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            milli,
        };
        if lt.is_valid() {
            Ok(lt)
        } else {
            Err(TimeError::InvalidLocalTime(lt.to_string()))
        }
    }

    /// Midnight on the given date.
    pub fn date(year: i32, month: u32, day: u32) -> Result<Self, TimeError> {
        LocalTime::new(year, month, day, 0, 0, 0, 0)
    }

    pub fn now() -> Self {
        unix_to_local_time(Utc::now().timestamp_millis())
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.milli < 1000
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_milli_opt(
            self.hour,
            self.minute,
            self.second,
            self.milli,
        )
    }

    pub fn from_naive(ndt: &NaiveDateTime) -> Self {
        LocalTime {
            year: ndt.year(),
            month: ndt.month(),
            day: ndt.day(),
            hour: ndt.hour(),
            minute: ndt.minute(),
            second: ndt.second(),
            milli: (ndt.nanosecond() / 1_000_000).min(999),
        }
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`. Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn unix_to_local_time_in<Tz: TimeZone>(tz: &Tz, millis: i64) -> LocalTime {
    let clamped = millis.clamp(-MAX_MILLIS, MAX_MILLIS);
    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(clamped).unwrap_or_default();
    LocalTime::from_naive(&utc.with_timezone(tz).naive_local())
}

/// Decomposes an instant in the timezone of the running process.
pub fn unix_to_local_time(millis: i64) -> LocalTime {
    unix_to_local_time_in(&Local, millis)
}

/// Interprets `lt` in `tz`. A time repeated by a DST fold maps to its earliest
/// instant; a time skipped by a DST gap is pushed forward by one hour.
pub fn local_time_to_unix_in<Tz: TimeZone>(tz: &Tz, lt: &LocalTime) -> Result<i64, TimeError> {
    let naive = lt
        .to_naive()
        .ok_or_else(|| TimeError::InvalidLocalTime(lt.to_string()))?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
        LocalResult::Ambiguous(a, b) => Ok(a.timestamp_millis().min(b.timestamp_millis())),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| TimeError::Unrepresentable(lt.to_string())),
    }
}

pub fn local_time_to_unix(lt: &LocalTime) -> Result<i64, TimeError> {
    local_time_to_unix_in(&Local, lt)
}

pub fn start_of_day(lt: &LocalTime) -> LocalTime {
    LocalTime {
        hour: 0,
        minute: 0,
        second: 0,
        milli: 0,
        ..*lt
    }
}

pub fn start_of_month(lt: &LocalTime) -> LocalTime {
    LocalTime {
        day: 1,
        ..start_of_day(lt)
    }
}

pub fn start_of_year(lt: &LocalTime) -> LocalTime {
    LocalTime {
        month: 1,
        ..start_of_month(lt)
    }
}

/// Start of the period following the one containing `lt`.
pub fn next_period(lt: &LocalTime, granularity: Granularity) -> LocalTime {
    match granularity {
        Granularity::Day => {
            let base = start_of_day(lt);
            if base.day + 1 > days_in_month(base.year, base.month) {
                next_period(&base, Granularity::Month)
            } else {
                LocalTime {
                    day: base.day + 1,
                    ..base
                }
            }
        }
        Granularity::Month => {
            let base = start_of_month(lt);
            if base.month + 1 > 12 {
                next_period(&base, Granularity::Year)
            } else {
                LocalTime {
                    month: base.month + 1,
                    ..base
                }
            }
        }
        Granularity::Year => LocalTime {
            year: lt.year + 1,
            ..start_of_year(lt)
        },
    }
}

/// Row label for a report. Daily views label by day-of-month, other views by
/// month-day; `full_date` always prints everything.
pub fn format_for_display(lt: &LocalTime, granularity: Granularity, full_date: bool) -> String {
    if full_date {
        lt.to_string()
    } else if granularity == Granularity::Day {
        format!("{:02}", lt.day)
    } else {
        format!("{:02}-{:02}", lt.month, lt.day)
    }
}

/// Canonical edit-field format, `YYYY-MM-DDTHH:MM`.
pub fn format_for_input(lt: &LocalTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}",
        lt.year, lt.month, lt.day, lt.hour, lt.minute
    )
}

pub fn parse_input(s: &str) -> Result<LocalTime, TimeError> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(LocalTime::from_naive(&ndt));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| LocalTime::from_naive(&ndt))
        .ok_or_else(|| TimeError::BadInput(s.to_string()))
}

/// Whole calendar days from `start` to `end`, counting both ends.
pub fn days_between_inclusive(start: &LocalTime, end: &LocalTime) -> i64 {
    match (
        NaiveDate::from_ymd_opt(start.year, start.month, start.day),
        NaiveDate::from_ymd_opt(end.year, end.month, end.day),
    ) {
        (Some(a), Some(b)) => (b - a).num_days() + 1,
        _ => 0,
    }
}

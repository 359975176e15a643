//! Formatting of time bar labels.

use chrono::{DateTime, Local, TimeZone};

use super::model::Millis;

/// `HH:MM` label in the local time zone.
pub fn short_time(millis: Millis) -> String {
    short_time_in(millis, &Local)
}

/// Full weekday name in the local time zone.
pub fn weekday_name(millis: Millis) -> String {
    weekday_name_in(millis, &Local)
}

/// `HH:MM` label in `tz`.
pub fn short_time_in<Tz: TimeZone>(millis: Millis, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    to_zoned(millis, tz)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Full weekday name in `tz`.
pub fn weekday_name_in<Tz: TimeZone>(millis: Millis, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    to_zoned(millis, tz)
        .map(|dt| dt.format("%A").to_string())
        .unwrap_or_default()
}

fn to_zoned<Tz: TimeZone>(millis: Millis, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(millis).single()
}

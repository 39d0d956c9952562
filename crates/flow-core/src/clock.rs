use chrono::{DateTime, Local, TimeZone};

pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Current local time as `HH:MM:SS`.
#[must_use]
pub fn time_string() -> String {
    format_time(&Local::now())
}

#[must_use]
pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(CLOCK_FORMAT).to_string()
}

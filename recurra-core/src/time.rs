//! Date and time-of-day helpers shared by rule validation and expansion.

use chrono::{Datelike, Months, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::error::{RecurraError, RecurraResult};

/// Parse a YYYY-MM-DD calendar date, naming `field` on failure.
pub fn parse_date(field: &str, s: &str) -> RecurraResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        RecurraError::validation(field, format!("'{}' is not a date. Expected YYYY-MM-DD", s))
    })
}

/// Parse an HH:MM (or HH:MM:SS) local time of day, naming `field` on failure.
pub fn parse_time(field: &str, s: &str) -> RecurraResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| {
            RecurraError::validation(field, format!("'{}' is not a time. Expected HH:MM", s))
        })
}

/// Format a time of day the way rules write it (HH:MM, seconds only when set).
pub fn format_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

/// Weekday for a 0=Sunday..6=Saturday index.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// 0=Sunday..6=Saturday index of a weekday.
pub fn weekday_index(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Last valid day-of-month for the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or_else(|| date.day())
}

/// `day` clamped to the length of the month containing `date`.
pub fn clamp_day(date: NaiveDate, day: u32) -> u32 {
    day.min(last_day_of_month(date))
}

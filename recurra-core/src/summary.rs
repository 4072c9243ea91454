//! Human-readable rule descriptions, e.g. "Every 2 weeks on Mon, Wed, until 2024-06-30".

use chrono::{Datelike, Month};

use crate::rule::{Frequency, RecurrenceRule};
use crate::time::{format_time, weekday_from_index};

/// Describe a rule in one line.
pub fn describe(rule: &RecurrenceRule) -> String {
    let mut text = match rule.frequency {
        Frequency::None => return "Does not repeat".to_string(),
        Frequency::Daily => every(rule.interval, "Daily", "day"),
        Frequency::Weekly => {
            let base = every(rule.interval, "Weekly", "week");
            if rule.days_of_week.is_empty() {
                format!("{} (no days selected)", base)
            } else {
                format!("{} on {}", base, weekday_list(rule))
            }
        }
        Frequency::Monthly => format!(
            "{} on day {}",
            every(rule.interval, "Monthly", "month"),
            rule.start_date.day()
        ),
        Frequency::Yearly => format!(
            "{} on {} {}",
            every(rule.interval, "Yearly", "year"),
            month_abbrev(rule.start_date.month()),
            rule.start_date.day()
        ),
    };

    if let Some(end) = rule.end_date {
        text.push_str(&format!(", until {}", end.format("%Y-%m-%d")));
    }
    if let Some(count) = rule.occurrence_count {
        text.push_str(&format!(", {} {}", count, pluralize("time", count as usize)));
    }

    text.push_str(&time_window(rule));
    text
}

fn every(interval: u32, single: &str, unit: &str) -> String {
    if interval == 1 {
        single.to_string()
    } else {
        format!("Every {} {}s", interval, unit)
    }
}

fn weekday_list(rule: &RecurrenceRule) -> String {
    rule.days_of_week
        .iter()
        .filter_map(|&i| weekday_from_index(i))
        .map(|day| day.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn month_abbrev(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_else(|| month.to_string())
}

fn time_window(rule: &RecurrenceRule) -> String {
    format!(
        " from {} to {}",
        format_time(rule.start_time),
        format_time(rule.end_time)
    )
}

/// `word`, with an "s" unless `count` is 1.
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

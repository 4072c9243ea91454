//! Recurrence expansion.
//!
//! Walks a validated rule forward from its start date and emits one
//! `ActivityOccurrence` per matching date, skipping exceptions and applying
//! per-date overrides. Output is in ascending date order because the cursor
//! only moves forward.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::constants::DEFAULT_OCCURRENCE_CAP;
use crate::error::RecurraResult;
use crate::occurrence::ActivityOccurrence;
use crate::rule::{Frequency, RecurrenceRule, RuleInput};
use crate::time::{clamp_day, weekday_index};

/// Expand a rule into concrete occurrences.
///
/// - Stops at `occurrence_count` (or 100 when unset) emitted occurrences, or
///   once the cursor passes the inclusive `end_date`, whichever comes first.
/// - Exception dates are skipped and do not count against the cap.
/// - A modified-occurrence override is applied to the occurrence generated for
///   its date. A cancelled date stays in the output with `is_available = false`.
pub fn expand(rule: &RecurrenceRule, series_id: &str, capacity: u32) -> Vec<ActivityOccurrence> {
    if rule.frequency == Frequency::None {
        return Vec::new();
    }

    // A weekly rule with no weekdays never matches; without an end date the
    // cursor would walk until the calendar runs out.
    if rule.frequency == Frequency::Weekly && rule.days_of_week.is_empty() {
        tracing::debug!(series_id, "weekly rule has no weekdays selected");
        return Vec::new();
    }

    let cap = rule
        .occurrence_count
        .map_or(DEFAULT_OCCURRENCE_CAP, |count| count as usize);

    // Validation guarantees at least 1; a hand-built rule with 0 would never advance
    let interval = rule.interval.max(1);

    let mut occurrences = Vec::new();
    let mut cursor = Some(rule.start_date);
    let mut step: u32 = 0;

    while let Some(date) = cursor {
        if occurrences.len() >= cap {
            break;
        }
        if rule.end_date.is_some_and(|end| date > end) {
            break;
        }

        if matches(rule, date) {
            if rule.exceptions.contains(&date) {
                tracing::debug!(series_id, date = %date, "skipping exception date");
            } else {
                occurrences.push(build_occurrence(rule, series_id, capacity, date));
            }
        }

        step += 1;
        cursor = advance(rule, interval, date, step);
    }

    tracing::debug!(
        series_id,
        count = occurrences.len(),
        cap,
        "expanded recurrence rule"
    );

    occurrences
}

/// Validate a rule document and expand it. Nothing is produced if validation fails.
pub fn expand_input(
    input: &RuleInput,
    series_id: &str,
    capacity: u32,
) -> RecurraResult<Vec<ActivityOccurrence>> {
    let rule = input.validate()?;
    Ok(expand(&rule, series_id, capacity))
}

/// Whether `date` is an occurrence date under the rule.
fn matches(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    let start = rule.start_date;
    match rule.frequency {
        Frequency::None => false,
        Frequency::Daily => true,
        Frequency::Weekly => rule.days_of_week.contains(&weekday_index(date.weekday())),
        // Day-of-month comparisons use the start day clamped to the month length,
        // so a rule anchored on the 31st matches the last day of shorter months.
        Frequency::Monthly => date.day() == clamp_day(date, start.day()),
        Frequency::Yearly => {
            date.month() == start.month() && date.day() == clamp_day(date, start.day())
        }
    }
}

/// Next candidate date after `date`, or None once the calendar overflows.
///
/// `step` counts advances taken so far. Monthly and yearly cursors are always
/// computed from the start date so a clamped month does not drag later
/// occurrences onto an earlier day.
fn advance(rule: &RecurrenceRule, interval: u32, date: NaiveDate, step: u32) -> Option<NaiveDate> {
    match rule.frequency {
        Frequency::None => None,
        Frequency::Daily => date.checked_add_days(Days::new(u64::from(interval))),
        Frequency::Weekly => {
            if date.weekday() == Weekday::Sat {
                // Realign on the Sunday that opens the week `interval` weeks ahead
                let days = 7 * u64::from(interval) - 6;
                date.checked_add_days(Days::new(days))
            } else {
                date.succ_opt()
            }
        }
        Frequency::Monthly => {
            let months = step.checked_mul(interval)?;
            rule.start_date.checked_add_months(Months::new(months))
        }
        Frequency::Yearly => {
            let months = step.checked_mul(interval)?.checked_mul(12)?;
            rule.start_date.checked_add_months(Months::new(months))
        }
    }
}

fn build_occurrence(
    rule: &RecurrenceRule,
    series_id: &str,
    capacity: u32,
    date: NaiveDate,
) -> ActivityOccurrence {
    let mut occurrence =
        ActivityOccurrence::new(series_id, date, rule.start_time, rule.end_time, capacity);

    if let Some(modification) = rule.modified_occurrences.get(&date) {
        occurrence.apply_override(modification);
    }

    occurrence
}

//! Concrete occurrences produced by expanding a recurrence rule.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{RecurraError, RecurraResult};
use crate::rule::OccurrenceOverride;

/// One dated, timed instance of a recurring activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOccurrence {
    /// Derived from series id, date and start time. Same inputs, same id.
    pub id: String,
    pub series_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: u32,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Whether a modified-occurrence override touched this instance
    #[serde(default)]
    pub is_modified: bool,
}

impl ActivityOccurrence {
    pub fn new(
        series_id: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        capacity: u32,
    ) -> Self {
        ActivityOccurrence {
            id: occurrence_id(series_id, date, start_time),
            series_id: series_id.to_string(),
            date,
            start_time,
            end_time,
            capacity,
            is_available: true,
            cancellation_reason: None,
            is_modified: false,
        }
    }

    /// Apply a per-date override. The id follows the resolved start time.
    pub fn apply_override(&mut self, modification: &OccurrenceOverride) {
        if let Some(start_time) = modification.start_time {
            self.start_time = start_time;
            self.id = occurrence_id(&self.series_id, self.date, start_time);
        }
        if let Some(end_time) = modification.end_time {
            self.end_time = end_time;
        }
        if modification.is_cancelled {
            self.is_available = false;
            self.cancellation_reason = modification.cancellation_reason.clone();
        }
        self.is_modified = true;
    }

    /// True when the occurrence runs past midnight into the next day.
    pub fn ends_next_day(&self) -> bool {
        self.end_time < self.start_time
    }
}

/// Deterministic occurrence id: `<series>-<YYYYMMDD>-<HHMM>`.
pub fn occurrence_id(series_id: &str, date: NaiveDate, start_time: NaiveTime) -> String {
    format!(
        "{}-{}-{}",
        series_id,
        date.format("%Y%m%d"),
        start_time.format("%H%M")
    )
}

/// Serialize occurrences as a pretty-printed JSON array.
pub fn to_json(occurrences: &[ActivityOccurrence]) -> RecurraResult<String> {
    serde_json::to_string_pretty(occurrences)
        .map_err(|e| RecurraError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn id_is_derived_from_series_date_and_start() {
        assert_eq!(
            occurrence_id("pilates", date(2024, 3, 5), time(9, 30)),
            "pilates-20240305-0930"
        );
        assert_eq!(
            occurrence_id("pilates", date(2024, 3, 5), time(9, 30)),
            occurrence_id("pilates", date(2024, 3, 5), time(9, 30))
        );
        assert_ne!(
            occurrence_id("pilates", date(2024, 3, 5), time(9, 30)),
            occurrence_id("pilates", date(2024, 3, 5), time(10, 30))
        );
    }

    #[test]
    fn cancellation_keeps_times_and_marks_unavailable() {
        let mut occ = ActivityOccurrence::new("s", date(2024, 3, 5), time(9, 0), time(10, 0), 8);
        let id = occ.id.clone();

        occ.apply_override(&OccurrenceOverride::cancelled("Holiday"));

        assert!(!occ.is_available);
        assert!(occ.is_modified);
        assert_eq!(occ.cancellation_reason.as_deref(), Some("Holiday"));
        assert_eq!(occ.start_time, time(9, 0));
        assert_eq!(occ.id, id);
        assert_eq!(occ.capacity, 8);
    }

    #[test]
    fn reschedule_moves_times_and_id() {
        let mut occ = ActivityOccurrence::new("s", date(2024, 3, 5), time(9, 0), time(10, 0), 8);
        occ.apply_override(&OccurrenceOverride::rescheduled(time(14, 0), time(15, 0)));

        assert!(occ.is_available);
        assert_eq!(occ.start_time, time(14, 0));
        assert_eq!(occ.end_time, time(15, 0));
        assert_eq!(occ.id, "s-20240305-1400");
    }

    #[test]
    fn json_uses_camel_case_and_omits_missing_reason() {
        let occ = ActivityOccurrence::new("s", date(2024, 3, 5), time(22, 0), time(1, 0), 4);
        assert!(occ.ends_next_day());

        let json = to_json(&[occ]).unwrap();
        assert!(json.contains("\"isAvailable\": true"));
        assert!(json.contains("\"startTime\": \"22:00:00\""));
        assert!(!json.contains("cancellationReason"));
    }
}

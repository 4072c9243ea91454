//! Recurrence rules.
//!
//! A rule arrives as a `RuleInput`: the string-typed shape the booking dashboard
//! stores (camelCase keys, dates as YYYY-MM-DD, times as HH:MM). Validation turns
//! it into a `RecurrenceRule` with parsed dates and times, which is what the
//! expander works on. Every validation failure names the offending field.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::{BIWEEKLY_INTERVAL, DEFAULT_INTERVAL};
use crate::error::{RecurraError, RecurraResult};
use crate::time::{parse_date, parse_time, weekday_from_index};

/// Recurrence kind as written in rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

/// How a validated rule steps through the calendar.
///
/// `biweekly` has no frequency of its own: it validates to `Weekly` with an
/// interval of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Per-date override as written in rule documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideInput {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
}

/// String-typed recurrence rule, as stored by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInput {
    #[serde(default, alias = "type")]
    pub kind: RecurrenceKind,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub occurrence_count: Option<i64>,
    pub interval: Option<i64>,
    #[serde(default)]
    pub days_of_week: Vec<i64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub modified_occurrences: BTreeMap<String, OverrideInput>,
}

/// A validated per-date override, applied after an occurrence is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceOverride {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_cancelled: bool,
    pub cancellation_reason: Option<String>,
}

impl OccurrenceOverride {
    pub fn cancelled(reason: impl Into<String>) -> Self {
        OccurrenceOverride {
            is_cancelled: true,
            cancellation_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn rescheduled(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        OccurrenceOverride {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        }
    }
}

/// A validated recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    /// Inclusive upper bound.
    pub end_date: Option<NaiveDate>,
    /// Hard cap on emitted occurrences, at least 1 when set.
    pub occurrence_count: Option<u32>,
    /// At least 1.
    pub interval: u32,
    /// Weekday indices, 0=Sunday..6=Saturday. Only consulted for weekly rules.
    pub days_of_week: BTreeSet<u8>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub exceptions: BTreeSet<NaiveDate>,
    pub modified_occurrences: BTreeMap<NaiveDate, OccurrenceOverride>,
}

impl RecurrenceRule {
    /// Rule with default interval, no bound, no weekdays, no exceptions, no overrides.
    pub fn new(
        frequency: Frequency,
        start_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        RecurrenceRule {
            frequency,
            start_date,
            end_date: None,
            occurrence_count: None,
            interval: DEFAULT_INTERVAL,
            days_of_week: BTreeSet::new(),
            start_time,
            end_time,
            exceptions: BTreeSet::new(),
            modified_occurrences: BTreeMap::new(),
        }
    }
}

impl RuleInput {
    /// Validate and normalize into a `RecurrenceRule`.
    ///
    /// A `none` rule never produces occurrences, so its other fields are not
    /// required and malformed values are ignored.
    pub fn validate(&self) -> RecurraResult<RecurrenceRule> {
        if self.kind == RecurrenceKind::None {
            return Ok(self.one_off());
        }

        let start_date = match &self.start_date {
            Some(s) => parse_date("startDate", s)?,
            None => return Err(RecurraError::validation("startDate", "is required")),
        };
        let end_date = self
            .end_date
            .as_deref()
            .map(|s| parse_date("endDate", s))
            .transpose()?;

        let start_time = required_time("startTime", self.start_time.as_deref())?;
        let end_time = required_time("endTime", self.end_time.as_deref())?;

        let occurrence_count = self
            .occurrence_count
            .map(|count| positive("occurrenceCount", count))
            .transpose()?;

        let mut interval = match self.interval {
            Some(interval) => positive("interval", interval)?,
            None => DEFAULT_INTERVAL,
        };

        let frequency = match self.kind {
            RecurrenceKind::None => Frequency::None,
            RecurrenceKind::Daily => Frequency::Daily,
            RecurrenceKind::Weekly => Frequency::Weekly,
            RecurrenceKind::Biweekly => {
                if interval != BIWEEKLY_INTERVAL {
                    tracing::debug!(interval, "biweekly rule: forcing interval to 2");
                }
                interval = BIWEEKLY_INTERVAL;
                Frequency::Weekly
            }
            RecurrenceKind::Monthly => Frequency::Monthly,
            RecurrenceKind::Yearly => Frequency::Yearly,
        };

        let mut days_of_week = BTreeSet::new();
        for (i, &day) in self.days_of_week.iter().enumerate() {
            let index = u8::try_from(day)
                .ok()
                .filter(|d| weekday_from_index(*d).is_some())
                .ok_or_else(|| {
                    RecurraError::validation(
                        format!("daysOfWeek[{}]", i),
                        format!("{} is not a weekday index (0=Sunday..6=Saturday)", day),
                    )
                })?;
            days_of_week.insert(index);
        }

        let mut exceptions = BTreeSet::new();
        for (i, s) in self.exceptions.iter().enumerate() {
            exceptions.insert(parse_date(&format!("exceptions[{}]", i), s)?);
        }

        let mut modified_occurrences = BTreeMap::new();
        for (key, input) in &self.modified_occurrences {
            let field = format!("modifiedOccurrences.{}", key);
            let date = parse_date(&field, key)?;
            let start_time = input
                .start_time
                .as_deref()
                .map(|s| parse_time(&format!("{}.startTime", field), s))
                .transpose()?;
            let end_time = input
                .end_time
                .as_deref()
                .map(|s| parse_time(&format!("{}.endTime", field), s))
                .transpose()?;

            if exceptions.contains(&date) {
                tracing::warn!(
                    date = %date,
                    "date is both an exception and a modified occurrence; the override is ignored"
                );
            }

            modified_occurrences.insert(
                date,
                OccurrenceOverride {
                    start_time,
                    end_time,
                    is_cancelled: input.is_cancelled,
                    cancellation_reason: input.cancellation_reason.clone(),
                },
            );
        }

        Ok(RecurrenceRule {
            frequency,
            start_date,
            end_date,
            occurrence_count,
            interval,
            days_of_week,
            start_time,
            end_time,
            exceptions,
            modified_occurrences,
        })
    }

    /// Placeholder rule for `none`: whatever dates and times parse, defaults otherwise.
    fn one_off(&self) -> RecurrenceRule {
        let start_date = self
            .start_date
            .as_deref()
            .and_then(|s| parse_date("startDate", s).ok())
            .unwrap_or_default();
        let start_time = self
            .start_time
            .as_deref()
            .and_then(|s| parse_time("startTime", s).ok())
            .unwrap_or_default();
        let end_time = self
            .end_time
            .as_deref()
            .and_then(|s| parse_time("endTime", s).ok())
            .unwrap_or(start_time);

        RecurrenceRule::new(Frequency::None, start_date, start_time, end_time)
    }
}

impl TryFrom<RuleInput> for RecurrenceRule {
    type Error = RecurraError;

    fn try_from(input: RuleInput) -> RecurraResult<Self> {
        input.validate()
    }
}

impl TryFrom<&RuleInput> for RecurrenceRule {
    type Error = RecurraError;

    fn try_from(input: &RuleInput) -> RecurraResult<Self> {
        input.validate()
    }
}

/// A count or step that must be at least 1.
fn positive(field: &str, value: i64) -> RecurraResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| {
            RecurraError::validation(field, format!("must be at least 1, got {}", value))
        })
}

fn required_time(field: &str, value: Option<&str>) -> RecurraResult<NaiveTime> {
    match value {
        Some(s) => parse_time(field, s),
        None => Err(RecurraError::validation(field, "is required")),
    }
}

/// A rule file: the rule itself plus the series it belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDocument {
    pub series_id: Option<String>,
    pub title: Option<String>,
    pub capacity: Option<u32>,
    pub location: Option<String>,
    #[serde(flatten)]
    pub rule: RuleInput,
    /// Keys neither the rule nor the series metadata recognize, usually typos
    #[serde(flatten)]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl RuleDocument {
    pub fn from_toml_str(content: &str) -> RecurraResult<Self> {
        let doc: Self =
            toml::from_str(content).map_err(|e| RecurraError::RuleParse(e.to_string()))?;
        doc.warn_unknown_keys();
        Ok(doc)
    }

    pub fn from_json_str(content: &str) -> RecurraResult<Self> {
        let doc: Self =
            serde_json::from_str(content).map_err(|e| RecurraError::RuleParse(e.to_string()))?;
        doc.warn_unknown_keys();
        Ok(doc)
    }

    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown.keys().map(String::as_str)
    }

    fn warn_unknown_keys(&self) {
        for key in self.unknown_keys() {
            tracing::warn!(key, "unrecognized key in rule file is ignored");
        }
    }

    /// Load a rule file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> RecurraResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

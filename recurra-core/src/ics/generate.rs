//! ICS file generation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use icalendar::{Calendar, Component, EventLike, Property};

use crate::error::{RecurraError, RecurraResult};
use crate::occurrence::ActivityOccurrence;

/// Metadata applied to every generated VEVENT.
#[derive(Debug, Clone)]
pub struct IcsOptions {
    pub title: String,
    pub location: Option<String>,
    /// IANA timezone name for TZID. Floating local times when None.
    pub timezone: Option<String>,
    /// DTSTAMP for every event. Current time when None.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for IcsOptions {
    fn default() -> Self {
        IcsOptions {
            title: "Activity".to_string(),
            location: None,
            timezone: None,
            generated_at: None,
        }
    }
}

/// Generate .ics content with one VEVENT per occurrence
pub fn generate_ics(
    occurrences: &[ActivityOccurrence],
    options: &IcsOptions,
) -> RecurraResult<String> {
    let tzid = match &options.timezone {
        Some(name) => {
            let tz: chrono_tz::Tz = name
                .parse()
                .map_err(|_| RecurraError::UnknownTimezone(name.clone()))?;
            Some(tz.name().to_string())
        }
        None => None,
    };

    let dtstamp = options
        .generated_at
        .unwrap_or_else(Utc::now)
        .format("%Y%m%dT%H%M%SZ")
        .to_string();

    let mut cal = Calendar::new();

    for occurrence in occurrences {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&occurrence.id);
        ics_event.summary(&options.title);
        ics_event.add_property("DTSTAMP", &dtstamp);

        // A session ending before it starts runs past midnight
        let end_date = if occurrence.ends_next_day() {
            occurrence.date.succ_opt().ok_or_else(|| {
                RecurraError::IcsGenerate(format!(
                    "occurrence '{}' ends after the last representable date",
                    occurrence.id
                ))
            })?
        } else {
            occurrence.date
        };

        add_local_datetime(
            &mut ics_event,
            "DTSTART",
            occurrence.date,
            occurrence.start_time,
            tzid.as_deref(),
        );
        add_local_datetime(
            &mut ics_event,
            "DTEND",
            end_date,
            occurrence.end_time,
            tzid.as_deref(),
        );

        if let Some(ref loc) = options.location {
            ics_event.location(loc);
        }

        if !occurrence.is_available {
            ics_event.add_property("STATUS", "CANCELLED");
            if let Some(ref reason) = occurrence.cancellation_reason {
                ics_event.description(reason);
            }
        }

        ics_event.add_property("X-RECURRA-SERIES", &occurrence.series_id);
        ics_event.add_property("X-RECURRA-CAPACITY", occurrence.capacity.to_string());

        cal.push(ics_event.done());
    }

    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with RECURRA
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:RECURRA\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Add a local datetime property, TZID-qualified when a timezone is known
fn add_local_datetime(
    ics_event: &mut icalendar::Event,
    name: &str,
    date: NaiveDate,
    time: NaiveTime,
    tzid: Option<&str>,
) {
    let value = date.and_time(time).format("%Y%m%dT%H%M%S").to_string();
    match tzid {
        Some(tzid) => {
            let mut prop = Property::new(name, value);
            prop.add_parameter("TZID", tzid);
            ics_event.append_property(prop);
        }
        None => {
            // Floating datetime (no Z, no TZID)
            ics_event.add_property(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::OccurrenceOverride;
    use chrono::TimeZone;

    fn occurrence(d: u32, start: (u32, u32), end: (u32, u32)) -> ActivityOccurrence {
        ActivityOccurrence::new(
            "swim",
            NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            12,
        )
    }

    fn options() -> IcsOptions {
        IcsOptions {
            title: "Lap swim".to_string(),
            location: Some("Pool B".to_string()),
            timezone: None,
            generated_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn one_vevent_per_occurrence() {
        let ics = generate_ics(
            &[occurrence(4, (9, 0), (10, 0)), occurrence(5, (9, 0), (10, 0))],
            &options(),
        )
        .unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("UID:swim-20240304-0900"));
        assert!(ics.contains("UID:swim-20240305-0900"));
        assert!(ics.contains("DTSTART:20240304T090000"));
        assert!(ics.contains("DTEND:20240304T100000"));
        assert!(ics.contains("SUMMARY:Lap swim"));
        assert!(ics.contains("LOCATION:Pool B"));
        assert!(ics.contains("X-RECURRA-CAPACITY:12"));
        assert!(ics.contains("DTSTAMP:20240101T000000Z"));
        assert!(ics.contains("PRODID:RECURRA"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn cancelled_occurrence_is_marked() {
        let mut occ = occurrence(4, (9, 0), (10, 0));
        occ.apply_override(&OccurrenceOverride::cancelled("Pool closed"));

        let ics = generate_ics(&[occ], &options()).unwrap();
        assert!(ics.contains("STATUS:CANCELLED"));
        assert!(ics.contains("DESCRIPTION:Pool closed"));
    }

    #[test]
    fn overnight_session_ends_next_day() {
        let ics = generate_ics(&[occurrence(4, (22, 0), (1, 30))], &options()).unwrap();
        assert!(ics.contains("DTSTART:20240304T220000"));
        assert!(ics.contains("DTEND:20240305T013000"));
    }

    #[test]
    fn timezone_adds_tzid() {
        let mut opts = options();
        opts.timezone = Some("Europe/Amsterdam".to_string());

        let ics = generate_ics(&[occurrence(4, (9, 0), (10, 0))], &opts).unwrap();
        assert!(ics.contains("DTSTART;TZID=Europe/Amsterdam:20240304T090000"));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut opts = options();
        opts.timezone = Some("Mars/Olympus".to_string());

        let err = generate_ics(&[occurrence(4, (9, 0), (10, 0))], &opts).unwrap_err();
        assert!(matches!(err, RecurraError::UnknownTimezone(_)));
    }
}

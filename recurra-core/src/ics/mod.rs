//! ICS export.
//!
//! Occurrences are written as standalone VEVENTs rather than as a single
//! RRULE master: expansion clamps month ends and walks weeks in ways RFC 5545
//! recurrence does not reproduce.

mod generate;

pub use generate::{IcsOptions, generate_ics};

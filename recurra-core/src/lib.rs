//! Core types for recurra.
//!
//! This crate provides everything needed to turn a recurrence rule into concrete
//! occurrences:
//! - `rule` for rule documents and their validation
//! - `recurrence` for expanding a validated rule into `ActivityOccurrence`s
//! - `summary` for human-readable rule descriptions
//! - `ics` for exporting occurrences as iCalendar

pub mod constants;
pub mod error;
pub mod ics;
pub mod occurrence;
pub mod recurrence;
pub mod rule;
pub mod summary;
pub mod time;

pub use error::{RecurraError, RecurraResult};
pub use occurrence::ActivityOccurrence;
pub use recurrence::{expand, expand_input};
pub use rule::{Frequency, OccurrenceOverride, RecurrenceKind, RecurrenceRule, RuleInput};

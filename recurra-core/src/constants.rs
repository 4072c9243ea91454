/// Hard cap on emitted occurrences when a rule has no `occurrenceCount`.
pub const DEFAULT_OCCURRENCE_CAP: usize = 100;

/// Step used when a rule leaves `interval` unset.
pub const DEFAULT_INTERVAL: u32 = 1;

/// Interval forced onto `biweekly` rules when they are normalized to weekly.
pub const BIWEEKLY_INTERVAL: u32 = 2;

//! The zone time oracle capability.
//!
//! The sample generator never interprets time zone rules itself. Everything
//! it needs to know about a zone is asked through the [`ZoneRules`] trait:
//! the offset in effect at an instant, the next offset transition after an
//! instant, and conversions between instants and the zone's local wall time.
//!
//! Keeping the oracle behind a trait lets the samplers and collector run
//! against a hand-built schedule in tests, decoupled from any real time
//! zone database. The production oracle lives in [`crate::tzif`].

use crate::gregorian::{
    epoch_days_from_ymd, ymd_from_epoch_days, SECONDS_PER_DAY,
};

/// Broken-down local wall-clock date and time, to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalDateTime {
    pub const fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Break local seconds (seconds since the Unix epoch on the local
    /// wall clock) into date and time components.
    pub fn from_local_seconds(local_seconds: i64) -> Self {
        let days = local_seconds.div_euclid(SECONDS_PER_DAY);
        let time = local_seconds.rem_euclid(SECONDS_PER_DAY);
        let (year, month, day) = ymd_from_epoch_days(days);
        Self {
            year,
            month,
            day,
            hour: (time / 3600) as u8,
            minute: (time % 3600 / 60) as u8,
            second: (time % 60) as u8,
        }
    }

    /// The inverse of [`LocalDateTime::from_local_seconds`].
    pub fn as_local_seconds(&self) -> i64 {
        epoch_days_from_ymd(self.year, self.month, self.day) * SECONDS_PER_DAY
            + self.hour as i64 * 3600
            + self.minute as i64 * 60
            + self.second as i64
    }
}

/// The offset in effect at a queried instant.
///
/// `dst_offset_seconds` is the daylight saving portion of the total offset
/// and is zero for standard time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffsetRecord {
    pub utc_offset_seconds: i64,
    pub dst_offset_seconds: i64,
}

/// A UTC offset discontinuity reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTransition {
    /// The instant (Unix epoch seconds) at which the new offset applies.
    pub at_time: i64,
    /// The year of the transition instant rendered with the offset in
    /// effect just before it, i.e. the outgoing wall clock's reading of
    /// the instant itself.
    pub local_year_before: i32,
}

/// Offset and transition queries for one resolved zone.
///
/// All instants are Unix epoch seconds. Implementations own the
/// disambiguation policy of [`ZoneRules::epoch_seconds_for_local`] for
/// wall times that fall into a gap or an overlap.
pub trait ZoneRules {
    /// The total and daylight saving offsets in effect at the instant.
    fn offset_at(&self, epoch_seconds: i64) -> UtcOffsetRecord;

    /// The first offset transition strictly after the instant, if any
    /// remains.
    fn next_transition_after(&self, epoch_seconds: i64) -> Option<OffsetTransition>;

    /// The zone's broken-down local wall time for the instant.
    fn local_datetime_at(&self, epoch_seconds: i64) -> LocalDateTime {
        let offset = self.offset_at(epoch_seconds);
        LocalDateTime::from_local_seconds(epoch_seconds + offset.utc_offset_seconds)
    }

    /// The instant corresponding to a local wall time.
    fn epoch_seconds_for_local(&self, local: LocalDateTime) -> i64;
}

/// Resolves zone identifiers to their rules.
pub trait ZoneOracle {
    type Rules: ZoneRules;

    /// Look up a zone by identifier, `None` when the oracle has no data
    /// for it.
    fn resolve(&self, identifier: &str) -> Option<Self::Rules>;
}

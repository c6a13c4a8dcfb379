//! A zone time oracle backed by bundled TZif data.
//!
//! `TZif` is the time zone information format laid out by [RFC 8536][rfc8536].
//! Zone identifiers resolve against the database bundled in the `jiff-tzdb`
//! crate, and the raw bytes are parsed with the `tzif` crate. Instants at or
//! before the last explicit transition are answered from the transition
//! table by binary search; instants beyond it are resolved with the POSIX
//! TZ string in the file footer.
//!
//! [rfc8536]: https://datatracker.ietf.org/doc/html/rfc8536

use combine::Parser;
use tzif::data::{
    posix::{PosixTzString, TransitionDate, TransitionDay},
    time::Seconds,
    tzif::{DataBlock, LocalTimeTypeRecord},
};

use crate::gregorian::{
    self, epoch_days_from_ymd, weekday_from_epoch_days, ymd_from_epoch_days, SECONDS_PER_DAY,
};
use crate::oracle::{LocalDateTime, OffsetTransition, UtcOffsetRecord, ZoneOracle, ZoneRules};
use crate::FixtureError;

/// Resolves zone identifiers from the bundled TZif database.
#[derive(Debug, Default)]
pub struct TzdbOracle;

impl ZoneOracle for TzdbOracle {
    type Rules = TzifZoneRules;

    fn resolve(&self, identifier: &str) -> Option<TzifZoneRules> {
        let (_, data) = jiff_tzdb::get(identifier)?;
        TzifZoneRules::from_bytes(data).ok()
    }
}

/// One zone's parsed TZif data: the version 2+ transition table and the
/// POSIX TZ string footer.
#[derive(Debug)]
pub struct TzifZoneRules {
    block: DataBlock,
    posix: Option<PosixTzString>,
}

impl TzifZoneRules {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FixtureError> {
        let Ok((parsed, _)) = tzif::parse::tzif::tzif().parse(data) else {
            return Err(FixtureError::IllformedTzif);
        };
        // Version 1 blocks truncate to 32-bit times; require v2+.
        let block = parsed.data_block2.ok_or(FixtureError::IllformedTzif)?;
        Ok(Self {
            block,
            posix: parsed.footer,
        })
    }

    /// The local time type in effect from transition `idx` onward.
    fn local_record(&self, idx: usize) -> LocalTimeTypeRecord {
        // A missing transition type defaults to the first local time type.
        self.block.local_time_type_records
            [self.block.transition_types.get(idx).copied().unwrap_or(0)]
    }

    fn offset_for_index(&self, idx: usize) -> UtcOffsetRecord {
        let record = self.local_record(idx);
        let dst_offset_seconds = if record.is_dst {
            record.utoff.0 - self.standard_offset_before(idx)
        } else {
            0
        };
        UtcOffsetRecord {
            utc_offset_seconds: record.utoff.0,
            dst_offset_seconds,
        }
    }

    /// The most recent standard-time offset at or before transition `idx`,
    /// used to derive the daylight saving portion of a DST record.
    fn standard_offset_before(&self, idx: usize) -> i64 {
        for i in (0..=idx).rev() {
            let record = self.local_record(i);
            if !record.is_dst {
                return record.utoff.0;
            }
        }
        self.block
            .local_time_type_records
            .iter()
            .find(|record| !record.is_dst)
            .map(|record| record.utoff.0)
            .unwrap_or_else(|| self.local_record(idx).utoff.0)
    }

    fn initial_offset(&self) -> UtcOffsetRecord {
        let record = self.block.local_time_type_records[0];
        UtcOffsetRecord {
            utc_offset_seconds: record.utoff.0,
            dst_offset_seconds: 0,
        }
    }

    fn last_offset(&self) -> UtcOffsetRecord {
        match self.block.transition_times.len() {
            0 => self.initial_offset(),
            n => self.offset_for_index(n - 1),
        }
    }

    /// Offset resolution for instants beyond the explicit transition table.
    fn posix_offset(&self, epoch_seconds: i64) -> Option<UtcOffsetRecord> {
        let posix = self.posix.as_ref()?;
        let std_offset = -posix.std_info.offset.0;
        let Some(dst) = &posix.dst_info else {
            return Some(UtcOffsetRecord {
                utc_offset_seconds: std_offset,
                dst_offset_seconds: 0,
            });
        };
        let dst_offset = -dst.variant_info.offset.0;

        let (year, _, _) =
            ymd_from_epoch_days((epoch_seconds + std_offset).div_euclid(SECONDS_PER_DAY));
        let dst_start = transition_instant(&dst.start_date, year, std_offset);
        let dst_end = transition_instant(&dst.end_date, year, dst_offset);

        // dst_end < dst_start is the southern hemisphere layout, where DST
        // spans the year boundary.
        let in_dst = if dst_start <= dst_end {
            dst_start <= epoch_seconds && epoch_seconds < dst_end
        } else {
            epoch_seconds < dst_end || dst_start <= epoch_seconds
        };

        if in_dst {
            Some(UtcOffsetRecord {
                utc_offset_seconds: dst_offset,
                dst_offset_seconds: dst_offset - std_offset,
            })
        } else {
            Some(UtcOffsetRecord {
                utc_offset_seconds: std_offset,
                dst_offset_seconds: 0,
            })
        }
    }

    /// The first transition instant strictly after `epoch_seconds`, from
    /// the explicit table first and the POSIX TZ string once the table is
    /// exhausted.
    fn next_transition_instant(&self, epoch_seconds: i64) -> Option<i64> {
        let times = &self.block.transition_times;
        let idx = match times.binary_search(&Seconds(epoch_seconds)) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };
        if idx < times.len() {
            return Some(times[idx].0);
        }
        self.next_posix_transition(epoch_seconds)
    }

    fn next_posix_transition(&self, epoch_seconds: i64) -> Option<i64> {
        let posix = self.posix.as_ref()?;
        let dst = posix.dst_info.as_ref()?;
        let std_offset = -posix.std_info.offset.0;
        let dst_offset = -dst.variant_info.offset.0;

        let (year, _, _) =
            ymd_from_epoch_days((epoch_seconds + std_offset).div_euclid(SECONDS_PER_DAY));
        for candidate_year in year - 1..=year + 2 {
            let mut candidates = [
                transition_instant(&dst.start_date, candidate_year, std_offset),
                transition_instant(&dst.end_date, candidate_year, dst_offset),
            ];
            candidates.sort_unstable();
            for candidate in candidates {
                if candidate > epoch_seconds {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl ZoneRules for TzifZoneRules {
    fn offset_at(&self, epoch_seconds: i64) -> UtcOffsetRecord {
        let times = &self.block.transition_times;
        match times.binary_search(&Seconds(epoch_seconds)) {
            // At the transition the new local time type already applies.
            Ok(idx) => self.offset_for_index(idx),
            Err(idx) if idx == times.len() => {
                self.posix_offset(epoch_seconds)
                    .unwrap_or_else(|| self.last_offset())
            }
            Err(0) => self.initial_offset(),
            Err(idx) => self.offset_for_index(idx - 1),
        }
    }

    fn next_transition_after(&self, epoch_seconds: i64) -> Option<OffsetTransition> {
        let at_time = self.next_transition_instant(epoch_seconds)?;
        // The transition instant itself rendered with the outgoing offset,
        // not the wall time one second earlier. The two differ when the
        // outgoing wall clock reads exactly Jan 1 00:00:00.
        let offset_before = self.offset_at(at_time - 1).utc_offset_seconds;
        Some(OffsetTransition {
            at_time,
            local_year_before: LocalDateTime::from_local_seconds(at_time + offset_before).year,
        })
    }

    fn epoch_seconds_for_local(&self, local: LocalDateTime) -> i64 {
        let local_seconds = local.as_local_seconds();
        // Candidate offsets from either side of any nearby transition.
        let earlier = self
            .offset_at(local_seconds - SECONDS_PER_DAY)
            .utc_offset_seconds;
        let later = self
            .offset_at(local_seconds + SECONDS_PER_DAY)
            .utc_offset_seconds;
        let earlier_valid = self.offset_at(local_seconds - earlier).utc_offset_seconds == earlier;
        let later_valid = self.offset_at(local_seconds - later).utc_offset_seconds == later;

        match (earlier_valid, later_valid) {
            // Steady state: both interpretations agree.
            (true, _) if earlier == later => local_seconds - earlier,
            // Overlap: the wall time exists twice, take the earlier
            // instant (the larger offset).
            (true, true) => local_seconds - earlier.max(later),
            (true, false) => local_seconds - earlier,
            (false, true) => local_seconds - later,
            // Gap: the wall time does not exist; interpreting it with the
            // pre-transition offset pushes it forward across the gap.
            (false, false) => local_seconds - earlier.min(later),
        }
    }
}

/// The instant of a POSIX rule transition in the given year.
///
/// `offset_before` is the UTC offset in effect as the transition is
/// approached, since the rule's wall time is expressed in that offset.
fn transition_instant(date: &TransitionDate, year: i32, offset_before: i64) -> i64 {
    let epoch_days = match date.day {
        // Julian day 1..=365, Feb 29 never counted.
        TransitionDay::NoLeap(n) => {
            let day_of_year = if n > 59 && gregorian::is_leap_year(year) {
                n as i64 + 1
            } else {
                n as i64
            };
            epoch_days_from_ymd(year, 1, 1) + day_of_year - 1
        }
        // Zero based day of year, leap day included.
        TransitionDay::WithLeap(n) => epoch_days_from_ymd(year, 1, 1) + n as i64,
        TransitionDay::Mwd(month, week, weekday) => mwd_epoch_days(year, month, week, weekday),
    };
    epoch_days * SECONDS_PER_DAY + date.time.0 - offset_before
}

/// Epoch days of the `week`-th `weekday` of `month` (`week` 5 meaning the
/// last occurrence), per the POSIX `M` rule form.
fn mwd_epoch_days(year: i32, month: u16, week: u16, weekday: u16) -> i64 {
    let first = epoch_days_from_ymd(year, month as u8, 1);
    let first_weekday = weekday_from_epoch_days(first);
    let mut day =
        1 + (weekday as i64 - first_weekday as i64).rem_euclid(7) + (week as i64 - 1) * 7;
    if day > gregorian::days_in_month(year, month as u8) as i64 {
        day -= 7;
    }
    first + day - 1
}

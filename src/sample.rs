//! Validation sample data model and the per-zone collector.

use std::collections::BTreeMap;

use crate::oracle::{LocalDateTime, ZoneRules};
use crate::SECONDS_SINCE_UNIX_EPOCH;

/// Provenance of a sample, kept for the diagnostic column of the rendered
/// table. Has no effect on ordering or deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// One second before an offset transition.
    BeforeTransition,
    /// Exactly at an offset transition.
    AtTransition,
    /// The first instant of a month.
    MonthStart,
    /// The last hour of a year, `{year}-12-31T23:00:00` local.
    YearEnd,
}

impl SampleKind {
    /// Single letter tag used in the rendered table.
    pub fn as_char(self) -> char {
        match self {
            Self::BeforeTransition => 'A',
            Self::AtTransition => 'B',
            Self::MonthStart => 'S',
            Self::YearEnd => 'Y',
        }
    }
}

/// One validation data point: an instant with the offsets and local wall
/// time the zone rules produced for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Seconds since the fixture epoch (2000-01-01T00:00:00Z).
    pub epoch_seconds: i64,
    /// Total UTC offset at the instant, in minutes.
    pub utc_offset_minutes: i32,
    /// Daylight saving portion of the offset, in minutes.
    pub dst_offset_minutes: i32,
    /// The zone's broken-down local wall time for the instant.
    pub local_datetime: LocalDateTime,
    pub kind: SampleKind,
}

impl Sample {
    /// Capture a sample at a Unix epoch instant by querying the zone rules
    /// for the offsets and broken-down local time.
    pub fn for_instant<R: ZoneRules>(rules: &R, unix_seconds: i64, kind: SampleKind) -> Self {
        let offset = rules.offset_at(unix_seconds);
        Self {
            epoch_seconds: unix_seconds - SECONDS_SINCE_UNIX_EPOCH,
            utc_offset_minutes: (offset.utc_offset_seconds / 60) as i32,
            dst_offset_minutes: (offset.dst_offset_seconds / 60) as i32,
            local_datetime: rules.local_datetime_at(unix_seconds),
            kind,
        }
    }
}

/// Collects one zone's samples keyed by instant, deduplicating as it goes.
///
/// The first sample recorded at an instant wins. The samplers run in a
/// fixed order (transitions, then calendar anchors), so a transition
/// sample always takes priority over a calendar sample landing on the
/// same instant, keeping the output reproducible across runs.
#[derive(Debug, Default)]
pub struct SampleSetBuilder {
    samples: BTreeMap<i64, Sample>,
}

impl SampleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: Sample) {
        self.samples.entry(sample.epoch_seconds).or_insert(sample);
    }

    pub fn build(self) -> ZoneSampleSet {
        ZoneSampleSet {
            samples: self.samples.into_values().collect(),
        }
    }
}

/// An ordered, duplicate-free sequence of samples for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSampleSet {
    samples: Vec<Sample>,
}

impl ZoneSampleSet {
    /// Samples in ascending `epoch_seconds` order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-zone outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneData {
    /// The oracle could not resolve the zone identifier.
    Missing,
    Present(ZoneSampleSet),
}

impl ZoneData {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

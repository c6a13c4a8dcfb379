//! Sample generation: transition boundary sampling, calendar anchor
//! sampling, and the per-run driver.
//!
//! The transition sampler walks the oracle's transition sequence and
//! captures the instants where offset bugs are most likely to surface: one
//! second before each transition and the transition itself. The calendar
//! sampler adds anchors that exist independently of any transition, so
//! steady-state offset errors are caught even in zones that never change
//! offset inside the window.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::oracle::{LocalDateTime, ZoneOracle, ZoneRules};
use crate::sample::{Sample, SampleKind, SampleSetBuilder, ZoneData, ZoneSampleSet};
use crate::RunConfig;

/// Generate sample data for every requested zone.
///
/// Resolution failures are downgraded to [`ZoneData::Missing`] so one bad
/// identifier never aborts the rest of the run. The returned map is keyed
/// by zone identifier and therefore lexicographically ordered.
pub fn generate<O: ZoneOracle>(
    oracle: &O,
    config: &RunConfig,
    zones: &[String],
) -> BTreeMap<String, ZoneData> {
    let mut fixture = BTreeMap::new();
    for identifier in zones {
        let data = match oracle.resolve(identifier) {
            Some(rules) => {
                let samples = build_zone_samples(&rules, config);
                debug!("{identifier}: {} samples", samples.len());
                ZoneData::Present(samples)
            }
            None => {
                warn!("zone '{identifier}' not found");
                ZoneData::Missing
            }
        };
        fixture.insert(identifier.clone(), data);
    }
    fixture
}

/// Build the ordered sample set for one resolved zone over the configured
/// `[start_year, until_year)` window.
///
/// Transition samples are collected before calendar samples; on an instant
/// collision the collector keeps the earlier insertion.
pub fn build_zone_samples<R: ZoneRules>(rules: &R, config: &RunConfig) -> ZoneSampleSet {
    let start =
        rules.epoch_seconds_for_local(LocalDateTime::new(config.start_year, 1, 1, 0, 0, 0));
    let until =
        rules.epoch_seconds_for_local(LocalDateTime::new(config.until_year, 1, 1, 0, 0, 0));

    let mut builder = SampleSetBuilder::new();
    collect_transition_samples(rules, &mut builder, start, until);
    collect_calendar_samples(rules, &mut builder, start, until);
    builder.build()
}

/// Record a boundary pair for every offset transition in the window: one
/// second before the transition and the transition instant itself.
///
/// The walk stops once a transition instant, rendered with the outgoing
/// offset, reaches the until instant's local year. That policy excludes a
/// transition taking effect exactly as the outgoing wall clock reads the
/// final New Year even though its instant precedes `until`; downstream
/// fixtures depend on this exact cutoff, so it is intentional.
fn collect_transition_samples<R: ZoneRules>(
    rules: &R,
    builder: &mut SampleSetBuilder,
    start: i64,
    until: i64,
) {
    let until_year = rules.local_datetime_at(until).year;
    let mut prev = start;
    while let Some(transition) = rules.next_transition_after(prev) {
        if transition.local_year_before >= until_year {
            break;
        }
        builder.insert(Sample::for_instant(
            rules,
            transition.at_time - 1,
            SampleKind::BeforeTransition,
        ));
        builder.insert(Sample::for_instant(
            rules,
            transition.at_time,
            SampleKind::AtTransition,
        ));
        prev = transition.at_time;
    }
}

/// Record the first instant of every month and the last hour of every year
/// (`{year}-12-31T23:00:00` local) inside the window.
///
/// Wall times that fall into a spring-forward gap are handed to the oracle
/// unmodified; its disambiguation policy decides the instant.
fn collect_calendar_samples<R: ZoneRules>(
    rules: &R,
    builder: &mut SampleSetBuilder,
    start: i64,
    until: i64,
) {
    let start_year = rules.local_datetime_at(start).year;
    let until_year = rules.local_datetime_at(until).year;
    for year in start_year..until_year {
        for month in 1..=12 {
            let instant =
                rules.epoch_seconds_for_local(LocalDateTime::new(year, month, 1, 0, 0, 0));
            builder.insert(Sample::for_instant(rules, instant, SampleKind::MonthStart));
        }
        let instant = rules.epoch_seconds_for_local(LocalDateTime::new(year, 12, 31, 23, 0, 0));
        builder.insert(Sample::for_instant(rules, instant, SampleKind::YearEnd));
    }
}

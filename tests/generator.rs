//! Generator tests against a hand-built oracle with a known transition
//! schedule, decoupled from any real time zone database.

use std::collections::BTreeMap;

use tzfixture_gen::render::{render_data_table, render_driver, render_header};
use tzfixture_gen::{
    generate, LocalDateTime, OffsetTransition, RunConfig, Sample, SampleKind, Scope, TzdbOracle,
    UtcOffsetRecord, ZoneData, ZoneOracle, ZoneRules, SECONDS_SINCE_UNIX_EPOCH,
};

/// Unix epoch seconds for a UTC wall time.
fn utc(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> i64 {
    LocalDateTime::new(year, month, day, hour, minute, second).as_local_seconds()
}

const STANDARD: UtcOffsetRecord = UtcOffsetRecord {
    utc_offset_seconds: 3600,
    dst_offset_seconds: 0,
};
const DAYLIGHT: UtcOffsetRecord = UtcOffsetRecord {
    utc_offset_seconds: 7200,
    dst_offset_seconds: 3600,
};

/// A zone defined by an initial offset and an explicit transition list.
#[derive(Debug, Clone)]
struct ScheduleRules {
    initial: UtcOffsetRecord,
    transitions: Vec<(i64, UtcOffsetRecord)>,
}

impl ZoneRules for ScheduleRules {
    fn offset_at(&self, epoch_seconds: i64) -> UtcOffsetRecord {
        let mut current = self.initial;
        for (at_time, record) in &self.transitions {
            if *at_time <= epoch_seconds {
                current = *record;
            } else {
                break;
            }
        }
        current
    }

    fn next_transition_after(&self, epoch_seconds: i64) -> Option<OffsetTransition> {
        self.transitions
            .iter()
            .find(|(at_time, _)| *at_time > epoch_seconds)
            .map(|&(at_time, _)| {
                let offset_before = self.offset_at(at_time - 1).utc_offset_seconds;
                OffsetTransition {
                    at_time,
                    local_year_before: LocalDateTime::from_local_seconds(at_time + offset_before)
                        .year,
                }
            })
    }

    fn epoch_seconds_for_local(&self, local: LocalDateTime) -> i64 {
        let local_seconds = local.as_local_seconds();
        let guess = local_seconds - self.offset_at(local_seconds).utc_offset_seconds;
        local_seconds - self.offset_at(guess).utc_offset_seconds
    }
}

struct ScheduleOracle {
    zones: Vec<(&'static str, ScheduleRules)>,
}

impl ZoneOracle for ScheduleOracle {
    type Rules = ScheduleRules;

    fn resolve(&self, identifier: &str) -> Option<ScheduleRules> {
        self.zones
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, rules)| rules.clone())
    }
}

/// Two DST round trips inside the window, plus a 2012 spring transition
/// whose pre-transition local year already reaches the until year.
fn dst_zone() -> ScheduleRules {
    ScheduleRules {
        initial: STANDARD,
        transitions: vec![
            (utc(2010, 3, 14, 1, 0, 0), DAYLIGHT),
            (utc(2010, 11, 7, 1, 0, 0), STANDARD),
            (utc(2011, 3, 13, 1, 0, 0), DAYLIGHT),
            (utc(2011, 11, 6, 1, 0, 0), STANDARD),
            (utc(2012, 3, 11, 1, 0, 0), DAYLIGHT),
        ],
    }
}

fn dst_oracle() -> ScheduleOracle {
    ScheduleOracle {
        zones: vec![("Testland/DST", dst_zone())],
    }
}

fn config(start_year: i32, until_year: i32) -> RunConfig {
    RunConfig::new(Scope::Extended, None, start_year, until_year).unwrap()
}

fn samples_for<'a>(fixture: &'a BTreeMap<String, ZoneData>, zone: &str) -> &'a [Sample] {
    match fixture.get(zone) {
        Some(ZoneData::Present(set)) => set.samples(),
        other => panic!("expected samples for {zone}, got {other:?}"),
    }
}

#[test]
fn sample_instants_are_strictly_increasing() {
    let fixture = generate(&dst_oracle(), &config(2010, 2012), &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    assert!(!samples.is_empty());
    for pair in samples.windows(2) {
        assert!(pair[0].epoch_seconds < pair[1].epoch_seconds);
    }
}

#[test]
fn boundary_pairs_straddle_every_transition() {
    let fixture = generate(&dst_oracle(), &config(2010, 2012), &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    let befores: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == SampleKind::BeforeTransition)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(befores.len(), 4);

    for i in befores {
        let before = &samples[i];
        let at = &samples[i + 1];
        assert_eq!(at.kind, SampleKind::AtTransition);
        assert_eq!(at.epoch_seconds, before.epoch_seconds + 1);
        assert_ne!(at.utc_offset_minutes, before.utc_offset_minutes);
    }
}

#[test]
fn sample_census_for_two_year_window() {
    let fixture = generate(&dst_oracle(), &config(2010, 2012), &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    let count = |kind: SampleKind| samples.iter().filter(|s| s.kind == kind).count();
    assert_eq!(count(SampleKind::BeforeTransition), 4);
    assert_eq!(count(SampleKind::AtTransition), 4);
    assert_eq!(count(SampleKind::MonthStart), 24);
    assert_eq!(count(SampleKind::YearEnd), 2);
    assert_eq!(samples.len(), 34);
}

#[test]
fn transition_reaching_until_year_is_excluded() {
    let fixture = generate(&dst_oracle(), &config(2010, 2012), &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    // The 2012-03-11 transition is out of scope: the outgoing wall
    // clock already reads the until year at its instant, so no boundary
    // pair may appear for it.
    let excluded = utc(2012, 3, 11, 1, 0, 0) - SECONDS_SINCE_UNIX_EPOCH;
    assert!(samples.iter().all(|s| s.epoch_seconds != excluded));
    assert!(samples.iter().all(|s| s.epoch_seconds != excluded - 1));
}

#[test]
fn new_year_instant_transition_is_excluded() {
    // An offset change taking effect exactly as the outgoing wall clock
    // reads 2012-01-01T00:00:00: the instant rendered with the outgoing
    // offset already lies in the until year, so no boundary pair appears,
    // even though the wall time one second earlier is still 2011.
    let at_time = LocalDateTime::new(2012, 1, 1, 0, 0, 0).as_local_seconds() - 3600;
    let oracle = ScheduleOracle {
        zones: vec![(
            "Testland/NewYear",
            ScheduleRules {
                initial: STANDARD,
                transitions: vec![
                    (utc(2011, 3, 13, 1, 0, 0), DAYLIGHT),
                    (utc(2011, 11, 6, 1, 0, 0), STANDARD),
                    (at_time, DAYLIGHT),
                ],
            },
        )],
    };

    let fixture = generate(&oracle, &config(2011, 2012), &["Testland/NewYear".into()]);
    let samples = samples_for(&fixture, "Testland/NewYear");

    let excluded = at_time - SECONDS_SINCE_UNIX_EPOCH;
    assert!(samples.iter().all(|s| s.epoch_seconds != excluded));
    assert!(samples.iter().all(|s| s.epoch_seconds != excluded - 1));
    let boundary = samples
        .iter()
        .filter(|s| {
            matches!(
                s.kind,
                SampleKind::BeforeTransition | SampleKind::AtTransition
            )
        })
        .count();
    assert_eq!(boundary, 4);
}

#[test]
fn transition_sample_offsets_and_local_time() {
    let fixture = generate(&dst_oracle(), &config(2010, 2012), &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    let spring = utc(2010, 3, 14, 1, 0, 0) - SECONDS_SINCE_UNIX_EPOCH;
    let at = samples
        .iter()
        .find(|s| s.epoch_seconds == spring)
        .expect("spring transition sample");
    assert_eq!(at.kind, SampleKind::AtTransition);
    assert_eq!(at.utc_offset_minutes, 120);
    assert_eq!(at.dst_offset_minutes, 60);
    assert_eq!(at.local_datetime, LocalDateTime::new(2010, 3, 14, 3, 0, 0));

    let before = samples
        .iter()
        .find(|s| s.epoch_seconds == spring - 1)
        .expect("pre-transition sample");
    assert_eq!(before.utc_offset_minutes, 60);
    assert_eq!(before.dst_offset_minutes, 0);
    assert_eq!(
        before.local_datetime,
        LocalDateTime::new(2010, 3, 14, 1, 59, 59)
    );
}

#[test]
fn calendar_samples_stay_inside_window() {
    let oracle = dst_oracle();
    let config = config(2010, 2012);
    let fixture = generate(&oracle, &config, &["Testland/DST".into()]);
    let samples = samples_for(&fixture, "Testland/DST");

    let rules = oracle.resolve("Testland/DST").unwrap();
    let start = rules.epoch_seconds_for_local(LocalDateTime::new(2010, 1, 1, 0, 0, 0))
        - SECONDS_SINCE_UNIX_EPOCH;
    let until = rules.epoch_seconds_for_local(LocalDateTime::new(2012, 1, 1, 0, 0, 0))
        - SECONDS_SINCE_UNIX_EPOCH;

    for sample in samples {
        if matches!(sample.kind, SampleKind::MonthStart | SampleKind::YearEnd) {
            assert!(sample.epoch_seconds >= start);
            assert!(sample.epoch_seconds < until);
        }
    }
}

#[test]
fn transition_sample_wins_instant_collision() {
    // A transition landing exactly on the July month-start instant: the
    // post-transition wall time is 2010-07-01T00:00:00.
    let at_time = LocalDateTime::new(2010, 7, 1, 0, 0, 0).as_local_seconds() - 7200;
    let oracle = ScheduleOracle {
        zones: vec![(
            "Testland/Tie",
            ScheduleRules {
                initial: STANDARD,
                transitions: vec![(at_time, DAYLIGHT), (utc(2010, 11, 7, 1, 0, 0), STANDARD)],
            },
        )],
    };

    let fixture = generate(&oracle, &config(2010, 2011), &["Testland/Tie".into()]);
    let samples = samples_for(&fixture, "Testland/Tie");

    let collided = samples
        .iter()
        .find(|s| s.epoch_seconds == at_time - SECONDS_SINCE_UNIX_EPOCH)
        .expect("collided sample");
    assert_eq!(collided.kind, SampleKind::AtTransition);

    // 4 boundary samples + 13 calendar anchors, one absorbed by the tie.
    assert_eq!(samples.len(), 16);
}

#[test]
fn fixed_offset_zone_yields_calendar_samples_only() {
    let oracle = ScheduleOracle {
        zones: vec![(
            "Testland/Fixed",
            ScheduleRules {
                initial: STANDARD,
                transitions: Vec::new(),
            },
        )],
    };

    let fixture = generate(&oracle, &config(2010, 2011), &["Testland/Fixed".into()]);
    let samples = samples_for(&fixture, "Testland/Fixed");

    assert_eq!(samples.len(), 13);
    for sample in samples {
        assert!(matches!(
            sample.kind,
            SampleKind::MonthStart | SampleKind::YearEnd
        ));
        assert_eq!(sample.utc_offset_minutes, 60);
        assert_eq!(sample.dst_offset_minutes, 0);
    }
}

#[test]
fn paris_2021_fixture_from_bundled_database() {
    let fixture = generate(&TzdbOracle, &config(2021, 2022), &["Europe/Paris".into()]);
    let samples = samples_for(&fixture, "Europe/Paris");

    let count = |kind: SampleKind| samples.iter().filter(|s| s.kind == kind).count();
    assert_eq!(count(SampleKind::BeforeTransition), 2);
    assert_eq!(count(SampleKind::AtTransition), 2);
    assert_eq!(count(SampleKind::MonthStart), 12);
    assert_eq!(count(SampleKind::YearEnd), 1);

    for pair in samples.windows(2) {
        assert!(pair[0].epoch_seconds < pair[1].epoch_seconds);
    }

    // 2021-03-28T01:00:00Z: +01:00 becomes +02:00.
    let spring = 1_616_893_200 - SECONDS_SINCE_UNIX_EPOCH;
    let at = samples
        .iter()
        .find(|s| s.epoch_seconds == spring)
        .expect("spring transition sample");
    assert_eq!(at.kind, SampleKind::AtTransition);
    assert_eq!(at.utc_offset_minutes, 120);
    assert_eq!(at.dst_offset_minutes, 60);
    assert_eq!(at.local_datetime, LocalDateTime::new(2021, 3, 28, 3, 0, 0));
    let before = samples
        .iter()
        .find(|s| s.epoch_seconds == spring - 1)
        .expect("pre-transition sample");
    assert_eq!(before.kind, SampleKind::BeforeTransition);
    assert_eq!(before.utc_offset_minutes, 60);
    assert_eq!(before.dst_offset_minutes, 0);

    // 2021-10-31T01:00:00Z: +02:00 falls back to +01:00.
    let fall = 1_635_642_000 - SECONDS_SINCE_UNIX_EPOCH;
    let at = samples
        .iter()
        .find(|s| s.epoch_seconds == fall)
        .expect("fall transition sample");
    assert_eq!(at.utc_offset_minutes, 60);
    assert_eq!(at.dst_offset_minutes, 0);
    let before = samples
        .iter()
        .find(|s| s.epoch_seconds == fall - 1)
        .expect("pre-transition sample");
    assert_eq!(before.utc_offset_minutes, 120);
    assert_eq!(before.dst_offset_minutes, 60);
}

#[test]
fn unresolved_zone_is_missing_and_siblings_proceed() {
    let fixture = generate(
        &dst_oracle(),
        &config(2010, 2012),
        &["Foo/Bar".into(), "Testland/DST".into()],
    );

    assert_eq!(fixture.get("Foo/Bar"), Some(&ZoneData::Missing));
    assert!(!samples_for(&fixture, "Testland/DST").is_empty());
}

#[test]
fn repeated_runs_render_identical_artifacts() {
    let oracle = dst_oracle();
    let config = config(2010, 2012);
    let zones = vec!["Foo/Bar".to_string(), "Testland/DST".to_string()];
    let invocation = "tzfixture-gen --scope extended --start-year 2010 --until-year 2012";

    let first = generate(&oracle, &config, &zones);
    let second = generate(&oracle, &config, &zones);

    assert_eq!(
        render_data_table(&first, &config, invocation),
        render_data_table(&second, &config, invocation)
    );
    assert_eq!(
        render_header(&first, &config, invocation),
        render_header(&second, &config, invocation)
    );
    assert_eq!(
        render_driver(&first, &config, invocation),
        render_driver(&second, &config, invocation)
    );

    // Missing zones never reach the active table.
    let table = render_data_table(&first, &config, invocation);
    assert!(!table.contains("kValidationItemsFoo_Bar"));
}

//! Fixture rendering: serializes the per-zone sample sets into the three
//! source artifacts consumed by the downstream validation harness.
//!
//! Layout is fixed; the harness depends on it byte for byte. Zones render
//! in the lexicographic order of the fixture map, missing zones appear
//! only as commented-out entries, and every artifact starts with a
//! provenance comment naming the invocation that produced it.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use log::info;

use crate::sample::{Sample, ZoneData};
use crate::{FixtureError, RunConfig};

pub const DATA_FILE: &str = "validation_data.cpp";
pub const HEADER_FILE: &str = "validation_data.h";
pub const DRIVER_FILE: &str = "validation_tests.cpp";

/// Render and persist all three artifacts into `out_dir`.
pub fn write_artifacts(
    out_dir: &Path,
    fixture: &BTreeMap<String, ZoneData>,
    config: &RunConfig,
    invocation: &str,
) -> Result<(), FixtureError> {
    for (filename, contents) in [
        (DATA_FILE, render_data_table(fixture, config, invocation)),
        (HEADER_FILE, render_header(fixture, config, invocation)),
        (DRIVER_FILE, render_driver(fixture, config, invocation)),
    ] {
        fs::write(out_dir.join(filename), contents)?;
        info!("Created {filename}");
    }
    Ok(())
}

/// Convert a zone identifier into a symbol usable in the generated source,
/// e.g. "America/Los_Angeles" into "America_Los_Angeles".
fn normalize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c == '+' {
                "_PLUS_".to_string()
            } else if c.is_ascii_alphanumeric() {
                c.to_string()
            } else {
                "_".to_string()
            }
        })
        .collect()
}

fn provenance(out: &mut String, invocation: &str) {
    let _ = writeln!(out, "// This file was auto-generated by the following script:");
    let _ = writeln!(out, "//");
    let _ = writeln!(out, "// $ {invocation}");
    let _ = writeln!(out, "//");
    let _ = writeln!(out, "// DO NOT EDIT");
    let _ = writeln!(out);
}

fn active_count(fixture: &BTreeMap<String, ZoneData>) -> usize {
    fixture.values().filter(|data| !data.is_missing()).count()
}

/// The data table artifact: one fixed-layout record list and aggregate per
/// resolved zone.
pub fn render_data_table(
    fixture: &BTreeMap<String, ZoneData>,
    config: &RunConfig,
    invocation: &str,
) -> String {
    let mut out = String::new();
    provenance(&mut out, invocation);
    let _ = writeln!(out, "#include <AceTime.h>");
    if !config.is_default_namespace() {
        let _ = writeln!(out, "#include \"{}/zone_infos.h\"", config.namespace);
        let _ = writeln!(out, "#include \"{}/zone_policies.h\"", config.namespace);
    }
    let _ = writeln!(out, "#include \"validation_data.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "namespace ace_time {{");
    let _ = writeln!(out, "namespace {} {{", config.namespace);

    for (identifier, data) in fixture {
        let ZoneData::Present(samples) = data else {
            continue;
        };
        let symbol = normalize_identifier(identifier);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "//---------------------------------------------------------------------------"
        );
        let _ = writeln!(out, "// Zone name: {identifier}");
        let _ = writeln!(
            out,
            "//---------------------------------------------------------------------------"
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "static const ValidationItem kValidationItems{symbol}[] = {{");
        let _ = writeln!(out, "  //     epoch,  utc,  dst,    y,  m,  d,  h,  m,  s");
        for sample in samples.samples() {
            render_row(&mut out, sample);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "}};");
        let _ = writeln!(out);
        let _ = writeln!(out, "const ValidationData kValidationData{symbol} = {{");
        let _ = writeln!(out, "  &kZone{symbol} /*zoneInfo*/,");
        let _ = writeln!(
            out,
            "  sizeof(kValidationItems{symbol})/sizeof(ValidationItem) /*numItems*/,"
        );
        let _ = writeln!(out, "  kValidationItems{symbol} /*items*/,");
        let _ = writeln!(out, "}};");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, "}}");
    out
}

fn render_row(out: &mut String, sample: &Sample) {
    let local = &sample.local_datetime;
    let _ = writeln!(
        out,
        "  {{ {:10}, {:4}, {:4}, {:4}, {:2}, {:2}, {:2}, {:2}, {:2} }}, // type={}",
        sample.epoch_seconds,
        sample.utc_offset_minutes,
        sample.dst_offset_minutes,
        local.year,
        local.month,
        local.day,
        local.hour,
        local.minute,
        local.second,
        sample.kind.as_char()
    );
}

/// The header artifact: an extern declaration per resolved zone, missing
/// zones commented out, both sections annotated with counts.
pub fn render_header(
    fixture: &BTreeMap<String, ZoneData>,
    config: &RunConfig,
    invocation: &str,
) -> String {
    let active = active_count(fixture);
    let missing = fixture.len() - active;

    let mut out = String::new();
    provenance(&mut out, invocation);
    let _ = writeln!(out, "#ifndef ACE_TIME_VALIDATION_TEST_VALIDATION_DATA_H");
    let _ = writeln!(out, "#define ACE_TIME_VALIDATION_TEST_VALIDATION_DATA_H");
    let _ = writeln!(out);
    let _ = writeln!(out, "#include \"ValidationDataType.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "namespace ace_time {{");
    let _ = writeln!(out, "namespace {} {{", config.namespace);
    let _ = writeln!(out);

    let _ = writeln!(out, "// numZones: {active}");
    if missing > 0 {
        let _ = writeln!(out, "// missingZones: {missing}");
    }
    for (identifier, data) in fixture {
        if data.is_missing() {
            continue;
        }
        let symbol = normalize_identifier(identifier);
        let _ = writeln!(out, "extern const ValidationData kValidationData{symbol};");
    }

    if missing > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "// Zones missing from the time zone database");
        let _ = writeln!(out, "// missingZones: {missing}");
        for (identifier, data) in fixture {
            if !data.is_missing() {
                continue;
            }
            let symbol = normalize_identifier(identifier);
            let _ = writeln!(out, "// extern const ValidationData kValidationData{symbol};");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#endif");
    out
}

/// The driver artifact: one test entry per zone asserting the rendered
/// table against the library under validation.
pub fn render_driver(
    fixture: &BTreeMap<String, ZoneData>,
    config: &RunConfig,
    invocation: &str,
) -> String {
    let active = active_count(fixture);
    let missing = fixture.len() - active;

    let mut out = String::new();
    provenance(&mut out, invocation);
    let _ = writeln!(out, "#include <AUnit.h>");
    let _ = writeln!(out, "#include \"TransitionTest.h\"");
    let _ = writeln!(out, "#include \"validation_data.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "// numZones: {active}");
    let _ = writeln!(out, "// missingZones: {missing}");

    for (identifier, data) in fixture {
        let comment = if data.is_missing() { "// " } else { "" };
        let symbol = normalize_identifier(identifier);
        let _ = writeln!(out, "{comment}testF(TransitionTest, {symbol}) {{");
        let _ = writeln!(
            out,
            "{comment}  assertValid(&ace_time::{}::kValidationData{symbol});",
            config.namespace
        );
        let _ = writeln!(out, "{comment}}}");
    }
    out
}

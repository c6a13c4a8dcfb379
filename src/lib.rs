//! Deterministic validation fixture generation for time zone offset and
//! DST calculations.
//!
//! For each named zone and a closed year window, the generator produces a
//! chronologically ordered, duplicate-free set of reference samples,
//! `(instant, UTC offset, DST offset, local date-time)` tuples, that a
//! time zone library's offset arithmetic can be checked against.
//!
//! The pipeline per zone:
//!
//! 1. resolve the identifier through a [`oracle::ZoneOracle`] (failures
//!    mark the zone missing and the run continues),
//! 2. sample around every offset transition in the window and at fixed
//!    calendar anchors ([`sampler`]),
//! 3. merge and deduplicate by instant into one [`sample::ZoneSampleSet`],
//! 4. render the per-zone sets into the three fixture artifacts
//!    ([`render`]).
//!
//! The production oracle ([`tzif::TzdbOracle`]) answers queries from the
//! bundled TZif database; the samplers only ever talk to the
//! [`oracle::ZoneRules`] trait, so tests can substitute a hand-built
//! schedule.

use std::io;

pub mod gregorian;
pub mod oracle;
pub mod render;
pub mod sample;
pub mod sampler;
pub mod tzif;

pub use oracle::{LocalDateTime, OffsetTransition, UtcOffsetRecord, ZoneOracle, ZoneRules};
pub use render::write_artifacts;
pub use sample::{Sample, SampleKind, ZoneData, ZoneSampleSet};
pub use sampler::generate;
pub use tzif::TzdbOracle;

/// Seconds between the Unix epoch (1970-01-01T00:00:00Z) and the fixture
/// epoch (2000-01-01T00:00:00Z). Sample instants are stored relative to
/// the fixture epoch.
pub const SECONDS_SINCE_UNIX_EPOCH: i64 = 946_684_800;

/// The general error type for fixture generation runs.
#[derive(Debug)]
pub enum FixtureError {
    /// Malformed run parameters; fatal before any generation begins.
    InvalidConfiguration(String),
    /// The bundled TZif data for a zone could not be parsed.
    IllformedTzif,
    /// An artifact could not be persisted; fatal for the run.
    Io(io::Error),
}

impl From<io::Error> for FixtureError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl core::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::IllformedTzif => write!(f, "illformed TZif data"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FixtureError {}

/// Zone database scope of a run; only picks the default namespace label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Basic,
    Extended,
}

impl Scope {
    pub fn default_namespace(self) -> &'static str {
        match self {
            Self::Basic => "zonedb",
            Self::Extended => "zonedbx",
        }
    }
}

/// Validated run parameters, immutable for the run's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub scope: Scope,
    /// Output grouping label for the rendered artifacts.
    pub namespace: String,
    /// First year of the sampling window.
    pub start_year: i32,
    /// Exclusive upper bound of the sampling window.
    pub until_year: i32,
}

impl RunConfig {
    /// Validate run parameters. The namespace defaults from the scope when
    /// not given.
    pub fn new(
        scope: Scope,
        namespace: Option<String>,
        start_year: i32,
        until_year: i32,
    ) -> Result<Self, FixtureError> {
        if start_year >= until_year {
            return Err(FixtureError::InvalidConfiguration(format!(
                "start year {start_year} must precede until year {until_year}"
            )));
        }
        Ok(Self {
            scope,
            namespace: namespace.unwrap_or_else(|| scope.default_namespace().into()),
            start_year,
            until_year,
        })
    }

    /// Whether the namespace is one of the stock labels; custom namespaces
    /// get extra includes in the rendered data table.
    pub fn is_default_namespace(&self) -> bool {
        matches!(self.namespace.as_str(), "zonedb" | "zonedbx")
    }
}

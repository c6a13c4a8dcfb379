//! Generates validation fixture artifacts for the zones listed on stdin.
//!
//! ```text
//! $ tzfixture-gen --scope (basic | extended) \
//!     [--db-namespace ns] [--start-year start] [--until-year until] \
//!     [--out-dir dir] < zones.txt
//! ```
//!
//! `zones.txt` holds one fully qualified zone identifier per line (e.g.
//! "America/Los_Angeles"); blank lines and `#` comments are ignored.

use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;
use simple_logger::SimpleLogger;

use tzfixture_gen::{generate, write_artifacts, FixtureError, RunConfig, Scope, TzdbOracle};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Basic,
    Extended,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Basic => Scope::Basic,
            ScopeArg::Extended => Scope::Extended,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    about = "Generate validation fixtures for time zone offset/DST calculations",
    after_help = "Zone identifiers are read from stdin, one per line; blank \
                  lines and '#' comments are ignored."
)]
struct Cli {
    /// Zone database scope; also picks the default namespace.
    #[arg(long, value_enum)]
    scope: ScopeArg,

    /// Namespace label for the generated artifacts.
    #[arg(long)]
    db_namespace: Option<String>,

    /// First year of the sampling window.
    #[arg(long, default_value_t = 2000)]
    start_year: i32,

    /// Exclusive upper bound of the sampling window.
    #[arg(long, default_value_t = 2050)]
    until_year: i32,

    /// Directory the artifacts are written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// Read zone identifiers, skipping blank lines and `#` comments.
fn read_zones(reader: impl BufRead) -> Result<Vec<String>, FixtureError> {
    let mut zones = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        zones.push(trimmed.to_string());
    }
    Ok(zones)
}

fn run(cli: Cli, invocation: &str) -> Result<(), FixtureError> {
    let config = RunConfig::new(
        cli.scope.into(),
        cli.db_namespace,
        cli.start_year,
        cli.until_year,
    )?;

    let zones = read_zones(io::stdin().lock())?;
    if zones.is_empty() {
        return Err(FixtureError::InvalidConfiguration(
            "no zone identifiers provided on stdin".into(),
        ));
    }

    let fixture = generate(&TzdbOracle, &config, &zones);
    write_artifacts(&cli.out_dir, &fixture, &config, invocation)
}

fn main() -> ExitCode {
    if SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .is_err()
    {
        eprintln!("logger initialization failed");
        return ExitCode::FAILURE;
    }

    let invocation = env::args().collect::<Vec<String>>().join(" ");
    let cli = Cli::parse();

    match run(cli, &invocation) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

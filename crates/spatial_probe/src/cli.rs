//! Command-line interface handling for the spatial probe.
//!
//! Uses the `clap` builder API; every flag overrides a value from the
//! configuration file.

use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the number of objects spawned per level
    pub objects: Option<usize>,
    /// Optional override for the number of simulated ticks
    pub ticks: Option<u32>,
    /// Optional override for the RNG seed
    pub seed: Option<u64>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("Spatial Probe")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Drives a synthetic spawn/move/query workload through per-level spatial indices")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("spatial_probe.toml"),
            )
            .arg(
                Arg::new("objects")
                    .short('n')
                    .long("objects")
                    .value_name("COUNT")
                    .help("Objects spawned per level")
                    .value_parser(value_parser!(usize)),
            )
            .arg(
                Arg::new("ticks")
                    .short('t')
                    .long("ticks")
                    .value_name("TICKS")
                    .help("Number of simulated ticks")
                    .value_parser(value_parser!(u32)),
            )
            .arg(
                Arg::new("seed")
                    .short('s')
                    .long("seed")
                    .value_name("SEED")
                    .help("Seed for the workload RNG")
                    .value_parser(value_parser!(u64)),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Parses the process arguments
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list (first item is the binary name)
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("spatial_probe.toml")),
            objects: matches.get_one::<usize>("objects").copied(),
            ticks: matches.get_one::<u32>("ticks").copied(),
            seed: matches.get_one::<u64>("seed").copied(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

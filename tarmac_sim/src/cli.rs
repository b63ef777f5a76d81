// tarmac_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Tarmac: a fixed-step vehicle dynamics simulator.
///
/// This struct defines the command-line arguments accepted by the `tarmac`
/// binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/00_sedan_launch.toml")]
    pub scenario: PathBuf,

    /// Root directory of the preset catalog.
    #[arg(short, long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Overrides the scenario's seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run only the vehicle with this name.
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Write the final report as TOML to this path.
    #[arg(long)]
    pub dump_final: Option<PathBuf>,

    /// One of: error, warn, info, debug, trace.
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: Level,
}

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>()
        .map_err(|_| format!("'{s}' is not a log level (error, warn, info, debug, trace)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["tarmac"]);
        assert_eq!(cli.catalog, PathBuf::from("assets/catalog"));
        assert_eq!(cli.log_level, Level::INFO);
        assert!(cli.seed.is_none());
        assert!(cli.dump_final.is_none());
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::parse_from([
            "tarmac",
            "--scenario",
            "s.toml",
            "--seed",
            "7",
            "--vehicle",
            "hatch",
            "--dump-final",
            "out.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.scenario, PathBuf::from("s.toml"));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.vehicle.as_deref(), Some("hatch"));
        assert_eq!(cli.dump_final, Some(PathBuf::from("out.toml")));
        assert_eq!(cli.log_level, Level::DEBUG);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Cli::try_parse_from(["tarmac", "--log-level", "loud"]).is_err());
    }
}

//! Engine configuration.
//!
//! Values are resolved in three layers, later layers winning:
//!
//! 1. built-in defaults ([`EngineConfig::default`])
//! 2. an optional JSON file (`--config` / `ELECTIVE_CONFIG`)
//! 3. command line flags and their environment variables
//!
//! ```json
//! {
//!   "reservation_split": { "sc": "0.25", "st": "0.125", "obc": "0.45" },
//!   "default_round": 1,
//!   "log_level": "info"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AllocError, Result};
use crate::seats::ReservationSplit;

/// Resolved engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reservation_split: ReservationSplit,

    /// Round used when the caller does not name one
    pub default_round: u32,

    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reservation_split: ReservationSplit::default(),
            default_round: 1,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.reservation_split.validate()?;
        if self.default_round == 0 {
            return Err(AllocError::Config("default_round must be at least 1".to_string()));
        }
        if self.log_level.trim().is_empty() {
            return Err(AllocError::Config("log_level must not be empty".to_string()));
        }
        Ok(())
    }

    /// Override fields with every value given on the command line
    pub fn merge(self, cli: &Cli) -> EngineConfig {
        let split = self.reservation_split;
        EngineConfig {
            reservation_split: ReservationSplit {
                sc: cli.sc_ratio.unwrap_or(split.sc),
                st: cli.st_ratio.unwrap_or(split.st),
                obc: cli.obc_ratio.unwrap_or(split.obc),
            },
            default_round: cli.round.unwrap_or(self.default_round),
            log_level: cli.log_level.clone().unwrap_or(self.log_level),
        }
    }
}

/// Command line of the `elective-allot` binary.
#[derive(Parser, Debug, Clone, Default)]
#[clap(name = "elective-allot", about = "Run a merit-and-quota elective seat allocation round", version)]
pub struct Cli {
    #[clap(long = "config", env = "ELECTIVE_CONFIG", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "ELECTIVE_FIXTURE", help = "Path to a JSON cohort fixture. A built-in demo cohort is used when omitted.")]
    pub fixture: Option<PathBuf>,

    #[clap(long, env = "ELECTIVE_COHORT", help = "Cohort to allocate. Defaults to the first cohort in the fixture.")]
    pub cohort: Option<u64>,

    #[clap(long, env = "ELECTIVE_ROUND", help = "Allocation round (1-based).")]
    pub round: Option<u32>,

    #[clap(long, env = "ELECTIVE_TIMESTAMP", help = "Run timestamp in milliseconds written to every row.")]
    pub timestamp: Option<u64>,

    #[clap(long, env = "ELECTIVE_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, help = "Share of reserved seats given to SC.")]
    pub sc_ratio: Option<Decimal>,

    #[clap(long, help = "Share of reserved seats given to ST.")]
    pub st_ratio: Option<Decimal>,

    #[clap(long, help = "Share of reserved seats given to OBC.")]
    pub obc_ratio: Option<Decimal>,
}

/// Resolve defaults, the config file and CLI overrides into a validated config
pub fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let base = match &cli.config_path {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let config = base.merge(cli);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{"default_round": 2}"#).unwrap();
        assert_eq!(config.default_round, 2);
        assert_eq!(config.reservation_split, ReservationSplit::default());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_split_from_strings() {
        let json = r#"{"reservation_split": {"sc": "0.3", "st": "0.1", "obc": "0.4"}}"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.reservation_split.sc, Decimal::new(3, 1));
        config.validate().unwrap();
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::parse_from(["elective-allot", "--round", "3", "--sc-ratio", "0.2", "--log-level", "debug"]);
        let config = EngineConfig::default().merge(&cli);
        assert_eq!(config.default_round, 3);
        assert_eq!(config.reservation_split.sc, Decimal::new(2, 1));
        assert_eq!(config.reservation_split.st, Decimal::new(125, 3));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.default_round = 0;
        assert!(matches!(config.validate(), Err(AllocError::Config(_))));

        let mut config = EngineConfig::default();
        config.reservation_split.obc = Decimal::new(9, 1);
        assert!(matches!(config.validate(), Err(AllocError::Config(_))));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{"),
            Err(AllocError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let cli = Cli {
            config_path: Some(PathBuf::from("/nonexistent/elective.json")),
            ..Cli::default()
        };
        assert!(matches!(load_config(&cli), Err(AllocError::Io(_))));
    }

    #[test]
    fn test_load_config_from_file_then_cli() {
        let path = std::env::temp_dir().join(format!("elective-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"default_round": 2, "log_level": "warn"}"#).unwrap();

        let cli = Cli {
            config_path: Some(path.clone()),
            round: Some(4),
            ..Cli::default()
        };
        let config = load_config(&cli).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.default_round, 4);
        assert_eq!(config.log_level, "warn");
    }
}

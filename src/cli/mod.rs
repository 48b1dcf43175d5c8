//! Command-line interface for the house-service binary.

use clap::Parser;
use std::path::PathBuf;

/// house-service - houses, flats and their moderation over HTTP
#[derive(Parser, Debug)]
#[command(
    name = "house-service",
    version,
    about = "Houses, flats and their moderation over HTTP",
    after_help = "EXAMPLES:\n    \
                  house-service                      # Start with ./house.toml\n    \
                  house-service --config prod.toml   # Use a custom config file\n    \
                  RUST_LOG=debug house-service       # Override the configured log level"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "house.toml", env = "HOUSE_SERVICE_CONFIG")]
    pub config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        std::env::remove_var("HOUSE_SERVICE_CONFIG");
        let cli = Cli::try_parse_from(["house-service"]).expect("parse");

        assert_eq!(cli.config, PathBuf::from("house.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_custom_config_and_verbose() {
        let cli = Cli::try_parse_from(["house-service", "-c", "prod.toml", "--verbose"])
            .expect("parse");

        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["house-service", "--no-such-flag"]).is_err());
    }
}

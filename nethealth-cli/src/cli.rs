//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// `nethealth` command-line interface for polling device fleet health
#[derive(Parser)]
#[command(name = "nethealth")]
#[command(author, version, about = "Fleet health poller for network devices")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the device registry TOML file
    #[arg(short, long, global = true, default_value = "devices.toml")]
    pub registry: PathBuf,

    /// Path to an optional poll settings TOML file
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll every registered device and print the fleet health report
    #[command(about = "Poll the whole fleet and print the health report")]
    Poll {
        /// Output format for the report
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Poll a single device and print its health record
    #[command(about = "Poll one device by name")]
    Device {
        /// Device name as declared in the registry
        name: String,
    },

    /// Poll the fleet and write a timestamped JSON report file
    #[command(about = "Poll the fleet and export a report file")]
    Export {
        /// Directory the report file is written into
        #[arg(short, long, default_value = "reports")]
        output_dir: PathBuf,
    },
}

/// Output format for fleet reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored table
    Table,
    /// Pretty-printed JSON report body
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_poll_defaults() {
        let cli = Cli::parse_from(["nethealth", "poll"]);
        assert_eq!(cli.registry, PathBuf::from("devices.toml"));
        assert!(cli.settings.is_none());
        assert!(matches!(
            cli.command,
            Commands::Poll {
                format: OutputFormat::Table
            }
        ));
    }

    #[test]
    fn test_parse_device_with_registry_override() {
        let cli = Cli::parse_from(["nethealth", "--registry", "lab.toml", "device", "R1-P"]);
        assert_eq!(cli.registry, PathBuf::from("lab.toml"));
        assert!(matches!(cli.command, Commands::Device { name } if name == "R1-P"));
    }

    #[test]
    fn test_parse_export_output_dir() {
        let cli = Cli::parse_from(["nethealth", "export", "--output-dir", "/tmp/reports"]);
        assert!(
            matches!(cli.command, Commands::Export { output_dir } if output_dir == PathBuf::from("/tmp/reports"))
        );
    }

    #[test]
    fn test_parse_json_format() {
        let cli = Cli::parse_from(["nethealth", "poll", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Commands::Poll {
                format: OutputFormat::Json
            }
        ));
    }
}

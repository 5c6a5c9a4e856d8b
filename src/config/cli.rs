//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// loadsplit - Plan and preview distributed load tests
#[derive(Parser, Debug)]
#[command(name = "loadsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level or filter directive (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "info", env = "LOADSPLIT_LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a plan over its agents and print every agent's share
    Plan {
        /// TOML plan file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Replace the plan's agent list with N anonymous agents
        #[arg(long, value_name = "N")]
        agents: Option<usize>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,

        /// Write one assignment file per agent into DIR
        #[arg(long, value_name = "DIR")]
        export: Option<PathBuf>,
    },

    /// Generate parameter values for one agent's share locally
    Preview {
        /// TOML plan file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Replace the plan's agent list with N anonymous agents
        #[arg(long, value_name = "N")]
        agents: Option<usize>,

        /// Index of the agent to preview
        #[arg(long, default_value = "0")]
        agent: usize,

        /// Simulated worker threads
        #[arg(long, default_value = "2")]
        threads: usize,

        /// Values to draw per thread
        #[arg(long, default_value = "5")]
        calls: usize,
    },

    /// Decode an exported assignment file
    Inspect {
        /// Assignment file written by `plan --export`
        #[arg(value_name = "ASSIGNMENT")]
        assignment: PathBuf,

        /// Print the assignment as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_args() {
        let cli = Cli::try_parse_from(["loadsplit", "plan", "load.toml", "--agents", "3", "--json"]).unwrap();
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Plan { file, agents, json, export } => {
                assert_eq!(file, PathBuf::from("load.toml"));
                assert_eq!(agents, Some(3));
                assert!(json);
                assert!(export.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["loadsplit", "preview", "load.toml", "--calls", "7", "--log-level", "debug", "--log-json"])
            .unwrap();
        assert_eq!(cli.log_level, "debug");
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::Preview { calls: 7, agent: 0, threads: 2, .. }));
    }

    #[test]
    fn test_inspect_requires_file() {
        assert!(Cli::try_parse_from(["loadsplit", "inspect"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

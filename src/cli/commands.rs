//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::device::LoadAction;
use crate::document::CommandFormat;

/// rcli - Deploy configuration to Junos routers over NETCONF.
#[derive(Parser, Debug)]
#[command(name = "rcli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Management user (defaults to the settings file, then $USER).
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Path to the settings file.
    #[arg(short, long, global = true, env = "RCLI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a local configuration and show the diff without committing.
    Check {
        /// Router to connect to.
        router: String,

        /// Local configuration file.
        local_file: PathBuf,

        /// Write the raw diff to this file.
        #[arg(short = 'f', long)]
        diff_file: Option<PathBuf>,

        /// How the candidate is merged with the existing configuration.
        #[arg(long, value_enum, default_value_t = LoadAction::Override)]
        load_action: LoadAction,
    },

    /// Load a local configuration, show the diff, and commit it.
    Apply {
        /// Router to connect to.
        router: String,

        /// Local configuration file.
        local_file: PathBuf,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,

        /// Confirm the commit immediately instead of waiting.
        #[arg(long)]
        commit: bool,

        /// How the candidate is merged with the existing configuration.
        #[arg(long, value_enum, default_value_t = LoadAction::Override)]
        load_action: LoadAction,
    },

    /// Run an operational command.
    Exec {
        /// Router to connect to.
        router: String,

        /// Output format requested from the router.
        #[arg(short, long, value_enum, default_value_t = CommandFormat::Text)]
        output: CommandFormat,

        /// Command to run, e.g. `show route summary`.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Print the running configuration.
    Show {
        /// Router to connect to.
        router: String,
    },
}

impl Commands {
    /// Returns the router the command targets.
    #[must_use]
    pub fn router(&self) -> &str {
        match self {
            Self::Check { router, .. }
            | Self::Apply { router, .. }
            | Self::Exec { router, .. }
            | Self::Show { router } => router,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_help_promises_no_commit() {
        let command = Cli::command();
        let about = command
            .find_subcommand("check")
            .and_then(|c| c.get_about())
            .map(ToString::to_string)
            .expect("about");
        assert!(about.contains("without committing"));
        assert!(!about.contains("roll"));
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "rcli", "check", "edge1", "edge1.conf", "-f", "edge1.diff", "--load-action", "replace",
        ])
        .expect("parse");

        match cli.command {
            Commands::Check {
                router,
                local_file,
                diff_file,
                load_action,
            } => {
                assert_eq!(router, "edge1");
                assert_eq!(local_file, PathBuf::from("edge1.conf"));
                assert_eq!(diff_file, Some(PathBuf::from("edge1.diff")));
                assert_eq!(load_action, LoadAction::Replace);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_apply_flags() {
        let cli = Cli::try_parse_from(["rcli", "-u", "netops", "apply", "edge1", "edge1.conf", "-y", "--commit"])
            .expect("parse");

        assert_eq!(cli.user.as_deref(), Some("netops"));
        assert_eq!(cli.command.router(), "edge1");
        assert!(matches!(
            cli.command,
            Commands::Apply {
                yes: true,
                commit: true,
                load_action: LoadAction::Override,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_exec_collects_words() {
        let cli = Cli::try_parse_from(["rcli", "exec", "edge1", "-o", "json", "show", "route", "summary"])
            .expect("parse");

        match cli.command {
            Commands::Exec { output, command, .. } => {
                assert_eq!(output, CommandFormat::Json);
                assert_eq!(command.join(" "), "show route summary");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_exec_requires_command() {
        assert!(Cli::try_parse_from(["rcli", "exec", "edge1"]).is_err());
    }
}

//! CLI module for the router deployment tool.
//!
//! This module provides the command-line interface for checking and
//! applying configurations on Junos routers.

mod commands;
mod output;
mod prompt;

pub use commands::{Cli, Commands};
pub use output::OutputFormatter;
pub use prompt::PromptApprover;

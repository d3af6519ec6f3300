//! Tool settings.
//!
//! This module defines the structure of the optional `rcli.yaml` settings
//! file. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::device::{DEFAULT_CONFIRM_TIMEOUT_MINUTES, DEFAULT_NETCONF_PORT, SshTarget};
use crate::render::{RenderOptions, SuppressionRules};
use crate::workflow::DEFAULT_CONFIRM_WAIT;

/// Settings for the router deployment tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Management user; falls back to `$USER`.
    pub user: Option<String>,
    /// NETCONF port.
    pub port: u16,
    /// Minutes before the device rolls back an unconfirmed commit.
    pub confirm_timeout_minutes: u32,
    /// Seconds to wait between commit-confirmed and the confirming commit.
    pub confirm_wait_secs: u64,
    /// SSH client binary.
    pub ssh_command: String,
    /// Extra options for the SSH client.
    pub ssh_options: Vec<String>,
    /// Colorize diffs and reports.
    pub color: bool,
    /// Diff sections replaced by an omission notice.
    pub suppressed_sections: SuppressionRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: None,
            port: DEFAULT_NETCONF_PORT,
            confirm_timeout_minutes: DEFAULT_CONFIRM_TIMEOUT_MINUTES,
            confirm_wait_secs: DEFAULT_CONFIRM_WAIT.as_secs(),
            ssh_command: String::from("ssh"),
            ssh_options: Vec::new(),
            color: true,
            suppressed_sections: SuppressionRules::default(),
        }
    }
}

impl Settings {
    /// Returns the wait before confirming.
    #[must_use]
    pub const fn confirm_wait(&self) -> Duration {
        Duration::from_secs(self.confirm_wait_secs)
    }

    /// Returns the renderer options.
    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions { color: self.color }
    }

    /// Builds the SSH target for a router.
    #[must_use]
    pub fn ssh_target(&self, host: &str, user: &str) -> SshTarget {
        SshTarget {
            host: host.to_string(),
            port: self.port,
            user: user.to_string(),
            ssh_command: self.ssh_command.clone(),
            ssh_options: self.ssh_options.clone(),
        }
    }
}

//! RPC requests understood by the device.

use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::{CommandFormat, ConfigDocument};

/// Default commit-confirmed timeout in minutes.
pub const DEFAULT_CONFIRM_TIMEOUT_MINUTES: u32 = 5;

/// How a loaded candidate is merged into the candidate database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoadAction {
    /// Replace the whole candidate configuration.
    #[default]
    Override,
    /// Replace only hierarchies tagged for replacement.
    Replace,
}

impl LoadAction {
    /// Value of the `action` attribute on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for LoadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single RPC sent to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcRequest {
    /// Fetch the running configuration as text.
    GetConfiguration,
    /// Compare the candidate against a rollback slot.
    CompareConfiguration {
        /// Rollback slot, 0 being the running configuration.
        rollback: u32,
    },
    /// Load a candidate configuration.
    LoadConfiguration {
        /// Merge semantics.
        action: LoadAction,
        /// The candidate.
        document: ConfigDocument,
    },
    /// Take the exclusive configuration lock.
    LockConfiguration,
    /// Release the configuration lock.
    UnlockConfiguration,
    /// Commit with automatic rollback unless confirmed in time.
    CommitConfirmed {
        /// Minutes before the device rolls back.
        timeout_minutes: u32,
    },
    /// Plain commit, also confirming a pending commit-confirmed.
    Commit,
    /// Run an operational command.
    Command {
        /// Command line as typed on the device CLI.
        command: String,
        /// Requested output format.
        format: CommandFormat,
    },
}

impl RpcRequest {
    /// Returns the RPC element name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetConfiguration | Self::CompareConfiguration { .. } => "get-configuration",
            Self::LoadConfiguration { .. } => "load-configuration",
            Self::LockConfiguration => "lock-configuration",
            Self::UnlockConfiguration => "unlock-configuration",
            Self::CommitConfirmed { .. } | Self::Commit => "commit-configuration",
            Self::Command { .. } => "command",
        }
    }

    /// Renders the request as the body of a NETCONF `<rpc>`.
    #[must_use]
    pub fn to_xml(&self) -> String {
        match self {
            Self::GetConfiguration => String::from(r#"<get-configuration format="text"/>"#),
            Self::CompareConfiguration { rollback } => format!(
                r#"<get-configuration compare="rollback" rollback="{rollback}" format="text"/>"#
            ),
            Self::LoadConfiguration { action, document } => format!(
                r#"<load-configuration action="{action}" format="{}">{}</load-configuration>"#,
                document.format(),
                document.to_wire()
            ),
            Self::LockConfiguration => String::from("<lock-configuration/>"),
            Self::UnlockConfiguration => String::from("<unlock-configuration/>"),
            Self::CommitConfirmed { timeout_minutes } => format!(
                "<commit-configuration><confirmed/><confirm-timeout>{timeout_minutes}</confirm-timeout></commit-configuration>"
            ),
            Self::Commit => String::from("<commit-configuration/>"),
            Self::Command { command, format } => format!(
                r#"<command format="{format}">{}</command>"#,
                escape(command.as_str())
            ),
        }
    }
}

impl fmt::Display for RpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommitConfirmed { timeout_minutes } => {
                write!(f, "{} (confirmed, {timeout_minutes} min)", self.name())
            }
            Self::CompareConfiguration { rollback } => {
                write!(f, "{} (compare rollback {rollback})", self.name())
            }
            Self::Command { command, .. } => write!(f, "{} ({command})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_request() {
        let xml = RpcRequest::CompareConfiguration { rollback: 0 }.to_xml();
        assert_eq!(
            xml,
            r#"<get-configuration compare="rollback" rollback="0" format="text"/>"#
        );
    }

    #[test]
    fn test_load_request_embeds_document() {
        let document = ConfigDocument::from_text("system { host-name foo; }", Some("21.4R3"));
        let xml = RpcRequest::LoadConfiguration {
            action: LoadAction::Replace,
            document,
        }
        .to_xml();
        assert!(xml.starts_with(r#"<load-configuration action="replace" format="text">"#));
        assert!(xml.contains("<configuration-text>version 21.4R3;\nsystem"));
        assert!(xml.ends_with("</configuration-text></load-configuration>"));
    }

    #[test]
    fn test_commit_confirmed_request() {
        let xml = RpcRequest::CommitConfirmed { timeout_minutes: 5 }.to_xml();
        assert!(xml.contains("<confirmed/>"));
        assert!(xml.contains("<confirm-timeout>5</confirm-timeout>"));
        assert_eq!(RpcRequest::Commit.to_xml(), "<commit-configuration/>");
    }

    #[test]
    fn test_command_request_escapes_text() {
        let xml = RpcRequest::Command {
            command: String::from("show route | match <foo>"),
            format: CommandFormat::Json,
        }
        .to_xml();
        assert_eq!(
            xml,
            r#"<command format="json">show route | match &lt;foo&gt;</command>"#
        );
    }

    #[test]
    fn test_request_names() {
        assert_eq!(RpcRequest::Commit.name(), "commit-configuration");
        assert_eq!(RpcRequest::LockConfiguration.name(), "lock-configuration");
        assert_eq!(LoadAction::default(), LoadAction::Override);
    }
}

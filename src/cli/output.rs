//! Output formatting for CLI commands.
//!
//! Reports go to stderr so that stdout carries only diffs, command output
//! and configurations.

use colored::Colorize;
use std::fmt::Write;

use crate::document::{DeviceVersion, DiffDocument};
use crate::workflow::ApplyOutcome;

/// Output formatter for CLI.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    /// Colorize markers.
    color: bool,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Formats the result of a `check` run.
    #[must_use]
    pub fn format_check(&self, router: &str, diff: &DiffDocument) -> String {
        if diff.is_empty() {
            return format!("{} {router}: no changes", self.ok_mark());
        }

        let (added, removed) = count_changes(diff);
        format!(
            "{} {router}: {added} line(s) added, {removed} line(s) removed (not committed)",
            self.warn_mark()
        )
    }

    /// Formats the result of an `apply` run.
    #[must_use]
    pub fn format_outcome(&self, router: &str, outcome: &ApplyOutcome) -> String {
        match outcome {
            ApplyOutcome::NoChanges => format!("{} {router}: no changes", self.ok_mark()),
            ApplyOutcome::Declined => {
                format!("{} {router}: apply cancelled, nothing committed", self.warn_mark())
            }
            ApplyOutcome::Confirmed {
                diff_fingerprint,
                committed_at,
                confirmed_at,
            } => {
                let mut output = format!("{} {router}: configuration committed\n", self.ok_mark());
                let short = diff_fingerprint.get(..12).unwrap_or(diff_fingerprint);
                let _ = writeln!(output, "   Diff:      {short}");
                let _ = writeln!(output, "   Committed: {}", committed_at.format("%Y-%m-%d %H:%M:%S UTC"));
                let _ = write!(output, "   Confirmed: {}", confirmed_at.format("%Y-%m-%d %H:%M:%S UTC"));
                output
            }
        }
    }

    /// Formats the device identity line.
    #[must_use]
    pub fn format_version(&self, router: &str, version: &DeviceVersion) -> String {
        let mut output = format!("{router}: Junos {}", version.version);
        if let Some(model) = &version.product_model {
            let _ = write!(output, " on {model}");
        }
        if let Some(host) = &version.host_name {
            let _ = write!(output, " ({host})");
        }
        output
    }

    fn ok_mark(&self) -> String {
        if self.color {
            "✓".green().to_string()
        } else {
            String::from("✓")
        }
    }

    fn warn_mark(&self) -> String {
        if self.color {
            "⚠".yellow().to_string()
        } else {
            String::from("⚠")
        }
    }
}

fn count_changes(diff: &DiffDocument) -> (usize, usize) {
    diff.body().lines().fold((0, 0), |(added, removed), line| {
        if line.starts_with('+') {
            (added + 1, removed)
        } else if line.starts_with('-') {
            (added, removed + 1)
        } else {
            (added, removed)
        }
    })
}

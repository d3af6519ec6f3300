//! Diff rendering with section suppression.
//!
//! Generated lists (prefix lists, AS-path groups) tend to dominate real
//! diffs. The renderer walks the diff line by line and replaces sections
//! whose path matches a suppression prefix with a single notice.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::document::DiffDocument;

/// Section path prefixes suppressed by default.
pub const DEFAULT_SUPPRESSED_SECTIONS: &[&str] = &[
    "edit policy-options as-path-group",
    "edit policy-options prefix-list",
];

/// Section path prefixes whose content is omitted from rendered diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuppressionRules {
    prefixes: Vec<String>,
}

impl Default for SuppressionRules {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSED_SECTIONS.iter().copied())
    }
}

impl SuppressionRules {
    /// Creates rules from a list of path prefixes.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates rules that suppress nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self { prefixes: Vec::new() }
    }

    /// Adds a path prefix.
    pub fn add(&mut self, prefix: impl Into<String>) {
        self.prefixes.push(prefix.into());
    }

    /// Returns true if a section with this path is suppressed.
    #[must_use]
    pub fn suppresses(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// Returns the configured prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI colors.
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Counts gathered while rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Lines added.
    pub added: usize,
    /// Lines removed.
    pub removed: usize,
    /// Sections shown.
    pub sections: usize,
    /// Sections replaced by an omission notice.
    pub omitted_sections: usize,
}

/// A rendered diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiff {
    /// Report text, one line per output line.
    pub text: String,
    /// Counts gathered while rendering.
    pub summary: RenderSummary,
}

/// Renders diff documents for the operator.
#[derive(Debug, Clone, Default)]
pub struct DiffRenderer {
    rules: SuppressionRules,
    options: RenderOptions,
}

#[derive(Clone, Copy)]
enum LineKind<'a> {
    Header(&'a str),
    Added,
    Removed,
    Context,
}

impl DiffRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(rules: SuppressionRules, options: RenderOptions) -> Self {
        Self { rules, options }
    }

    /// Returns the suppression rules.
    #[must_use]
    pub const fn rules(&self) -> &SuppressionRules {
        &self.rules
    }

    /// Renders a diff document.
    #[must_use]
    pub fn render(&self, diff: &DiffDocument) -> RenderedDiff {
        self.render_body(diff.body())
    }

    /// Renders a raw diff body.
    #[must_use]
    pub fn render_body(&self, body: &str) -> RenderedDiff {
        let mut text = String::new();
        let mut summary = RenderSummary::default();
        let mut suppressing = false;

        for line in body.lines() {
            let kind = classify(line);

            if let LineKind::Header(path) = kind {
                suppressing = self.rules.suppresses(path);
                if suppressing {
                    summary.omitted_sections += 1;
                    let notice = format!("[omitting {path}]");
                    let _ = writeln!(text, "{}", self.paint(&notice, |s| s.yellow()));
                } else {
                    summary.sections += 1;
                    let _ = writeln!(text, "{}", self.paint(line, |s| s.purple()));
                }
                continue;
            }

            if suppressing {
                continue;
            }

            match kind {
                LineKind::Added => {
                    summary.added += 1;
                    let _ = writeln!(text, "{}", self.paint(line, |s| s.green()));
                }
                LineKind::Removed => {
                    summary.removed += 1;
                    let _ = writeln!(text, "{}", self.paint(line, |s| s.red()));
                }
                LineKind::Context | LineKind::Header(_) => {
                    let _ = writeln!(text, "{line}");
                }
            }
        }

        RenderedDiff { text, summary }
    }

    fn paint(&self, line: &str, style: impl Fn(&str) -> colored::ColoredString) -> String {
        if self.options.color {
            style(line).to_string()
        } else {
            line.to_string()
        }
    }
}

fn classify(line: &str) -> LineKind<'_> {
    if let Some(path) = section_path(line) {
        LineKind::Header(path)
    } else if line.starts_with('+') {
        LineKind::Added
    } else if line.starts_with('-') {
        LineKind::Removed
    } else {
        LineKind::Context
    }
}

/// Returns the path of a `[edit ...]` section header line.
fn section_path(line: &str) -> Option<&str> {
    let path = line.trim_end().strip_prefix('[')?.strip_suffix(']')?;
    path.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
        .then_some(path)
}

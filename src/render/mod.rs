//! Rendering module for configuration diffs.

mod diff;

pub use diff::{
    DEFAULT_SUPPRESSED_SECTIONS, DiffRenderer, RenderOptions, RenderSummary, RenderedDiff,
    SuppressionRules,
};

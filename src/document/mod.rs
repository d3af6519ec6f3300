//! Configuration and diff documents.
//!
//! This module holds the data exchanged with the device:
//! - Candidate configuration payloads and their wire envelope
//! - Configuration diffs returned by compare queries
//! - Parsers for load results, versions and command output

mod config;
mod diff;
pub mod reply;
pub mod xml;

pub use config::{ConfigDocument, ConfigFormat, ConfigSource};
pub use diff::DiffDocument;
pub use reply::{CommandFormat, DeviceVersion};

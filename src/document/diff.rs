//! Configuration diff documents.
//!
//! A [`DiffDocument`] holds the device's comparison of the candidate against
//! the running configuration, as returned by a rollback-0 compare query.

use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::error::{ParseError, ParseStage, Result};

use super::config::ConfigFormat;
use super::xml::XmlElement;

/// A configuration diff returned by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffDocument {
    format: ConfigFormat,
    body: String,
}

impl DiffDocument {
    /// Creates a diff document from a raw diff body.
    ///
    /// Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(body: &str) -> Self {
        Self {
            format: ConfigFormat::Text,
            body: body.trim().to_string(),
        }
    }

    /// Parses a `<configuration-information>` reply.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the envelope is malformed or lacks the
    /// `<configuration-output>` element.
    pub fn parse(reply: &str) -> std::result::Result<Self, ParseError> {
        let root = XmlElement::parse(reply, ParseStage::Diff)?;
        if root.name != "configuration-information" {
            return Err(ParseError::new(
                ParseStage::Diff,
                format!("expected <configuration-information>, found <{}>", root.name),
            ));
        }

        let output = root.require("configuration-output", ParseStage::Diff)?;
        Ok(Self::new(&output.text))
    }

    /// Returns the diff format.
    #[must_use]
    pub const fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Returns the trimmed diff body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns true if the candidate equals the running configuration.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Returns the SHA-256 digest of the body as hex.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.body.as_bytes()))
    }

    /// Writes the diff body verbatim to a file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Writing diff to {}", path.display());
        std::fs::write(path, &self.body)?;
        Ok(())
    }
}

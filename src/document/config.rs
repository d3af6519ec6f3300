//! Candidate configuration documents.
//!
//! A [`ConfigDocument`] is the payload of a load request: the operator's
//! local configuration text, stamped with the device's software version and
//! escaped so it can be embedded in the request envelope.

use quick_xml::escape::partial_escape;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Format of a configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// Curly-brace configuration text.
    #[default]
    Text,
}

impl ConfigFormat {
    /// Value of the `format` attribute on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }

    /// Element that carries a payload of this format.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Self::Text => "configuration-text",
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the candidate configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A local file.
    File(PathBuf),
    /// Inline configuration text.
    Text(String),
}

impl ConfigSource {
    /// Reads the raw configuration text.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read.
    pub fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                debug!("Reading local configuration from {}", path.display());
                Ok(std::fs::read_to_string(path)?)
            }
            Self::Text(text) => Ok(text.clone()),
        }
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Text(_) => f.write_str("<inline configuration>"),
        }
    }
}

/// A candidate configuration ready to be loaded onto a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    format: ConfigFormat,
    payload: String,
    declared_version: Option<String>,
}

impl ConfigDocument {
    /// Builds a document from configuration text.
    ///
    /// When a version is given, a `version <v>;` line is prepended. Markup
    /// characters are escaped so the payload never contains a raw `<` or `>`.
    #[must_use]
    pub fn from_text(text: &str, version: Option<&str>) -> Self {
        let raw = version.map_or_else(
            || text.to_string(),
            |v| format!("version {v};\n{text}"),
        );

        Self {
            format: ConfigFormat::Text,
            payload: partial_escape(raw.as_str()).into_owned(),
            declared_version: version.map(String::from),
        }
    }

    /// Builds a document from a configuration source.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the source cannot be read.
    pub fn from_source(source: &ConfigSource, version: Option<&str>) -> Result<Self> {
        let text = source.read()?;
        Ok(Self::from_text(&text, version))
    }

    /// Returns the payload format.
    #[must_use]
    pub const fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Returns the escaped payload.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the version stamped into the payload, if any.
    #[must_use]
    pub fn declared_version(&self) -> Option<&str> {
        self.declared_version.as_deref()
    }

    /// Serializes the document as the body of a load request.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let element = self.format.element();
        format!("<{element}>{}</{element}>", self.payload)
    }

    /// Returns the SHA-256 digest of the payload as hex.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

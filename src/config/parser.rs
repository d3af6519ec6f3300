//! Settings parser for loading and layering settings.
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! settings file, and `RCLI_*` environment variables (optionally provided
//! through a `.env` file).

use crate::error::{ConfigError, RcliError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::settings::Settings;

/// Default settings file names to search for.
pub const DEFAULT_SETTINGS_FILES: &[&str] = &["rcli.yaml", "rcli.yml", ".rcli.yaml"];

/// Settings parser.
#[derive(Debug, Default)]
pub struct SettingsParser {
    /// Base path for `.env` and settings file discovery.
    base_path: Option<PathBuf>,
}

impl SettingsParser {
    /// Creates a new settings parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for `.env` and settings file discovery.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());

        if !path.exists() {
            return Err(RcliError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            RcliError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<Settings> {
        debug!("Parsing YAML settings");

        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            RcliError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location: source.map(|p| p.display().to_string()),
            })
        })
    }

    /// Loads layered settings.
    ///
    /// An explicit path must exist. Without one, the first settings file
    /// found by [`find_settings_file`] is used, or the defaults if there is
    /// none. Environment overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed, or an
    /// override has an invalid value.
    pub fn load_with_env(&self, path: Option<&Path>) -> Result<Settings> {
        let discovered = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_settings_file(self.base_dir()),
        };

        let mut settings = match discovered {
            Some(p) => self.load_file(p)?,
            None => {
                debug!("No settings file found, using defaults");
                Settings::default()
            }
        };

        Self::apply_overrides(&mut settings, |name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Applies `RCLI_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse.
    pub fn apply_overrides(
        settings: &mut Settings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(user) = lookup("RCLI_USER") {
            debug!("Overriding user from environment");
            settings.user = Some(user);
        }

        if let Some(port) = lookup("RCLI_PORT") {
            debug!("Overriding port from environment");
            settings.port = parse_env("RCLI_PORT", &port)?;
        }

        if let Some(timeout) = lookup("RCLI_CONFIRM_TIMEOUT_MINUTES") {
            debug!("Overriding confirm_timeout_minutes from environment");
            settings.confirm_timeout_minutes = parse_env("RCLI_CONFIRM_TIMEOUT_MINUTES", &timeout)?;
        }

        if let Some(wait) = lookup("RCLI_CONFIRM_WAIT_SECS") {
            debug!("Overriding confirm_wait_secs from environment");
            settings.confirm_wait_secs = parse_env("RCLI_CONFIRM_WAIT_SECS", &wait)?;
        }

        if let Some(command) = lookup("RCLI_SSH_COMMAND") {
            debug!("Overriding ssh_command from environment");
            settings.ssh_command = command;
        }

        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            debug!("NO_COLOR is set, disabling colors");
            settings.color = false;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self.base_dir().join(".env");

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                RcliError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    fn base_dir(&self) -> PathBuf {
        self.base_path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RcliError::Config(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
        })
    })
}

/// Finds a settings file.
///
/// Looks in `start_dir` and its parents, then in the user's configuration
/// directory (`<config dir>/rcli/config.yaml`).
#[must_use]
pub fn find_settings_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut current = start_dir.as_ref().to_path_buf();

    loop {
        for filename in DEFAULT_SETTINGS_FILES {
            let candidate = current.join(filename);
            if candidate.is_file() {
                info!("Found settings file: {}", candidate.display());
                return Some(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("rcli").join("config.yaml"))
        .filter(|p| p.is_file())
}

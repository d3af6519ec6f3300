//! Settings module for the router deployment tool.
//!
//! This module handles all settings-related functionality:
//! - Parsing and deserializing `rcli.yaml`
//! - Layering `.env` and `RCLI_*` environment overrides
//! - Validation of settings values

mod parser;
mod settings;
mod validator;

pub use parser::{DEFAULT_SETTINGS_FILES, SettingsParser, find_settings_file};
pub use settings::Settings;
pub use validator::{SettingsValidator, ValidationError, ValidationResult};

use crate::error::{ConfigError, Result};

/// Resolves the management user.
///
/// The command-line value wins over the settings file, which wins over the
/// login name in `$USER`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingUser`] if no source yields a non-empty name.
pub fn resolve_user(
    cli_user: Option<&str>,
    settings: &Settings,
    env_user: Option<&str>,
) -> Result<String> {
    [cli_user, settings.user.as_deref(), env_user]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingUser.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_precedence() {
        let settings = Settings {
            user: Some(String::from("from-file")),
            ..Settings::default()
        };
        assert_eq!(
            resolve_user(Some("cli"), &settings, Some("login")).expect("user"),
            "cli"
        );
        assert_eq!(
            resolve_user(None, &settings, Some("login")).expect("user"),
            "from-file"
        );
        assert_eq!(
            resolve_user(Some(""), &Settings::default(), Some("login")).expect("user"),
            "login"
        );
    }

    #[test]
    fn test_resolve_user_missing() {
        assert!(resolve_user(None, &Settings::default(), None).is_err());
    }
}

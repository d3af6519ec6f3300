//! Settings validation.
//!
//! Checks settings for values that would make a deployment unsafe or
//! impossible before any session is opened.

use crate::error::{ConfigError, RcliError, Result};
use tracing::debug;

use super::settings::Settings;

/// Longest commit-confirmed timeout the device accepts, in minutes.
const MAX_CONFIRM_TIMEOUT_MINUTES: u32 = 65_535;

/// Validator for settings.
#[derive(Debug, Default)]
pub struct SettingsValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ValidationResult {
    /// Returns true if there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }
}

impl SettingsValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates settings.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any check fails.
    pub fn validate(&self, settings: &Settings) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_connection(settings, &mut result);
        Self::validate_confirm(settings, &mut result);
        Self::validate_suppression(settings, &mut result);

        if let Some(first_error) = result.errors.first() {
            return Err(RcliError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }));
        }

        debug!("Settings validation passed");
        Ok(result)
    }

    fn validate_connection(settings: &Settings, result: &mut ValidationResult) {
        if settings.port == 0 {
            result.error("port", "Port cannot be 0");
        }

        if settings.ssh_command.trim().is_empty() {
            result.error("ssh_command", "SSH command cannot be empty");
        }

        if settings.user.as_ref().is_some_and(|u| u.trim().is_empty()) {
            result.error("user", "User cannot be empty");
        }
    }

    fn validate_confirm(settings: &Settings, result: &mut ValidationResult) {
        let timeout = settings.confirm_timeout_minutes;
        if timeout == 0 {
            result.error("confirm_timeout_minutes", "Confirm timeout must be at least 1 minute");
            return;
        }
        if timeout > MAX_CONFIRM_TIMEOUT_MINUTES {
            result.error(
                "confirm_timeout_minutes",
                format!("Confirm timeout cannot exceed {MAX_CONFIRM_TIMEOUT_MINUTES} minutes"),
            );
        }

        let timeout_secs = u64::from(timeout) * 60;
        if settings.confirm_wait_secs >= timeout_secs {
            result.error(
                "confirm_wait_secs",
                format!(
                    "Wait before confirming ({}s) must be shorter than the confirm timeout ({timeout} min)",
                    settings.confirm_wait_secs
                ),
            );
        } else if timeout_secs - settings.confirm_wait_secs < 30 {
            result.warnings.push(format!(
                "Only {}s remain between confirming and the automatic rollback",
                timeout_secs - settings.confirm_wait_secs
            ));
        }
    }

    fn validate_suppression(settings: &Settings, result: &mut ValidationResult) {
        if settings
            .suppressed_sections
            .prefixes()
            .iter()
            .any(|p| p.trim().is_empty())
        {
            result.error(
                "suppressed_sections",
                "Empty suppression prefix would hide every section",
            );
        }
    }
}

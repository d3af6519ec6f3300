//! The `check` and `apply` workflows.
//!
//! Both run entirely under the configuration lock. `check` stops after the
//! diff; `apply` goes on to commit-confirmed, waits, and confirms.

use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::device::{DEFAULT_CONFIRM_TIMEOUT_MINUTES, DeviceSession, LoadAction};
use crate::document::{ConfigSource, DiffDocument};
use crate::error::{ConfigError, Result};
use crate::render::DiffRenderer;

use super::engine::DeploymentEngine;

/// Default wait between commit-confirmed and the confirming commit.
pub const DEFAULT_CONFIRM_WAIT: Duration = Duration::from_secs(180);

/// Decides whether a rendered diff may be committed.
pub trait Approver {
    /// Returns true if the change may go ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision could not be obtained.
    fn approve(&self, router: &str, diff: &DiffDocument) -> Result<bool>;
}

/// Approves every change, for unattended runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _router: &str, _diff: &DiffDocument) -> Result<bool> {
        debug!("--yes was used, skipping interactive confirmation dialog");
        Ok(true)
    }
}

/// Options for the `check` and `apply` workflows.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Router name shown to the operator.
    pub router: String,
    /// Merge semantics for the candidate.
    pub load_action: LoadAction,
    /// Minutes before the device rolls back an unconfirmed commit.
    pub confirm_timeout_minutes: u32,
    /// Time to wait before confirming.
    pub confirm_wait: Duration,
    /// Confirm immediately instead of waiting.
    pub skip_wait: bool,
    /// Where to write the raw diff, if anywhere.
    pub diff_file: Option<PathBuf>,
}

impl ApplyOptions {
    /// Creates options with defaults for the given router.
    #[must_use]
    pub fn new(router: impl Into<String>) -> Self {
        Self {
            router: router.into(),
            load_action: LoadAction::default(),
            confirm_timeout_minutes: DEFAULT_CONFIRM_TIMEOUT_MINUTES,
            confirm_wait: DEFAULT_CONFIRM_WAIT,
            skip_wait: false,
            diff_file: None,
        }
    }

    /// Sets the load action.
    #[must_use]
    pub const fn with_load_action(mut self, load_action: LoadAction) -> Self {
        self.load_action = load_action;
        self
    }

    /// Sets the commit-confirmed timeout and the wait before confirming.
    #[must_use]
    pub const fn with_confirm(mut self, timeout_minutes: u32, wait: Duration) -> Self {
        self.confirm_timeout_minutes = timeout_minutes;
        self.confirm_wait = wait;
        self
    }

    /// Sets whether to confirm without waiting.
    #[must_use]
    pub const fn with_skip_wait(mut self, skip_wait: bool) -> Self {
        self.skip_wait = skip_wait;
        self
    }

    /// Sets the diff output file.
    #[must_use]
    pub fn with_diff_file(mut self, diff_file: Option<PathBuf>) -> Self {
        self.diff_file = diff_file;
        self
    }

    fn validate(&self) -> Result<()> {
        let timeout = Duration::from_secs(u64::from(self.confirm_timeout_minutes) * 60);
        if self.confirm_timeout_minutes == 0 {
            return Err(ConfigError::validation(
                "confirm timeout must be at least one minute",
                "confirm_timeout_minutes",
            )
            .into());
        }
        if !self.skip_wait && self.confirm_wait >= timeout {
            return Err(ConfigError::validation(
                format!(
                    "wait before confirming ({}s) must be shorter than the confirm timeout ({} min)",
                    self.confirm_wait.as_secs(),
                    self.confirm_timeout_minutes
                ),
                "confirm_wait_secs",
            )
            .into());
        }
        Ok(())
    }
}

/// How an `apply` run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The candidate equals the running configuration.
    NoChanges,
    /// The operator declined the change.
    Declined,
    /// The change was committed and confirmed.
    Confirmed {
        /// Fingerprint of the diff that was committed.
        diff_fingerprint: String,
        /// When the commit-confirmed was accepted.
        committed_at: DateTime<Utc>,
        /// When the confirming commit was accepted.
        confirmed_at: DateTime<Utc>,
    },
}

/// Runs `check` and `apply` on top of a deployment engine.
#[derive(Debug)]
pub struct ApplyWorkflow<'a, S: DeviceSession> {
    /// Deployment engine.
    engine: &'a DeploymentEngine<S>,
    /// Diff renderer.
    renderer: &'a DiffRenderer,
    /// Workflow options.
    options: ApplyOptions,
}

impl<'a, S: DeviceSession> ApplyWorkflow<'a, S> {
    /// Creates a workflow.
    #[must_use]
    pub const fn new(
        engine: &'a DeploymentEngine<S>,
        renderer: &'a DiffRenderer,
        options: ApplyOptions,
    ) -> Self {
        Self {
            engine,
            renderer,
            options,
        }
    }

    /// Loads the candidate, shows the diff, and unlocks without committing.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails, including the unlock.
    pub async fn check(&self, source: &ConfigSource, out: &mut dyn Write) -> Result<DiffDocument> {
        self.engine
            .run_locked(async {
                let diff = self.load_and_show(source, out).await?;
                if diff.is_empty() {
                    warn!("No changes found");
                }
                Ok(diff)
            })
            .await
    }

    /// Loads the candidate and, once approved, commits it with a
    /// confirmation timeout and confirms after the wait.
    ///
    /// If anything fails after the commit-confirmed was sent, the confirming
    /// commit is never sent and the device rolls back on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails, including the unlock. A declined
    /// change is not an error.
    pub async fn apply(
        &self,
        source: &ConfigSource,
        approver: &dyn Approver,
        out: &mut dyn Write,
    ) -> Result<ApplyOutcome> {
        self.options.validate()?;

        self.engine
            .run_locked(async {
                let diff = self.load_and_show(source, out).await?;
                if diff.is_empty() {
                    warn!("No changes found");
                    return Ok(ApplyOutcome::NoChanges);
                }

                if !approver.approve(&self.options.router, &diff)? {
                    self.engine.abort();
                    return Ok(ApplyOutcome::Declined);
                }

                self.commit_and_confirm(&diff).await
            })
            .await
    }

    async fn load_and_show(&self, source: &ConfigSource, out: &mut dyn Write) -> Result<DiffDocument> {
        debug!("Using local configuration {source}");
        let diff = self
            .engine
            .load_and_diff(source, self.options.load_action)
            .await?;

        if let Some(path) = &self.options.diff_file {
            diff.write_to_file(path)?;
        }

        if !diff.is_empty() {
            let rendered = self.renderer.render(&diff);
            out.write_all(rendered.text.as_bytes())?;
            out.flush()?;
            debug!(
                "Diff: {} added, {} removed, {} sections omitted",
                rendered.summary.added, rendered.summary.removed, rendered.summary.omitted_sections
            );
        }

        Ok(diff)
    }

    async fn commit_and_confirm(&self, diff: &DiffDocument) -> Result<ApplyOutcome> {
        self.engine
            .commit_confirmed(self.options.confirm_timeout_minutes)
            .await?;
        let committed_at = Utc::now();

        if self.options.skip_wait {
            debug!("--commit was used, skipping waiting period");
        } else {
            info!(
                "Waiting {} seconds before confirming configuration...",
                self.options.confirm_wait.as_secs()
            );
            tokio::time::sleep(self.options.confirm_wait).await;
        }

        self.engine.confirm().await?;

        Ok(ApplyOutcome::Confirmed {
            diff_fingerprint: diff.fingerprint(),
            committed_at,
            confirmed_at: Utc::now(),
        })
    }
}

//! Deployment engine.
//!
//! The engine sequences the RPCs that land a configuration change and owns
//! the configuration lock. Every operation is a single awaited request; no
//! operation is retried.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

use crate::device::{DeviceSession, LoadAction, RpcRequest};
use crate::document::reply::{
    parse_command_output, parse_commit_result, parse_configuration, parse_load_result,
    parse_version,
};
use crate::document::{CommandFormat, ConfigDocument, ConfigSource, DeviceVersion, DiffDocument};
use crate::error::{RcliError, Result, SessionError};

use super::state::SessionState;

/// Drives a device session through a deployment.
#[derive(Debug)]
pub struct DeploymentEngine<S: DeviceSession> {
    /// Device session.
    session: S,
    /// Deployment progress.
    state: Mutex<SessionState>,
}

impl<S: DeviceSession> DeploymentEngine<S> {
    /// Creates an engine on top of an open session.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            session,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Returns the underlying session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns a snapshot of the deployment state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *state);
    }

    /// Runs `action` while holding the configuration lock.
    ///
    /// The lock is released exactly once after `action` finishes, whether it
    /// succeeds, fails or panics. If the lock cannot be taken, `action` is
    /// never polled and no unlock is sent.
    ///
    /// # Errors
    ///
    /// Returns the lock failure, the action's failure, the unlock failure,
    /// or [`RcliError::LockReleaseFailed`] carrying both of the latter.
    pub async fn run_locked<T, F>(&self, action: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.lock().await?;

        let outcome = AssertUnwindSafe(action).catch_unwind().await;
        let unlocked = self.unlock().await;

        match outcome {
            Ok(result) => merge_unlock(result, unlocked),
            Err(panic) => {
                if let Err(e) = unlocked {
                    error!("Failed to unlock configuration after panic: {e}");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn lock(&self) -> Result<()> {
        if self.state().locked {
            return Err(RcliError::internal("configuration lock is already held"));
        }

        info!("Locking configuration");
        match self.session.execute(&RpcRequest::LockConfiguration).await {
            Ok(_) => {
                self.update(SessionState::on_lock);
                Ok(())
            }
            Err(RcliError::Rpc(rpc)) => Err(SessionError::LockConflict {
                message: rpc.message,
            }
            .into()),
            Err(e) => Err(e),
        }
    }

    async fn unlock(&self) -> Result<()> {
        info!("Unlocking configuration");
        let result = self.session.execute(&RpcRequest::UnlockConfiguration).await;
        self.update(SessionState::on_unlock);

        if self.state().rollback_pending() {
            warn!("Commit was not confirmed, the device will roll back on its own");
        }
        result.map(|_| ())
    }

    /// Queries the device's software version.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the reply lacks a version.
    pub async fn device_version(&self) -> Result<DeviceVersion> {
        let reply = self.execute_raw("show version", CommandFormat::Json).await?;
        let version = parse_version(&reply)?;
        debug!(
            "Device runs {} ({})",
            version.version,
            version.product_model.as_deref().unwrap_or("unknown model")
        );
        Ok(version)
    }

    /// Fetches the running configuration as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply is malformed.
    pub async fn running_configuration(&self) -> Result<String> {
        let reply = self.session.execute(&RpcRequest::GetConfiguration).await?;
        Ok(parse_configuration(&reply)?)
    }

    /// Loads the local configuration as candidate and diffs it.
    ///
    /// The candidate is stamped with the device's version, loaded with
    /// `action`, and compared against the running configuration.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; nothing is retried.
    pub async fn load_and_diff(
        &self,
        source: &ConfigSource,
        action: LoadAction,
    ) -> Result<DiffDocument> {
        let version = self.device_version().await?;
        let document = ConfigDocument::from_source(source, Some(&version.version))?;

        info!("Loading configuration onto router as candidate configuration");
        info!("Using action={action}");
        debug!("Candidate fingerprint {}", document.fingerprint());

        let reply = self
            .session
            .execute(&RpcRequest::LoadConfiguration { action, document })
            .await?;
        parse_load_result(&reply)?;
        self.update(SessionState::on_load);

        info!("Diffing candidate configuration against running configuration");
        let reply = self
            .session
            .execute(&RpcRequest::CompareConfiguration { rollback: 0 })
            .await?;
        let diff = DiffDocument::parse(&reply)?;
        self.update(SessionState::on_diff);

        Ok(diff)
    }

    /// Commits the candidate with automatic rollback after `timeout_minutes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the commit.
    pub async fn commit_confirmed(&self, timeout_minutes: u32) -> Result<()> {
        info!("Committing candidate configuration, needs to be confirmed within {timeout_minutes} minutes");
        let reply = self
            .session
            .execute(&RpcRequest::CommitConfirmed { timeout_minutes })
            .await?;
        parse_commit_result(&reply)?;
        self.update(SessionState::on_commit_confirmed);
        Ok(())
    }

    /// Confirms a pending commit-confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the device rejects the commit.
    pub async fn confirm(&self) -> Result<()> {
        info!("Confirming configuration");
        let reply = self.session.execute(&RpcRequest::Commit).await?;
        parse_commit_result(&reply)?;
        self.update(SessionState::on_confirm);
        Ok(())
    }

    /// Records that the operator declined the change.
    pub fn abort(&self) {
        info!("Change declined, leaving running configuration untouched");
        self.update(SessionState::on_abort);
    }

    /// Runs an operational command and returns its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or text output is malformed.
    pub async fn execute_ad_hoc(&self, command: &str, format: CommandFormat) -> Result<String> {
        info!("Executing {command}");
        self.execute_raw(command, format).await
    }

    async fn execute_raw(&self, command: &str, format: CommandFormat) -> Result<String> {
        let reply = self
            .session
            .execute(&RpcRequest::Command {
                command: command.to_string(),
                format,
            })
            .await?;
        Ok(parse_command_output(&reply, format)?)
    }
}

fn merge_unlock<T>(result: Result<T>, unlocked: Result<()>) -> Result<T> {
    match (result, unlocked) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(unlock)) => Err(unlock),
        (Err(action), Ok(())) => Err(action),
        (Err(action), Err(unlock)) => Err(RcliError::LockReleaseFailed {
            action: Box::new(action),
            unlock: Box::new(unlock),
        }),
    }
}

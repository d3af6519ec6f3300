//! Deployment session state.
//!
//! Tracks where a single `check` or `apply` invocation is in the lock,
//! load, diff, commit, confirm, unlock sequence.

use std::fmt;

/// Phase of a deployment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentPhase {
    /// Nothing has been sent yet.
    #[default]
    Idle,
    /// The configuration lock is held.
    Locked,
    /// A candidate has been loaded.
    Loaded,
    /// The candidate has been compared with the running configuration.
    Diffed,
    /// The operator declined the change.
    Aborted,
    /// A commit-confirmed is waiting for its confirmation.
    CommitPending,
    /// The commit has been confirmed.
    Confirmed,
    /// The lock has been released.
    Unlocked,
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Locked => "locked",
            Self::Loaded => "loaded",
            Self::Diffed => "diffed",
            Self::Aborted => "aborted",
            Self::CommitPending => "commit pending",
            Self::Confirmed => "confirmed",
            Self::Unlocked => "unlocked",
        };
        write!(f, "{s}")
    }
}

/// Snapshot of a deployment session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    /// Current phase.
    pub phase: DeploymentPhase,
    /// The configuration lock is held.
    pub locked: bool,
    /// A candidate has been loaded.
    pub loaded: bool,
    /// A commit-confirmed was sent and not yet confirmed.
    pub committed_unconfirmed: bool,
}

impl SessionState {
    pub(crate) const fn on_lock(&mut self) {
        self.locked = true;
        self.phase = DeploymentPhase::Locked;
    }

    pub(crate) const fn on_load(&mut self) {
        self.loaded = true;
        self.phase = DeploymentPhase::Loaded;
    }

    pub(crate) const fn on_diff(&mut self) {
        self.phase = DeploymentPhase::Diffed;
    }

    pub(crate) const fn on_abort(&mut self) {
        self.phase = DeploymentPhase::Aborted;
    }

    pub(crate) const fn on_commit_confirmed(&mut self) {
        self.committed_unconfirmed = true;
        self.phase = DeploymentPhase::CommitPending;
    }

    pub(crate) const fn on_confirm(&mut self) {
        self.committed_unconfirmed = false;
        self.phase = DeploymentPhase::Confirmed;
    }

    pub(crate) const fn on_unlock(&mut self) {
        self.locked = false;
        self.phase = DeploymentPhase::Unlocked;
    }

    /// Returns true if the device will roll back on its own.
    ///
    /// This is the case once the lock is gone while a commit-confirmed is
    /// still unconfirmed.
    #[must_use]
    pub const fn rollback_pending(&self) -> bool {
        !self.locked && self.committed_unconfirmed
    }
}

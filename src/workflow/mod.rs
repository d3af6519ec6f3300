//! Deployment workflow module.
//!
//! This module holds the engine that sequences lock, load, diff, commit and
//! confirm requests, and the `check` and `apply` workflows built on it.

mod apply;
mod engine;
mod state;

pub use apply::{
    ApplyOptions, ApplyOutcome, ApplyWorkflow, Approver, AutoApprove, DEFAULT_CONFIRM_WAIT,
};
pub use engine::DeploymentEngine;
pub use state::{DeploymentPhase, SessionState};

// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Router CLI
//!
//! Safe configuration deployment for Junos routers over NETCONF.
//!
//! ## Overview
//!
//! `rcli` pushes a locally maintained configuration file to a router:
//!
//! - Lock the candidate configuration
//! - Load the local file as candidate, stamped with the device's version
//! - Show a colored, filtered diff against the running configuration
//! - Commit with an automatic-rollback timeout, wait, then confirm
//! - Always release the lock, whatever happened in between
//!
//! ## Architecture
//!
//! Every change runs inside a **locked scope**:
//!
//! 1. **Lock**: taken before the first load
//! 2. **Action**: load, diff and optionally commit
//! 3. **Unlock**: sent exactly once, on success, failure or panic
//!
//! An unconfirmed commit is never confirmed after a failure, so the device
//! rolls back on its own when the timeout expires.
//!
//! ## Modules
//!
//! - [`config`]: Tool settings, environment overrides and validation
//! - [`device`]: RPC requests and the NETCONF session seam
//! - [`document`]: Configuration, diff and reply documents
//! - [`render`]: Diff rendering with section suppression
//! - [`workflow`]: Locked deployment engine and the check/apply workflows
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! # rcli.yaml
//! user: netops
//! confirm_timeout_minutes: 5
//! confirm_wait_secs: 180
//! suppressed_sections:
//!   - edit policy-options prefix-list
//!   - edit policy-options as-path-group
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod device;
pub mod document;
pub mod error;
pub mod render;
pub mod workflow;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter, PromptApprover};
pub use config::{Settings, SettingsParser, SettingsValidator};
pub use device::{DeviceSession, LoadAction, RpcRequest, SshNetconfSession, SshTarget};
pub use document::{CommandFormat, ConfigDocument, ConfigSource, DiffDocument};
pub use error::{RcliError, Result};
pub use render::{DiffRenderer, RenderOptions, SuppressionRules};
pub use workflow::{ApplyOptions, ApplyOutcome, ApplyWorkflow, Approver, DeploymentEngine};

//! Device session module.
//!
//! This module provides the narrow interface the workflow uses to talk to a
//! router, the typed RPC requests, and an SSH-backed NETCONF session.

mod request;
mod session;
mod ssh;

pub use request::{DEFAULT_CONFIRM_TIMEOUT_MINUTES, LoadAction, RpcRequest};
pub use session::DeviceSession;
pub use ssh::{DEFAULT_NETCONF_PORT, SshNetconfSession, SshTarget};

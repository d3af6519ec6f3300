//! Device session trait definition.
//!
//! This module defines the interface the deployment workflow needs from a
//! management session: send one request, get the reply body back.

use async_trait::async_trait;

use crate::error::Result;

use super::request::RpcRequest;

/// Trait for device management sessions.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Executes one request and returns the reply body.
    ///
    /// The body is the content of the `rpc-reply` envelope. A reply that
    /// carries an `rpc-error` of severity `error` is returned as
    /// [`RcliError::Rpc`](crate::error::RcliError::Rpc).
    async fn execute(&self, request: &RpcRequest) -> Result<String>;

    /// Closes the session.
    ///
    /// A device drops any lock held by a closed session.
    async fn close(&self) -> Result<()>;

    /// Gets the address of the device this session talks to.
    fn target(&self) -> &str;
}

#[async_trait]
impl DeviceSession for Box<dyn DeviceSession> {
    async fn execute(&self, request: &RpcRequest) -> Result<String> {
        (**self).execute(request).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }

    fn target(&self) -> &str {
        (**self).target()
    }
}

//! NETCONF session over the system SSH client.
//!
//! Authentication, host keys and agent forwarding are left to `ssh` itself;
//! the session starts the `netconf` subsystem and exchanges messages
//! delimited by the NETCONF 1.0 end-of-message marker.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::document::reply::unwrap_rpc_reply;
use crate::error::{RcliError, Result, SessionError};

use super::request::RpcRequest;
use super::session::DeviceSession;

/// Default NETCONF-over-SSH port.
pub const DEFAULT_NETCONF_PORT: u16 = 830;

const NETCONF_BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";
const END_OF_MESSAGE: &[u8] = b"]]>]]>";

/// Connection parameters for an SSH NETCONF session.
#[derive(Debug, Clone)]
pub struct SshTarget {
    /// Router host name or address.
    pub host: String,
    /// NETCONF port.
    pub port: u16,
    /// Management user.
    pub user: String,
    /// SSH client binary.
    pub ssh_command: String,
    /// Extra options passed to the SSH client.
    pub ssh_options: Vec<String>,
}

impl SshTarget {
    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A NETCONF session running over an `ssh -s netconf` child process.
#[derive(Debug)]
pub struct SshNetconfSession {
    address: String,
    channel: Mutex<Option<Channel>>,
}

#[derive(Debug)]
struct Channel {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl SshNetconfSession {
    /// Opens a session and exchanges NETCONF hellos.
    ///
    /// # Errors
    ///
    /// Returns a connect error if the SSH client cannot be started or the
    /// device does not answer with a NETCONF hello.
    pub async fn connect(target: &SshTarget) -> Result<Self> {
        let address = target.address();
        info!("Creating NETCONF session with {address} as {}", target.user);

        let connect_failed = |message: String| {
            RcliError::Session(SessionError::ConnectFailed {
                router: address.clone(),
                message,
            })
        };

        let mut child = Command::new(&target.ssh_command)
            .args(&target.ssh_options)
            .arg("-p")
            .arg(target.port.to_string())
            .arg("-l")
            .arg(&target.user)
            .arg(&target.host)
            .arg("-s")
            .arg("netconf")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| connect_failed(format!("failed to start {}: {e}", target.ssh_command)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| connect_failed(String::from("ssh stdin unavailable")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| connect_failed(String::from("ssh stdout unavailable")))?;

        let mut channel = Channel {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        let hello = channel
            .read_message()
            .await
            .map_err(|e| connect_failed(e.to_string()))?;
        if !hello.contains("capabilities") {
            return Err(connect_failed(String::from("device did not send a NETCONF hello")));
        }
        trace!("Server hello: {hello}");

        channel.write_message(&client_hello()).await?;
        info!("Authenticated as {}", target.user);

        Ok(Self {
            address,
            channel: Mutex::new(Some(channel)),
        })
    }
}

#[async_trait]
impl DeviceSession for SshNetconfSession {
    async fn execute(&self, request: &RpcRequest) -> Result<String> {
        let mut guard = self.channel.lock().await;
        let channel = guard.as_mut().ok_or(SessionError::Closed)?;

        let message_id = Uuid::new_v4();
        debug!("Sending {request} (message-id {message_id})");
        channel
            .write_message(&format!(
                r#"<rpc message-id="{message_id}" xmlns="{NETCONF_BASE_NS}">{}</rpc>"#,
                request.to_xml()
            ))
            .await?;

        let raw = channel.read_message().await?;
        trace!("Reply to {message_id}: {raw}");
        unwrap_rpc_reply(&raw)
    }

    async fn close(&self) -> Result<()> {
        let Some(mut channel) = self.channel.lock().await.take() else {
            return Ok(());
        };

        debug!("Closing NETCONF session with {}", self.address);
        let goodbye = format!(
            r#"<rpc message-id="{}" xmlns="{NETCONF_BASE_NS}"><close-session/></rpc>"#,
            Uuid::new_v4()
        );
        if let Err(e) = channel.write_message(&goodbye).await {
            warn!("Failed to send close-session: {e}");
        } else if let Err(e) = channel.read_message().await {
            debug!("No reply to close-session: {e}");
        }

        drop(channel.stdin);
        channel.child.wait().await?;
        Ok(())
    }

    fn target(&self) -> &str {
        &self.address
    }
}

impl Channel {
    async fn write_message(&mut self, message: &str) -> Result<()> {
        let io = |e: std::io::Error| RcliError::Session(SessionError::transport(e.to_string()));
        self.stdin.write_all(message.as_bytes()).await.map_err(io)?;
        self.stdin.write_all(END_OF_MESSAGE).await.map_err(io)?;
        self.stdin.flush().await.map_err(io)
    }

    async fn read_message(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        loop {
            let read = self
                .stdout
                .read_until(b'>', &mut buf)
                .await
                .map_err(|e| SessionError::transport(e.to_string()))?;
            if read == 0 {
                return Err(SessionError::transport("session closed by device").into());
            }
            if buf.ends_with(END_OF_MESSAGE) {
                buf.truncate(buf.len().saturating_sub(END_OF_MESSAGE.len()));
                break;
            }
        }

        String::from_utf8(buf)
            .map_err(|e| SessionError::transport(format!("reply is not UTF-8: {e}")).into())
    }
}

fn client_hello() -> String {
    format!(
        r#"<hello xmlns="{NETCONF_BASE_NS}"><capabilities><capability>urn:ietf:params:netconf:base:1.0</capability></capabilities></hello>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address() {
        let target = SshTarget {
            host: String::from("edge1.example.net"),
            port: DEFAULT_NETCONF_PORT,
            user: String::from("netops"),
            ssh_command: String::from("ssh"),
            ssh_options: vec![],
        };
        assert_eq!(target.address(), "edge1.example.net:830");
    }

    #[test]
    fn test_client_hello_advertises_base() {
        let hello = client_hello();
        assert!(hello.contains("urn:ietf:params:netconf:base:1.0"));
        assert!(hello.starts_with("<hello"));
    }

    #[tokio::test]
    async fn test_connect_fails_without_binary() {
        let target = SshTarget {
            host: String::from("edge1"),
            port: DEFAULT_NETCONF_PORT,
            user: String::from("netops"),
            ssh_command: String::from("/nonexistent/ssh-binary"),
            ssh_options: vec![],
        };
        let err = SshNetconfSession::connect(&target).await.unwrap_err();
        assert!(matches!(
            err,
            RcliError::Session(SessionError::ConnectFailed { .. })
        ));
    }
}

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use router_cli::device::{DeviceSession, RpcRequest};
use router_cli::document::DiffDocument;
use router_cli::error::{RcliError, Result, RpcError, SessionError};
use router_cli::workflow::Approver;

/// The host-name change used across scenarios.
pub const HOSTNAME_DIFF: &str = "[edit system]\n-  host-name bar;\n+  host-name foo;";

/// What the scripted device answers.
#[derive(Debug, Clone)]
pub struct Script {
    /// Software version; `None` answers `show version` without one.
    pub version: Option<String>,
    /// Diff body returned by the compare query.
    pub diff: String,
    /// Message of an `rpc-error` returned by the load.
    pub load_error: Option<String>,
    /// Message of an `rpc-error` nested in the commit results.
    pub commit_error: Option<String>,
    /// Whether the unlock fails at the transport level.
    pub unlock_fails: bool,
    /// Running configuration text.
    pub running: String,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            version: Some(String::from("21.4R3-S2.3")),
            diff: String::from(HOSTNAME_DIFF),
            load_error: None,
            commit_error: None,
            unlock_fails: false,
            running: String::from("system {\n    host-name bar;\n}"),
        }
    }
}

/// An in-memory device that records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    script: Script,
    requests: Mutex<Vec<RpcRequest>>,
    closed: AtomicBool,
}

impl ScriptedSession {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the requests received so far, in order.
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Returns the wire names of the requests received so far.
    pub fn request_log(&self) -> Vec<String> {
        self.requests().iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, request: &RpcRequest) -> usize {
        self.requests().iter().filter(|r| *r == request).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn version_reply(&self) -> String {
        let version = self
            .script
            .version
            .as_ref()
            .map(|v| format!(r#","junos-version":[{{"data":"{v}"}}]"#))
            .unwrap_or_default();
        format!(
            r#"{{"software-information":[{{"host-name":[{{"data":"edge1-re0"}}],"product-model":[{{"data":"mx204"}}]{version}}}]}}"#
        )
    }
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    async fn execute(&self, request: &RpcRequest) -> Result<String> {
        self.requests.lock().expect("requests lock").push(request.clone());

        match request {
            RpcRequest::Command { command, .. } if command == "show version" => {
                Ok(self.version_reply())
            }
            RpcRequest::Command { command, .. } => {
                Ok(format!("<output>\n{command}: ok\n</output>"))
            }
            RpcRequest::LoadConfiguration { .. } => match &self.script.load_error {
                Some(message) => Err(RcliError::Rpc(RpcError {
                    severity: String::from("error"),
                    path: String::from("[edit system]"),
                    message: message.clone(),
                    bad_element: String::from("hostname"),
                })),
                None => Ok(String::from(
                    "<load-configuration-results><ok/></load-configuration-results>",
                )),
            },
            RpcRequest::CompareConfiguration { .. } => Ok(format!(
                "<configuration-information><configuration-output>\n{}\n</configuration-output></configuration-information>",
                self.script.diff
            )),
            RpcRequest::GetConfiguration => Ok(format!(
                "<configuration-text>\n{}\n</configuration-text>",
                self.script.running
            )),
            RpcRequest::UnlockConfiguration if self.script.unlock_fails => {
                Err(SessionError::transport("connection reset by peer").into())
            }
            RpcRequest::CommitConfirmed { .. } | RpcRequest::Commit => {
                match &self.script.commit_error {
                    Some(message) => Ok(format!(
                        "<commit-results><routing-engine><name>re0</name><rpc-error>\
                         <error-severity>error</error-severity>\
                         <error-message>{message}</error-message>\
                         </rpc-error></routing-engine></commit-results>"
                    )),
                    None => Ok(String::from("<ok/>")),
                }
            }
            RpcRequest::LockConfiguration | RpcRequest::UnlockConfiguration => {
                Ok(String::from("<ok/>"))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn target(&self) -> &str {
        "edge1:830"
    }
}

/// An approver with a fixed answer that counts how often it was asked.
#[derive(Debug, Default)]
pub struct RecordingApprover {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl RecordingApprover {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.lock().expect("asked lock").len()
    }
}

impl Approver for RecordingApprover {
    fn approve(&self, router: &str, _diff: &DiffDocument) -> Result<bool> {
        self.asked.lock().expect("asked lock").push(router.to_string());
        Ok(self.answer)
    }
}

//! Parsers for device replies.
//!
//! Each parser takes the body of an `rpc-reply` (the envelope already
//! removed by the session) and turns it into a typed value or an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ParseError, ParseStage, RcliError, Result, RpcError};

use super::xml::{XmlElement, inner_markup};

/// Output format requested for an operational command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommandFormat {
    /// Plain text, as shown on the device CLI.
    #[default]
    Text,
    /// Structured XML.
    Xml,
    /// Structured JSON.
    Json,
}

impl CommandFormat {
    /// Value of the `format` attribute on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for CommandFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Software identity reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceVersion {
    /// Software version string, e.g. `21.4R3-S2.3`.
    pub version: String,
    /// Configured host name.
    pub host_name: Option<String>,
    /// Hardware model.
    pub product_model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionReply {
    #[serde(rename = "software-information", default)]
    software_information: Vec<SoftwareInformation>,
}

#[derive(Debug, Deserialize)]
struct SoftwareInformation {
    #[serde(rename = "host-name", default)]
    host_name: Vec<DataNode>,
    #[serde(rename = "product-model", default)]
    product_model: Vec<DataNode>,
    #[serde(rename = "junos-version", default)]
    junos_version: Vec<DataNode>,
}

#[derive(Debug, Deserialize)]
struct DataNode {
    data: String,
}

fn first_data(nodes: &[DataNode]) -> Option<String> {
    nodes.first().map(|n| n.data.clone())
}

/// Extracts the software version from a JSON `show version` reply.
///
/// # Errors
///
/// Returns a parse error if the reply is not JSON or lacks
/// `software-information[0].junos-version[0].data`.
pub fn parse_version(reply: &str) -> std::result::Result<DeviceVersion, ParseError> {
    let parsed: VersionReply = serde_json::from_str(reply.trim())
        .map_err(|e| ParseError::new(ParseStage::Version, e.to_string()))?;

    let info = parsed.software_information.first().ok_or_else(|| {
        ParseError::new(ParseStage::Version, "reply has no software-information")
    })?;

    let version = first_data(&info.junos_version).ok_or_else(|| {
        ParseError::new(ParseStage::Version, "software-information has no junos-version")
    })?;

    Ok(DeviceVersion {
        version,
        host_name: first_data(&info.host_name),
        product_model: first_data(&info.product_model),
    })
}

/// Builds an [`RpcError`] from an `<rpc-error>` element.
#[must_use]
pub fn rpc_error_from_element(element: &XmlElement) -> RpcError {
    let text = |name: &str| element.child_text(name).unwrap_or_default().to_string();
    RpcError {
        severity: text("error-severity"),
        path: text("error-path"),
        message: text("error-message"),
        bad_element: element
            .child("error-info")
            .and_then(|info| info.child_text("bad-element"))
            .unwrap_or_default()
            .to_string(),
    }
}

/// Checks a `<load-configuration-results>` reply.
///
/// An `<ok/>` marker is success; anything else is reported as the contained
/// RPC error.
///
/// # Errors
///
/// Returns a parse error for a malformed reply and an RPC error if the
/// device rejected the candidate.
pub fn parse_load_result(reply: &str) -> Result<()> {
    let root = XmlElement::parse(reply, ParseStage::LoadResult)?;
    if root.name != "load-configuration-results" {
        return Err(ParseError::new(
            ParseStage::LoadResult,
            format!("expected <load-configuration-results>, found <{}>", root.name),
        )
        .into());
    }

    if root.child("ok").is_some() {
        return Ok(());
    }

    let error = root
        .child("rpc-error")
        .map(rpc_error_from_element)
        .unwrap_or_else(|| RpcError {
            message: String::from("load did not report success"),
            ..RpcError::default()
        });
    Err(RcliError::Rpc(error))
}

/// Checks the reply to a commit or commit-confirmed.
///
/// The device nests commit-check failures inside `<commit-results>`, often
/// under a `<routing-engine>` element, so the whole reply is searched. The
/// first `rpc-error` whose severity is not `warning` fails the commit.
///
/// # Errors
///
/// Returns a parse error for a malformed reply and an RPC error if the
/// device rejected the commit.
pub fn parse_commit_result(reply: &str) -> Result<()> {
    if reply.trim().is_empty() {
        return Ok(());
    }

    let root = XmlElement::parse(reply, ParseStage::Commit)?;
    match first_failure(&root) {
        Some(element) => Err(RcliError::Rpc(rpc_error_from_element(element))),
        None => Ok(()),
    }
}

fn first_failure(element: &XmlElement) -> Option<&XmlElement> {
    if element.name == "rpc-error" {
        return (element.child_text("error-severity") != Some("warning")).then_some(element);
    }
    element.children.iter().find_map(first_failure)
}

/// Extracts an operational command's output.
///
/// Text output is unwrapped from its `<output>` element; XML and JSON
/// output is returned unmodified.
///
/// # Errors
///
/// Returns a parse error if text output is not wrapped in `<output>`.
pub fn parse_command_output(
    reply: &str,
    format: CommandFormat,
) -> std::result::Result<String, ParseError> {
    match format {
        CommandFormat::Text => {
            let root = XmlElement::parse(reply, ParseStage::CommandOutput)?;
            if root.name == "output" {
                Ok(root.text)
            } else {
                Err(ParseError::new(
                    ParseStage::CommandOutput,
                    format!("expected <output>, found <{}>", root.name),
                ))
            }
        }
        CommandFormat::Xml | CommandFormat::Json => Ok(reply.to_string()),
    }
}

/// Extracts the configuration text from a `get-configuration` reply.
///
/// # Errors
///
/// Returns a parse error if the reply is not a `<configuration-text>`
/// element.
pub fn parse_configuration(reply: &str) -> std::result::Result<String, ParseError> {
    let root = XmlElement::parse(reply, ParseStage::Configuration)?;
    if root.name == "configuration-text" {
        Ok(root.text.trim().to_string())
    } else {
        Err(ParseError::new(
            ParseStage::Configuration,
            format!("expected <configuration-text>, found <{}>", root.name),
        ))
    }
}

/// Removes the `<rpc-reply>` envelope from a raw device reply.
///
/// Replies carrying an `<rpc-error>` of severity `error` are turned into an
/// RPC error; warnings are ignored.
///
/// # Errors
///
/// Returns a parse error for a malformed envelope and an RPC error for a
/// device-reported failure.
pub fn unwrap_rpc_reply(raw: &str) -> Result<String> {
    if raw.contains("rpc-error>") {
        let root = XmlElement::parse(raw, ParseStage::Envelope)?;
        let failure = root
            .children
            .iter()
            .filter(|c| c.name == "rpc-error")
            .map(rpc_error_from_element)
            .find(|e| e.severity != "warning");
        if let Some(error) = failure {
            return Err(RcliError::Rpc(error));
        }
    }

    Ok(inner_markup(raw, ParseStage::Envelope)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOAD_ERROR: &str = r"<load-configuration-results>
<rpc-error>
<error-severity>error</error-severity>
<error-path>[edit system]</error-path>
<error-message>syntax error</error-message>
<error-info>
<bad-element>hostname</bad-element>
</error-info>
</rpc-error>
</load-configuration-results>";

    #[test]
    fn test_load_ok() {
        let reply = "<load-configuration-results>\n<ok/>\n</load-configuration-results>";
        assert!(parse_load_result(reply).is_ok());
    }

    #[test]
    fn test_load_error_carries_message_and_element() {
        let err = parse_load_result(LOAD_ERROR).unwrap_err();
        let RcliError::Rpc(rpc) = &err else {
            panic!("expected RPC error, got {err:?}");
        };
        assert_eq!(rpc.severity, "error");
        assert_eq!(rpc.path, "[edit system]");
        let text = err.to_string();
        assert!(text.contains("syntax error"));
        assert!(text.contains("hostname"));
    }

    #[test]
    fn test_load_without_ok_or_error() {
        let err = parse_load_result("<load-configuration-results/>").unwrap_err();
        assert!(matches!(err, RcliError::Rpc(_)));
    }

    #[test]
    fn test_load_malformed() {
        let err = parse_load_result("<load-configuration-results>").unwrap_err();
        assert!(matches!(err, RcliError::Parse(_)));
    }

    const COMMIT_CHECK_FAILED: &str = r"<commit-results>
<routing-engine>
<name>re0</name>
<rpc-error>
<error-severity>warning</error-severity>
<error-message>statement has no contents; ignored</error-message>
</rpc-error>
<rpc-error>
<error-severity>error</error-severity>
<error-path>[edit protocols bgp]</error-path>
<error-message>configuration check-out failed</error-message>
<error-info>
<bad-element>group upstream</bad-element>
</error-info>
</rpc-error>
</routing-engine>
</commit-results>";

    #[test]
    fn test_commit_ok() {
        assert!(parse_commit_result("<ok/>").is_ok());
        assert!(parse_commit_result("").is_ok());
        assert!(
            parse_commit_result(
                "<commit-results><routing-engine><name>re0</name><commit-success/></routing-engine></commit-results>"
            )
            .is_ok()
        );
    }

    #[test]
    fn test_commit_nested_error_fails() {
        let err = parse_commit_result(COMMIT_CHECK_FAILED).unwrap_err();
        match err {
            RcliError::Rpc(rpc) => {
                assert_eq!(rpc.severity, "error");
                assert_eq!(rpc.message, "configuration check-out failed");
                assert_eq!(rpc.bad_element, "group upstream");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_commit_warnings_only_succeeds() {
        let reply = "<commit-results><routing-engine><rpc-error><error-severity>warning</error-severity><error-message>ignored</error-message></rpc-error><commit-success/></routing-engine></commit-results>";
        assert!(parse_commit_result(reply).is_ok());
    }

    #[test]
    fn test_commit_malformed() {
        let err = parse_commit_result("<commit-results>").unwrap_err();
        assert!(matches!(err, RcliError::Parse(ref e) if e.stage == ParseStage::Commit));
    }

    #[test]
    fn test_parse_version() {
        let reply = r#"{"software-information": [{
            "host-name": [{"data": "edge1"}],
            "product-model": [{"data": "mx204"}],
            "junos-version": [{"data": "21.4R3-S2.3"}]
        }]}"#;
        let version = parse_version(reply).expect("version");
        assert_eq!(version.version, "21.4R3-S2.3");
        assert_eq!(version.host_name.as_deref(), Some("edge1"));
        assert_eq!(version.product_model.as_deref(), Some("mx204"));
    }

    #[test]
    fn test_parse_version_missing_field() {
        let reply = r#"{"software-information": [{"host-name": [{"data": "edge1"}]}]}"#;
        let err = parse_version(reply).unwrap_err();
        assert_eq!(err.stage, ParseStage::Version);
        assert!(err.message.contains("junos-version"));

        assert!(parse_version("{}").is_err());
        assert!(parse_version("not json").is_err());
    }

    #[test]
    fn test_command_output_text_is_unwrapped() {
        let reply = "<output>\nHostname: edge1\n</output>";
        let out = parse_command_output(reply, CommandFormat::Text).expect("output");
        assert_eq!(out, "\nHostname: edge1\n");
    }

    #[test]
    fn test_command_output_structured_passthrough() {
        let json = r#"{"route-information": []}"#;
        assert_eq!(parse_command_output(json, CommandFormat::Json).expect("json"), json);

        let xml = "<route-information/>";
        assert_eq!(parse_command_output(xml, CommandFormat::Xml).expect("xml"), xml);
    }

    #[test]
    fn test_command_output_text_requires_envelope() {
        assert!(parse_command_output("<route-information/>", CommandFormat::Text).is_err());
    }

    #[test]
    fn test_parse_configuration() {
        let reply = "<configuration-text>\nsystem {\n    host-name bar;\n}\n</configuration-text>";
        let text = parse_configuration(reply).expect("configuration");
        assert!(text.starts_with("system {"));
    }

    #[test]
    fn test_unwrap_rpc_reply() {
        let raw = r#"<rpc-reply xmlns="urn:ietf:params:xml:ns:netconf:base:1.0" message-id="1">
<load-configuration-results><ok/></load-configuration-results>
</rpc-reply>"#;
        let body = unwrap_rpc_reply(raw).expect("body");
        assert_eq!(body, "<load-configuration-results><ok/></load-configuration-results>");
    }

    #[test]
    fn test_unwrap_rpc_reply_with_error() {
        let raw = r"<rpc-reply><rpc-error>
<error-severity>error</error-severity>
<error-message>configuration database locked by: admin</error-message>
</rpc-error></rpc-reply>";
        let err = unwrap_rpc_reply(raw).unwrap_err();
        assert!(err.to_string().contains("locked by: admin"));
    }

    #[test]
    fn test_unwrap_rpc_reply_ignores_warnings() {
        let raw = r"<rpc-reply><rpc-error>
<error-severity>warning</error-severity>
<error-message>statement has no contents</error-message>
</rpc-error><ok/></rpc-reply>";
        assert!(unwrap_rpc_reply(raw).is_ok());
    }
}

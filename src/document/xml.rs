//! Minimal XML tree for device replies.
//!
//! Device replies are small, shallow documents. They are read into an owned
//! element tree (names without namespace prefixes, unescaped text) so the
//! reply parsers can walk them by element name.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ParseError, ParseStage};

/// An element of a parsed reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local element name.
    pub name: String,
    /// Concatenated, unescaped text content of this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Parses a document with exactly one root element.
    ///
    /// # Errors
    ///
    /// Returns a parse error for `stage` if the document is malformed, has
    /// no root element, or has more than one.
    pub fn parse(input: &str, stage: ParseStage) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<Self> = Vec::new();
        let mut root: Option<Self> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(Self::named(local_name(&start))),
                Ok(Event::Empty(start)) => {
                    attach(&mut stack, &mut root, Self::named(local_name(&start)), stage)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ParseError::new(stage, "unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element, stage)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ParseError::new(stage, e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    } else if !text.trim().is_empty() {
                        return Err(ParseError::new(stage, "text outside of the root element"));
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ParseError::new(stage, e.to_string())),
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::new(stage, format!("unclosed element <{}>", open.name)));
        }

        root.ok_or_else(|| ParseError::new(stage, "no root element"))
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the trimmed text of the first child with the given name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Returns the first child with the given name, or a parse error.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the missing element.
    pub fn require(&self, name: &str, stage: ParseStage) -> Result<&Self, ParseError> {
        self.child(name).ok_or_else(|| {
            ParseError::new(stage, format!("<{}> has no <{name}> element", self.name))
        })
    }
}

/// Returns the raw markup between the root element's start and end tags.
///
/// Unlike [`XmlElement::parse`], the content is returned untouched: no
/// unescaping, no tree building. This keeps non-XML payloads (such as JSON
/// command output) intact.
///
/// # Errors
///
/// Returns a parse error if the document has no root element or the root is
/// never closed.
pub fn inner_markup(input: &str, stage: ParseStage) -> Result<&str, ParseError> {
    let mut reader = Reader::from_str(input);
    let mut depth = 0usize;
    let mut content_start = None;

    loop {
        let before = position(&reader, stage)?;
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                if depth == 0 {
                    content_start = Some(position(&reader, stage)?);
                }
                depth += 1;
            }
            Ok(Event::End(_)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ParseError::new(stage, "unbalanced closing tag"))?;
                if depth == 0 {
                    let start = content_start
                        .ok_or_else(|| ParseError::new(stage, "no root element"))?;
                    return input
                        .get(start..before)
                        .ok_or_else(|| ParseError::new(stage, "invalid element boundaries"));
                }
            }
            Ok(Event::Empty(_)) if depth == 0 => return Ok(""),
            Ok(Event::Eof) => {
                let message = if content_start.is_some() {
                    "root element is never closed"
                } else {
                    "no root element"
                };
                return Err(ParseError::new(stage, message));
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::new(stage, e.to_string())),
        }
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn position(reader: &Reader<&[u8]>, stage: ParseStage) -> Result<usize, ParseError> {
    usize::try_from(reader.buffer_position())
        .map_err(|_| ParseError::new(stage, "reply is too large"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    stage: ParseStage,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(ParseError::new(stage, "more than one root element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_with_prefixes() {
        let xml = r#"<?xml version="1.0"?>
<nc:rpc-reply xmlns:nc="urn:ietf:params:xml:ns:netconf:base:1.0">
  <nc:ok/>
  <data>a &lt;b&gt;</data>
</nc:rpc-reply>"#;
        let root = XmlElement::parse(xml, ParseStage::Envelope).expect("parse");
        assert_eq!(root.name, "rpc-reply");
        assert!(root.child("ok").is_some());
        assert_eq!(root.child_text("data"), Some("a <b>"));
    }

    #[test]
    fn test_parse_rejects_unclosed() {
        let err = XmlElement::parse("<a><b></b>", ParseStage::Diff).unwrap_err();
        assert_eq!(err.stage, ParseStage::Diff);
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(XmlElement::parse("   ", ParseStage::Diff).is_err());
    }

    #[test]
    fn test_require_names_missing_element() {
        let root = XmlElement::parse("<a><b/></a>", ParseStage::Diff).expect("parse");
        let err = root.require("c", ParseStage::Diff).unwrap_err();
        assert!(err.message.contains("<c>"));
    }

    #[test]
    fn test_inner_markup_keeps_payload_raw() {
        let xml = "<rpc-reply message-id=\"1\">{\"a\": [1, 2]} &amp; <b/></rpc-reply>";
        let inner = inner_markup(xml, ParseStage::Envelope).expect("inner");
        assert_eq!(inner, "{\"a\": [1, 2]} &amp; <b/>");
    }

    #[test]
    fn test_inner_markup_of_empty_root() {
        assert_eq!(inner_markup("<ok/>", ParseStage::Envelope).expect("inner"), "");
    }

    #[test]
    fn test_inner_markup_unterminated() {
        assert!(inner_markup("<rpc-reply><ok/>", ParseStage::Envelope).is_err());
    }
}

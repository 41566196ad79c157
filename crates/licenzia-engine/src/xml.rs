//! Thin helpers over `roxmltree` for registry exports.
//!
//! Registry exports disagree on namespace prefixes, so most lookups match on
//! the element's local name only. The application form is the exception and
//! is matched inside [`APPLICATION_NS`].

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, Node};
use thiserror::Error;

/// Namespace of the regional public-services application form.
pub const APPLICATION_NS: &str = "http://asguf.mos.ru/rkis_gu/coordinate/v6_1/";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("document is not valid {0}")]
    Encoding(&'static str),
    #[error("unsupported document encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("malformed XML: {0}")]
    Syntax(#[from] roxmltree::Error),
}

/// Decode raw document bytes to text.
///
/// A byte order mark decides the encoding, then the `encoding` of the XML
/// declaration, then UTF-8. Bytes that do not decode under that encoding
/// are an error; nothing is replaced.
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, XmlError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?, bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(XmlError::Encoding(encoding.name()))
}

/// Encoding named in the XML declaration, UTF-8 when there is none.
///
/// The declaration itself is ASCII, so a label of a UTF-16 family is
/// necessarily wrong and read as UTF-8.
fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding, XmlError> {
    let Some(decl) = bytes.strip_prefix(b"<?xml") else {
        return Ok(UTF_8);
    };
    let end = decl.windows(2).position(|w| w == b"?>").unwrap_or(decl.len());
    let decl = &decl[..end];
    let Some(at) = decl.windows(8).position(|w| w == b"encoding") else {
        return Ok(UTF_8);
    };
    let Some(value) = decl[at + 8..].trim_ascii_start().strip_prefix(b"=") else {
        return Ok(UTF_8);
    };
    let Some((&quote, rest)) = value.trim_ascii_start().split_first() else {
        return Ok(UTF_8);
    };
    if quote != b'"' && quote != b'\'' {
        return Ok(UTF_8);
    }
    let label = rest.split(|&b| b == quote).next().unwrap_or_default();
    Encoding::for_label(label)
        .map(Encoding::output_encoding)
        .ok_or_else(|| XmlError::UnsupportedEncoding(String::from_utf8_lossy(label).into_owned()))
}

pub fn parse(text: &str) -> Result<Document<'_>, XmlError> {
    Ok(Document::parse(text)?)
}

pub fn is_local(node: &Node<'_, '_>, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

/// First descendant element (in document order) with the given local name.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| is_local(n, local))
}

/// First descendant element with the given namespace and local name.
pub fn descendant_ns<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| is_local(n, local) && n.tag_name().namespace() == Some(ns))
}

/// Non-blank text of the first matching descendant.
pub fn descendant_text(node: Node<'_, '_>, local: &str) -> Option<String> {
    descendant(node, local).and_then(text)
}

/// Non-blank text of a direct child in the given namespace.
pub fn child_text_ns(node: Node<'_, '_>, ns: &str, local: &str) -> Option<String> {
    node.children()
        .find(|n| is_local(n, local) && n.tag_name().namespace() == Some(ns))
        .and_then(text)
}

pub fn text(node: Node<'_, '_>) -> Option<String> {
    non_blank(node.text()?)
}

/// Non-blank value of an unqualified attribute.
pub fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    non_blank(node.attribute(name)?)
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

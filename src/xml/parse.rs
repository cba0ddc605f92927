//! Build a [`Document`] from markup
//!
//! Walks the `quick-xml` event stream and appends one arena node per
//! event. Whitespace text is kept so untouched regions serialize back
//! unchanged. Byte input is decoded with the encoding named in the XML
//! declaration (UTF-8 when there is none); trees hold decoded text only.

use super::tree::{Declaration, Document, Element, NodeId, NodeKind};
use quick_xml::encoding::Decoder;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors raised while reading markup into a tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("closing tag without matching start tag")]
    UnbalancedEnd,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRootElement,
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode(decoder: Decoder, bytes: &[u8]) -> Result<String, ParseError> {
    Ok(decoder.decode(bytes)?.into_owned())
}

fn element_kind(decoder: Decoder, start: &BytesStart<'_>) -> Result<NodeKind, ParseError> {
    let mut element = Element::new(decode(decoder, start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let value = attr.decode_and_unescape_value(decoder)?;
        element
            .attributes
            .push((decode(decoder, attr.key.as_ref())?, value.into_owned()));
    }
    Ok(NodeKind::Element(element))
}

/// Parse a complete document held in memory as text.
///
/// The text is already UTF-8, so any `encoding` in its declaration is ignored.
pub fn parse_str(source: &str) -> Result<Document, ParseError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    read_document(Reader::from_str(source))
}

/// Parse a complete document from raw file bytes.
pub fn parse_bytes(source: &[u8]) -> Result<Document, ParseError> {
    read_document(Reader::from_reader(source))
}

fn read_document(mut reader: Reader<&[u8]>) -> Result<Document, ParseError> {
    let mut doc = Document::new();
    let mut open: Vec<NodeId> = vec![doc.root()];

    loop {
        // `open` always holds at least the document node while reading.
        let parent = *open.last().ok_or(ParseError::UnbalancedEnd)?;
        let event = reader.read_event()?;
        // Read after the event: a declaration may switch the encoding.
        let decoder = reader.decoder();
        match event {
            Event::Decl(decl) => {
                let version = decl
                    .version()
                    .ok()
                    .map(|v| lossy(&v))
                    .unwrap_or_else(|| "1.0".to_string());
                let standalone = decl.standalone().and_then(|s| s.ok()).map(|s| lossy(&s));
                doc.set_declaration(Declaration {
                    version,
                    standalone,
                });
            }
            Event::Start(start) => {
                let id = doc.append(parent, element_kind(decoder, &start)?);
                open.push(id);
            }
            Event::Empty(start) => {
                doc.append(parent, element_kind(decoder, &start)?);
            }
            Event::End(_) => {
                if open.len() <= 1 {
                    return Err(ParseError::UnbalancedEnd);
                }
                open.pop();
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.is_empty() {
                    doc.append_text(parent, text.into_owned());
                }
            }
            Event::CData(data) => {
                doc.append(parent, NodeKind::CData(decode(decoder, &data)?));
            }
            Event::Comment(comment) => {
                doc.append(parent, NodeKind::Comment(decode(decoder, &comment)?));
            }
            Event::PI(pi) => {
                doc.append(parent, NodeKind::ProcessingInstruction(decode(decoder, &pi)?));
            }
            Event::DocType(doctype) => {
                doc.append(parent, NodeKind::DocType(decode(decoder, &doctype)?));
            }
            Event::Eof => break,
        }
    }

    if let Some(unclosed) = open.get(1) {
        let name = doc.tag_name(*unclosed).unwrap_or_default().to_string();
        return Err(ParseError::Unclosed(name));
    }
    if doc.root_element().is_none() {
        return Err(ParseError::NoRootElement);
    }
    Ok(doc)
}

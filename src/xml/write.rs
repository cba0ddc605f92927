//! Serialize a [`Document`] back to markup
//!
//! Output always starts with an XML declaration declaring UTF-8. Node
//! content is written in arena order; attributes keep their stored order.

use super::tree::{Document, NodeId, NodeKind};
use quick_xml::escape::{escape, partial_escape};
use std::fmt::Write as _;

/// Render the whole document, declaration included.
pub fn to_string(doc: &Document) -> String {
    let mut out = String::new();
    let declaration = doc.declaration().cloned().unwrap_or_default();
    let _ = write!(out, "<?xml version=\"{}\" encoding=\"UTF-8\"", declaration.version);
    if let Some(standalone) = &declaration.standalone {
        let _ = write!(out, " standalone=\"{}\"", standalone);
    }
    out.push_str("?>");
    for child in doc.children(doc.root()) {
        write_node(doc, *child, &mut out);
    }
    out
}

/// Render one node and its subtree without a declaration.
pub fn node_to_string(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Root => {
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (key, value) in &element.attributes {
                let _ = write!(out, " {}=\"{}\"", key, escape(value.as_str()));
            }
            let children = doc.children(id);
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_node(doc, *child, out);
            }
            let _ = write!(out, "</{}>", element.name);
        }
        NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeKind::CData(data) => {
            let _ = write!(out, "<![CDATA[{}]]>", data);
        }
        NodeKind::Comment(comment) => {
            let _ = write!(out, "<!--{}-->", comment);
        }
        NodeKind::ProcessingInstruction(pi) => {
            let _ = write!(out, "<?{}?>", pi);
        }
        NodeKind::DocType(doctype) => {
            let _ = write!(out, "<!DOCTYPE {}>", doctype);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn round_trips_untouched_markup() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
            <!-- header -->\n\
            <ead xmlns=\"urn:isbn:1-931666-22-9\">\n  \
            <did><persname role=\"subject\">A &amp; B</persname><empty/></did>\n\
            </ead>";
        let doc = parse_str(source).unwrap();
        assert_eq!(to_string(&doc), source);
    }

    #[test]
    fn adds_declaration_when_source_has_none() {
        let doc = parse_str("<ead/>").unwrap();
        assert_eq!(to_string(&doc), "<?xml version=\"1.0\" encoding=\"UTF-8\"?><ead/>");
    }

    #[test]
    fn keeps_standalone_flag() {
        let doc = parse_str("<?xml version=\"1.0\" standalone=\"no\"?><ead/>").unwrap();
        assert!(to_string(&doc).starts_with(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"
        ));
    }

    #[test]
    fn escapes_new_attribute_values_and_text() {
        let mut doc = parse_str("<c/>").unwrap();
        let c = doc.root_element().unwrap();
        let leaf = doc.append_element(c, "corpname");
        doc.set_attribute(leaf, "encodinganalog", "610$a").unwrap();
        doc.set_attribute(leaf, "note", "\"quoted\" <x>").unwrap();
        doc.append_text(leaf, "Smith & Sons <Ltd>");
        assert_eq!(
            node_to_string(&doc, leaf),
            "<corpname encodinganalog=\"610$a\" note=\"&quot;quoted&quot; &lt;x&gt;\">\
             Smith &amp; Sons &lt;Ltd&gt;</corpname>"
        );
    }

    #[test]
    fn writes_doctype_cdata_and_pi() {
        let source = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><!DOCTYPE ead><?style x?><a><![CDATA[<raw>]]></a>";
        let doc = parse_str(source).unwrap();
        assert_eq!(to_string(&doc), source);
    }
}

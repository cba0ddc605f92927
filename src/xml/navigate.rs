//! Stateless lookups over a loaded [`Document`]

use super::tree::{Document, NodeId};

/// Nearest proper ancestor whose tag is in `allowed`.
///
/// Never returns `node` itself; `None` once the document node is reached.
pub fn nearest_ancestor_with_tag(doc: &Document, node: NodeId, allowed: &[String]) -> Option<NodeId> {
    doc.ancestors(node).find(|ancestor| {
        doc.tag_name(*ancestor)
            .is_some_and(|tag| allowed.iter().any(|a| a == tag))
    })
}

/// First direct element child named `tag`.
pub fn first_child_with_tag(doc: &Document, node: NodeId, tag: &str) -> Option<NodeId> {
    doc.element_children(node)
        .find(|child| doc.tag_name(*child) == Some(tag))
}

/// Direct element children whose trimmed text content equals the trimmed `text`.
pub fn children_with_text_content<'a>(
    doc: &'a Document,
    node: NodeId,
    text: &'a str,
) -> impl Iterator<Item = NodeId> + 'a {
    let wanted = text.trim();
    doc.element_children(node)
        .filter(move |child| doc.text_content(*child).trim() == wanted)
}

/// First direct element child whose trimmed text content equals the trimmed `text`.
pub fn first_child_with_text_content(doc: &Document, node: NodeId, text: &str) -> Option<NodeId> {
    children_with_text_content(doc, node, text).next()
}

/// The `n`-th (zero-based) element named `tag`, counting the whole tree in document order.
pub fn nth_element_by_tag(doc: &Document, tag: &str, n: usize) -> Option<NodeId> {
    elements_by_tag(doc, tag).nth(n)
}

/// All elements named `tag` in document order.
pub fn elements_by_tag<'a>(doc: &'a Document, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
    doc.descendants(doc.root())
        .filter(move |node| doc.tag_name(*node) == Some(tag))
}

/// Value of `attribute` on the first element named `element`, if both exist.
pub fn language_code<'a>(doc: &'a Document, element: &str, attribute: &str) -> Option<&'a str> {
    elements_by_tag(doc, element)
        .next()
        .and_then(|node| doc.attribute(node, attribute))
}

//! Wrapper and subgroup lookup/creation
//!
//! Subgroups are recognised by their label element, never by position:
//! a subgroup belongs to a kind when its label text equals that kind's
//! label in either locale.

use crate::record::{EntityKind, Locale};
use crate::xml::{navigate, Document, NodeId, TreeError};

/// Rank of labelled subgroups that belong to no known kind; they sort last.
const OTHER_RANK: u8 = u8::MAX;

/// First direct child of `parent` named `wrapper_tag`, created when missing.
///
/// Returns the wrapper and whether it was created.
pub(crate) fn find_or_create_wrapper(doc: &mut Document, parent: NodeId, wrapper_tag: &str) -> (NodeId, bool) {
    match navigate::first_child_with_tag(doc, parent, wrapper_tag) {
        Some(wrapper) => (wrapper, false),
        None => (doc.append_element(parent, wrapper_tag), true),
    }
}

/// Label text of a wrapper child, if it has a label element.
fn label_text(doc: &Document, child: NodeId, label_tag: &str) -> Option<String> {
    navigate::first_child_with_tag(doc, child, label_tag).map(|label| doc.text_content(label))
}

/// The existing subgroup for `kind` inside `wrapper`.
pub(crate) fn find_subgroup(doc: &Document, wrapper: NodeId, kind: EntityKind, label_tag: &str) -> Option<NodeId> {
    doc.element_children(wrapper).find(|child| {
        label_text(doc, *child, label_tag).is_some_and(|text| kind.matches_label(&text))
    })
}

/// Where a new subgroup for `kind` must go: before the first labelled
/// subgroup that ranks after it in the order geography, person,
/// organization, other. `None` means append.
pub(crate) fn insertion_anchor(doc: &Document, wrapper: NodeId, kind: EntityKind, label_tag: &str) -> Option<NodeId> {
    doc.element_children(wrapper).find(|child| {
        label_text(doc, *child, label_tag).is_some_and(|text| {
            let rank = EntityKind::from_label(&text).map_or(OTHER_RANK, EntityKind::rank);
            rank > kind.rank()
        })
    })
}

/// Create a labelled subgroup for `kind` at its ordered position.
pub(crate) fn create_subgroup(
    doc: &mut Document,
    wrapper: NodeId,
    kind: EntityKind,
    locale: Locale,
    wrapper_tag: &str,
    label_tag: &str,
) -> Result<NodeId, TreeError> {
    let subgroup = match insertion_anchor(doc, wrapper, kind, label_tag) {
        Some(anchor) => doc.insert_element_before(wrapper, wrapper_tag, anchor)?,
        None => doc.append_element(wrapper, wrapper_tag),
    };
    let label = doc.append_element(subgroup, label_tag);
    doc.append_text(label, kind.label(locale));
    Ok(subgroup)
}

//! Group merge engine
//!
//! Inserts a record's chosen name under the nearest permissible parent of
//! its resolved node:
//!
//! ```text
//! <descgrp>                            permissible parent
//!   <controlaccess>                    wrapper
//!     <controlaccess>                  subgroup, one per kind
//!       <head>Personen</head>          label, Dutch or English
//!       <persname role="subject" source="NL-AMISG"
//!                 authfilenumber="460147" encodinganalog="600$a">Janssen, Jan</persname>
//!     </controlaccess>
//!   </controlaccess>
//! </descgrp>
//! ```
//!
//! Every level is found-or-created, and a leaf whose text already matches
//! is refreshed instead of duplicated, so merging is idempotent.

mod grouping;

use crate::config::MergeConfig;
use crate::error::RecordError;
use crate::record::{Locale, Record};
use crate::xml::{navigate, Document, NodeId};
use tracing::{debug, info};

/// `role` attribute of every leaf.
pub const LEAF_ROLE: &str = "subject";
/// `source` attribute of every leaf.
pub const LEAF_SOURCE: &str = "NL-AMISG";

/// What happened to the leaf element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafAction {
    Created,
    /// A leaf with the same text existed; its attributes were re-set.
    Refreshed,
}

/// Result of merging one record into its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub leaf: NodeId,
    pub action: LeafAction,
    pub created_wrapper: bool,
    pub created_subgroup: bool,
}

/// Applies records to document trees according to a [`MergeConfig`].
pub struct MergeEngine<'a> {
    config: &'a MergeConfig,
}

impl<'a> MergeEngine<'a> {
    pub fn new(config: &'a MergeConfig) -> Self {
        Self { config }
    }

    /// Label locale of `doc`, from its first language element.
    pub fn locale(&self, doc: &Document) -> Locale {
        let code = navigate::language_code(doc, &self.config.language_element, &self.config.language_attribute);
        match code {
            Some(code) if code.trim() == self.config.primary_language => Locale::Dutch,
            Some(_) => Locale::English,
            None => {
                debug!("no language code found, using English labels");
                Locale::English
            }
        }
    }

    /// Merge `record`'s golden candidate at the location of `node`.
    pub fn merge(&self, doc: &mut Document, node: NodeId, record: &Record) -> Result<MergeOutcome, RecordError> {
        let key = record.key();
        let golden = record
            .decision()
            .ok_or_else(|| RecordError::MissingRecord(key.clone()))?;
        let candidate = record
            .chosen_candidate()
            .ok_or_else(|| RecordError::MissingCandidate {
                golden: golden.to_string(),
                candidates: record.candidate_ids(),
            })?;
        let text = candidate
            .names
            .first()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| RecordError::EmptyCandidate(candidate.id.clone()))?;

        let parent = navigate::nearest_ancestor_with_tag(doc, node, &self.config.permissible_parents).ok_or_else(
            || RecordError::NoPermissibleParent {
                parents: self.config.permissible_parents.join(", "),
            },
        )?;

        let wrapper_tag = self.config.wrapper_tag.as_str();
        let label_tag = self.config.label_tag.as_str();

        let (wrapper, created_wrapper) = grouping::find_or_create_wrapper(doc, parent, wrapper_tag);

        let (subgroup, created_subgroup) = match grouping::find_subgroup(doc, wrapper, record.kind, label_tag) {
            Some(subgroup) => (subgroup, false),
            None => {
                let locale = self.locale(doc);
                let subgroup = grouping::create_subgroup(doc, wrapper, record.kind, locale, wrapper_tag, label_tag)?;
                debug!(record = %key, label = record.kind.label(locale), "created subgroup");
                (subgroup, true)
            }
        };

        let existing = navigate::children_with_text_content(doc, subgroup, text)
            .find(|child| doc.tag_name(*child) != Some(label_tag));
        let (leaf, action) = match existing {
            Some(leaf) => (leaf, LeafAction::Refreshed),
            None => (doc.append_element(subgroup, record.kind.element_name()), LeafAction::Created),
        };

        doc.set_attribute(leaf, "role", LEAF_ROLE)?;
        doc.set_attribute(leaf, "source", LEAF_SOURCE)?;
        doc.set_attribute(leaf, "authfilenumber", golden)?;
        doc.set_attribute(leaf, "encodinganalog", record.kind.encoding_analog())?;
        if action == LeafAction::Created {
            doc.append_text(leaf, text.as_str());
        }

        info!(record = %key, name = %text, action = ?action, "merged authority name");
        Ok(MergeOutcome {
            leaf,
            action,
            created_wrapper,
            created_subgroup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{node_to_string, parse_str};
    use serde_json::json;

    fn record(kind: &str, golden: &str, name: &str) -> Record {
        serde_json::from_value(json!({
            "id": "doc.xml-0",
            "input": name,
            "type": kind,
            "golden": golden,
            "candidates": [
                {"id": "0", "names": ["Decoy"], "distance": 2},
                {"id": golden, "names": [name, "alt"], "distance": 0}
            ]
        }))
        .unwrap()
    }

    fn doc_with(lang: &str, body: &str) -> Document {
        parse_str(&format!(
            "<ead><eadheader><langusage><language langcode=\"{lang}\"/></langusage></eadheader>\
             <archdesc><descgrp>{body}</descgrp></archdesc></ead>"
        ))
        .unwrap()
    }

    fn descgrp(doc: &Document) -> NodeId {
        navigate::elements_by_tag(doc, "descgrp").next().unwrap()
    }

    #[test]
    fn builds_full_structure_in_empty_parent() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with("dut", "<p><persname>Jan</persname></p>");
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();

        let outcome = engine
            .merge(&mut doc, node, &record("pers", "460147", "Janssen, Jan"))
            .unwrap();
        assert!(outcome.created_wrapper);
        assert!(outcome.created_subgroup);
        assert_eq!(outcome.action, LeafAction::Created);

        let wrapper = navigate::first_child_with_tag(&doc, descgrp(&doc), "controlaccess").unwrap();
        assert_eq!(
            node_to_string(&doc, wrapper),
            "<controlaccess><controlaccess><head>Personen</head>\
             <persname role=\"subject\" source=\"NL-AMISG\" authfilenumber=\"460147\" encodinganalog=\"600$a\">\
             Janssen, Jan</persname></controlaccess></controlaccess>"
        );
    }

    #[test]
    fn merging_twice_keeps_one_leaf_with_latest_attributes() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with("eng", "<p><persname>Jan</persname></p>");
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();

        let first = engine.merge(&mut doc, node, &record("pers", "1", "Janssen, Jan")).unwrap();
        let second = engine.merge(&mut doc, node, &record("pers", "2", " Janssen, Jan ")).unwrap();
        assert_eq!(second.action, LeafAction::Refreshed);
        assert_eq!(first.leaf, second.leaf);
        assert!(!second.created_wrapper && !second.created_subgroup);

        let leaves: Vec<_> = navigate::elements_by_tag(&doc, "persname")
            .filter(|n| doc.text_content(*n).trim() == "Janssen, Jan")
            .collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(doc.attribute(leaves[0], "authfilenumber"), Some("2"));
    }

    #[test]
    fn refresh_overwrites_stale_attributes_of_existing_leaf() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with(
            "dut",
            "<p><corpname>PvdA</corpname></p><controlaccess><controlaccess><head>Organisaties</head>\
             <corpname role=\"creator\" encodinganalog=\"x\">PvdA</corpname></controlaccess></controlaccess>",
        );
        let node = navigate::nth_element_by_tag(&doc, "corpname", 0).unwrap();
        let outcome = engine.merge(&mut doc, node, &record("corp", "99", "PvdA")).unwrap();
        assert_eq!(outcome.action, LeafAction::Refreshed);
        assert_eq!(doc.attribute(outcome.leaf, "role"), Some("subject"));
        assert_eq!(doc.attribute(outcome.leaf, "encodinganalog"), Some("610$a"));
        assert_eq!(doc.attribute(outcome.leaf, "source"), Some("NL-AMISG"));
        assert_eq!(doc.attribute(outcome.leaf, "authfilenumber"), Some("99"));
        assert_eq!(doc.text_content(outcome.leaf), "PvdA");
    }

    #[test]
    fn locale_follows_language_code() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        assert_eq!(engine.locale(&doc_with("dut", "")), Locale::Dutch);
        assert_eq!(engine.locale(&doc_with("eng", "")), Locale::English);
        assert_eq!(engine.locale(&parse_str("<ead/>").unwrap()), Locale::English);
    }

    #[test]
    fn english_document_gets_english_label() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with("eng", "<p><corpname>Acme</corpname></p>");
        let node = navigate::nth_element_by_tag(&doc, "corpname", 0).unwrap();
        engine.merge(&mut doc, node, &record("corp", "5", "Acme Inc.")).unwrap();
        let head = navigate::elements_by_tag(&doc, "head").next().unwrap();
        assert_eq!(doc.text_content(head), "Organizations");
    }

    #[test]
    fn existing_subgroup_in_other_locale_is_reused() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with(
            "dut",
            "<p><persname>Jan</persname></p><controlaccess><controlaccess><head>Persons</head></controlaccess></controlaccess>",
        );
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        let outcome = engine.merge(&mut doc, node, &record("pers", "3", "Jan")).unwrap();
        assert!(!outcome.created_subgroup);
        assert_eq!(navigate::elements_by_tag(&doc, "head").count(), 1);
    }

    #[test]
    fn subgroups_end_up_in_canonical_order() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with(
            "eng",
            "<p><corpname>Acme</corpname><persname>Jan</persname></p>\
             <controlaccess><controlaccess><head>Geographic Names</head></controlaccess></controlaccess>",
        );
        let corp = navigate::nth_element_by_tag(&doc, "corpname", 0).unwrap();
        let pers = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        engine.merge(&mut doc, corp, &record("corp", "1", "Acme")).unwrap();
        engine.merge(&mut doc, pers, &record("pers", "2", "Jan")).unwrap();

        let heads: Vec<_> = navigate::elements_by_tag(&doc, "head")
            .map(|h| doc.text_content(h))
            .collect();
        assert_eq!(heads, vec!["Geographic Names", "Persons", "Organizations"]);
    }

    #[test]
    fn missing_golden_candidate_lists_candidate_ids() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with("dut", "<p><persname>Jan</persname></p>");
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        let mut r = record("pers", "7", "Jan");
        r.golden = Some("8".into());

        let err = engine.merge(&mut doc, node, &r).unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingCandidate {
                golden: "8".into(),
                candidates: vec!["0".into(), "7".into()],
            }
        );
        assert!(navigate::elements_by_tag(&doc, "controlaccess").next().is_none());
    }

    #[test]
    fn node_without_permissible_parent_fails() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = parse_str("<ead><archdesc><persname>Jan</persname></archdesc></ead>").unwrap();
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        assert!(matches!(
            engine.merge(&mut doc, node, &record("pers", "1", "Jan")),
            Err(RecordError::NoPermissibleParent { .. })
        ));
    }

    #[test]
    fn candidate_without_names_fails() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with("dut", "<p><persname>Jan</persname></p>");
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        let mut r = record("pers", "1", "Jan");
        r.candidates[1].names.clear();
        assert_eq!(
            engine.merge(&mut doc, node, &r).unwrap_err(),
            RecordError::EmptyCandidate("1".into())
        );
    }

    #[test]
    fn blank_first_name_never_claims_an_empty_leaf() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        let mut doc = doc_with(
            "dut",
            "<p><persname>Jan</persname></p>\
             <controlaccess><controlaccess><head>Personen</head><persname/></controlaccess></controlaccess>",
        );
        let node = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
        let mut r = record("pers", "1", "Jan");
        r.candidates[1].names = vec!["  ".into(), "Jan".into()];
        assert_eq!(
            engine.merge(&mut doc, node, &r).unwrap_err(),
            RecordError::EmptyCandidate("1".into())
        );
        let empty = navigate::nth_element_by_tag(&doc, "persname", 1).unwrap();
        assert!(doc.element(empty).unwrap().attributes.is_empty());
    }

    #[test]
    fn person_precedes_organization_in_either_arrival_order() {
        let config = MergeConfig::default();
        let engine = MergeEngine::new(&config);
        for pers_first in [true, false] {
            let mut doc = doc_with("eng", "<p><persname>Jan</persname><corpname>Acme</corpname></p>");
            let pers = navigate::nth_element_by_tag(&doc, "persname", 0).unwrap();
            let corp = navigate::nth_element_by_tag(&doc, "corpname", 0).unwrap();
            let mut steps = vec![(pers, record("pers", "1", "Jan")), (corp, record("corp", "2", "Acme"))];
            if !pers_first {
                steps.reverse();
            }
            for (node, r) in &steps {
                engine.merge(&mut doc, *node, r).unwrap();
            }

            let heads: Vec<_> = navigate::elements_by_tag(&doc, "head")
                .map(|h| doc.text_content(h))
                .collect();
            assert_eq!(heads, vec!["Persons", "Organizations"], "pers_first = {pers_first}");
        }
    }
}

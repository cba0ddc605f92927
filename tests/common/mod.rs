//! Shared fixtures for merge-run integration tests
//!
//! A [`Fixture`] owns a scratch directory holding a finding-aid folder and
//! a record batch, and reads back whatever a run wrote.

#![allow(dead_code)]

use eadmerge::xml::{self, navigate, Document, NodeId};
use eadmerge::{MergeConfig, MergeRun, RunReport};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Fixture {
    root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(root.path().join("FINAL")).expect("create ead dir");
        Self { root }
    }

    pub fn ead_dir(&self) -> PathBuf {
        self.root.path().join("FINAL")
    }

    pub fn dump_path(&self) -> PathBuf {
        self.root.path().join("dump.json")
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.ead_dir().join("MERGED").join(name)
    }

    pub fn write_doc(&self, name: &str, content: &str) -> &Self {
        std::fs::write(self.ead_dir().join(name), content).expect("write document");
        self
    }

    pub fn write_doc_bytes(&self, name: &str, content: &[u8]) -> &Self {
        std::fs::write(self.ead_dir().join(name), content).expect("write document");
        self
    }

    pub fn write_records(&self, records: &[Value]) -> &Self {
        let text = serde_json::to_string_pretty(records).expect("encode records");
        std::fs::write(self.dump_path(), text).expect("write dump");
        self
    }

    pub fn run(&self) -> RunReport {
        self.run_with(MergeConfig::default())
    }

    pub fn run_with(&self, config: MergeConfig) -> RunReport {
        MergeRun::from_paths(config, &self.dump_path(), &self.ead_dir())
            .expect("prepare run")
            .run()
    }

    pub fn output(&self, name: &str) -> String {
        std::fs::read_to_string(self.output_path(name)).expect("read merged output")
    }

    pub fn output_doc(&self, name: &str) -> Document {
        xml::parse_str(&self.output(name)).expect("merged output parses")
    }
}

/// A finding aid with the given language code and `<descgrp>` body.
pub fn finding_aid(langcode: &str, descgrp: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <ead>\n\
         <eadheader><profiledesc><langusage><language langcode=\"{langcode}\">x</language></langusage></profiledesc></eadheader>\n\
         <archdesc level=\"fonds\">\n\
         <descgrp type=\"content_and_structure\">{descgrp}</descgrp>\n\
         </archdesc>\n\
         </ead>\n"
    )
}

/// A record whose golden candidate is `golden`, named `name`.
pub fn record(id: &str, kind: &str, golden: &str, name: &str) -> Value {
    json!({
        "id": id,
        "input": name,
        "type": kind,
        "golden": golden,
        "controlaccess": false,
        "method": "manual",
        "candidates": [
            {"id": "decoy", "names": ["Somebody Else"], "distance": 4},
            {"id": golden, "names": [name, "variant"], "distance": 0}
        ]
    })
}

/// Labels of the subgroups inside the first wrapper below `parent_tag`.
pub fn subgroup_labels(doc: &Document, parent_tag: &str) -> Vec<String> {
    let Some(wrapper) = wrapper_under(doc, parent_tag) else {
        return Vec::new();
    };
    doc.element_children(wrapper)
        .filter_map(|sub| navigate::first_child_with_tag(doc, sub, "head"))
        .map(|head| doc.text_content(head))
        .collect()
}

pub fn wrapper_under(doc: &Document, parent_tag: &str) -> Option<NodeId> {
    let parent = navigate::elements_by_tag(doc, parent_tag).next()?;
    navigate::first_child_with_tag(doc, parent, "controlaccess")
}

/// Leaves (non-label children) of the subgroup labelled `label`.
pub fn leaves(doc: &Document, parent_tag: &str, label: &str) -> Vec<NodeId> {
    let Some(wrapper) = wrapper_under(doc, parent_tag) else {
        return Vec::new();
    };
    let subgroup = doc.element_children(wrapper).find(|sub| {
        navigate::first_child_with_tag(doc, *sub, "head").is_some_and(|h| doc.text_content(h) == label)
    });
    match subgroup {
        Some(sub) => doc
            .element_children(sub)
            .filter(|c| doc.tag_name(*c) != Some("head"))
            .collect(),
        None => Vec::new(),
    }
}

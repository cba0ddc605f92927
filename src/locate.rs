//! Record locator
//!
//! Maps a record onto the one element its id points at: the n-th element
//! of the record's kind, counted over the whole document in document
//! order. Counting includes elements that already sit inside a grouping,
//! which is how the record producer numbers them; such elements are then
//! rejected as already grouped instead of being silently skipped over.

use crate::config::MergeConfig;
use crate::error::{RecordError, SkipReason};
use crate::record::{EntityKind, Record, RecordKey};
use crate::store::DocumentStore;
use crate::xml::{navigate, NodeId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A record joined with the element it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatch {
    pub key: RecordKey,
    /// Index of the originating record in the batch.
    pub record: usize,
    /// Document store key of the owning document.
    pub document: PathBuf,
    pub node: NodeId,
}

/// Outcome of locating one record that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Match(ResolvedMatch),
    Skip(SkipReason),
}

/// Resolved matches keyed by record key, iterated in first-resolution order.
///
/// Re-inserting a key replaces its match (last resolved wins) but keeps
/// the key's first position.
#[derive(Debug, Default)]
pub struct ResolvedMatches {
    order: Vec<RecordKey>,
    by_key: HashMap<RecordKey, ResolvedMatch>,
}

impl ResolvedMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a match; returns the match it replaced, if any.
    pub fn insert(&mut self, resolved: ResolvedMatch) -> Option<ResolvedMatch> {
        let key = resolved.key.clone();
        let previous = self.by_key.insert(key.clone(), resolved);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ResolvedMatch> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedMatch> + '_ {
        self.order.iter().filter_map(move |key| self.by_key.get(key))
    }
}

/// Resolves records against documents in one directory.
pub struct RecordLocator<'a> {
    config: &'a MergeConfig,
    document_dir: &'a Path,
}

impl<'a> RecordLocator<'a> {
    pub fn new(config: &'a MergeConfig, document_dir: &'a Path) -> Self {
        Self {
            config,
            document_dir,
        }
    }

    /// Locate the element `record` (batch index `index`) refers to.
    pub fn locate(
        &self,
        store: &mut DocumentStore,
        index: usize,
        record: &Record,
    ) -> Result<Located, RecordError> {
        let key = record.key();
        if record.decision().is_none() {
            info!(record = %key, "skip: {}", SkipReason::NoDecision);
            return Ok(Located::Skip(SkipReason::NoDecision));
        }
        if record.in_controlaccess() {
            info!(record = %key, "skip: {}", SkipReason::InControlaccess);
            return Ok(Located::Skip(SkipReason::InControlaccess));
        }
        if record.kind == EntityKind::Geographic {
            let reason = SkipReason::UnsupportedKind(record.kind);
            info!(record = %key, "skip: {reason}");
            return Ok(Located::Skip(reason));
        }

        let location = record.location()?;
        let path = self.document_dir.join(&location.document);
        let (document, doc) = store.get(&path)?;

        let tag = record.kind.element_name();
        let node = navigate::nth_element_by_tag(doc, tag, location.ordinal).ok_or_else(|| {
            RecordError::NodeNotFound {
                tag: tag.to_string(),
                ordinal: location.ordinal,
            }
        })?;

        let parent_is_wrapper = doc
            .parent(node)
            .and_then(|parent| doc.tag_name(parent))
            .is_some_and(|t| t == self.config.wrapper_tag);
        if parent_is_wrapper {
            info!(record = %key, "skip: {}", SkipReason::AlreadyGrouped);
            return Ok(Located::Skip(SkipReason::AlreadyGrouped));
        }

        debug!(record = %key, node = %node, document = %document.display(), "found node of record");
        Ok(Located::Match(ResolvedMatch {
            key,
            record: index,
            document,
            node,
        }))
    }
}

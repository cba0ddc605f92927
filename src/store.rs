//! Document store
//!
//! Parses each source document at most once per run and hands out the
//! cached tree afterwards. Load failures are cached as well, so every
//! record pointing at a broken file sees the same failure.

use crate::xml::{self, Document};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Why a source document could not be loaded. Cached per path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not read document {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("could not parse document {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("document {} was never loaded", .0.display())]
    NotLoaded(PathBuf),
}

/// Single-owner cache of parsed documents, keyed by canonical path.
#[derive(Debug, Default)]
pub struct DocumentStore {
    entries: HashMap<PathBuf, Result<Document, LoadError>>,
    /// Keys in first-load order.
    order: Vec<PathBuf>,
    modified: HashSet<PathBuf>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for `path`: canonical when the file exists, as given otherwise.
    pub fn key_for(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
    }

    /// Load (once) and return the document at `path`, with its cache key.
    pub fn get(&mut self, path: &Path) -> Result<(PathBuf, &Document), LoadError> {
        let key = Self::key_for(path);
        if !self.entries.contains_key(&key) {
            let loaded = load(&key);
            if let Err(err) = &loaded {
                error!(path = %key.display(), "{err}");
            } else {
                debug!(path = %key.display(), "parsed document");
            }
            self.order.push(key.clone());
            self.entries.insert(key.clone(), loaded);
        }
        match self.entries.get(&key) {
            Some(Ok(doc)) => Ok((key, doc)),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LoadError::NotLoaded(key)),
        }
    }

    /// A previously loaded document, by cache key.
    pub fn document(&self, key: &Path) -> Result<&Document, LoadError> {
        match self.entries.get(key) {
            Some(Ok(doc)) => Ok(doc),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LoadError::NotLoaded(key.to_path_buf())),
        }
    }

    /// Mutable access to a loaded document.
    pub fn document_mut(&mut self, key: &Path) -> Result<&mut Document, LoadError> {
        match self.entries.get_mut(key) {
            Some(Ok(doc)) => Ok(doc),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LoadError::NotLoaded(key.to_path_buf())),
        }
    }

    /// Flag a loaded document for writing.
    pub fn mark_modified(&mut self, key: &Path) {
        if matches!(self.entries.get(key), Some(Ok(_))) {
            self.modified.insert(key.to_path_buf());
        }
    }

    /// Number of paths attempted, failed loads included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_modified(&self, key: &Path) -> bool {
        self.modified.contains(key)
    }

    /// Modified documents in first-load order.
    pub fn modified_documents(&self) -> impl Iterator<Item = (&Path, &Document)> + '_ {
        self.order.iter().filter_map(move |key| {
            if !self.modified.contains(key) {
                return None;
            }
            match self.entries.get(key) {
                Some(Ok(doc)) => Some((key.as_path(), doc)),
                _ => None,
            }
        })
    }
}

fn load(path: &Path) -> Result<Document, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    xml::parse_bytes(&bytes).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

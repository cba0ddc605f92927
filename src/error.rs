//! Error and skip types shared by the run phases

use crate::config::ConfigError;
use crate::record::{BatchError, EntityKind, IdError, RecordKey};
use crate::store::LoadError;
use crate::xml::TreeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("document directory {} does not exist or is not a directory", .0.display())]
    DocumentDir(PathBuf),
}

/// Result type for run-level operations
pub type RunResult<T> = Result<T, RunError>;

/// Why a single record could not be resolved or merged.
///
/// These never abort the run; they are logged and collected in the report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error(transparent)]
    MalformedId(#[from] IdError),

    #[error(transparent)]
    Document(#[from] LoadError),

    #[error("no <{tag}> element at index {ordinal}")]
    NodeNotFound { tag: String, ordinal: usize },

    #[error("golden candidate {golden:?} not among candidates {candidates:?}")]
    MissingCandidate {
        golden: String,
        candidates: Vec<String>,
    },

    #[error("candidate {0:?} has no names")]
    EmptyCandidate(String),

    #[error("no permissible parent ({parents}) above the resolved node")]
    NoPermissibleParent { parents: String },

    #[error("no record with a decision for key {0}")]
    MissingRecord(RecordKey),

    #[error("tree mutation failed: {0}")]
    Tree(#[from] TreeError),
}

/// Why a record was deliberately left alone. Not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `golden` absent, blank or unknown.
    NoDecision,
    /// The record itself says it sits inside an authority grouping.
    InControlaccess,
    /// The resolved node is already a leaf of a grouping wrapper.
    AlreadyGrouped,
    /// Records of this kind never produce insertions.
    UnsupportedKind(EntityKind),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDecision => write!(f, "field 'golden' not set"),
            Self::InControlaccess => write!(f, "is in controlaccess"),
            Self::AlreadyGrouped => write!(f, "node already inside a grouping"),
            Self::UnsupportedKind(kind) => write!(f, "kind {kind} is not merged"),
        }
    }
}

/// A document that could not be written.
#[derive(Debug, Error)]
#[error("could not write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

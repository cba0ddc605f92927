//! Disambiguation records
//!
//! A record is one decision taken by the external ranking process: the
//! name occurrence it refers to (`id` + `type`), the candidates it was
//! offered, and the `golden` candidate that was accepted.

mod batch;
mod kind;

pub use batch::{load_batch, parse_batch, BatchError};
pub use kind::{EntityKind, Locale, UnknownKind};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Separator between the document name and the ordinal in a record id.
const ID_SEPARATOR: &str = ".xml-";

/// Golden value the annotation tool stores for "assessed, but unknown".
const UNKNOWN_GOLDEN: &str = "?";

/// Reads an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One proposed authority match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    /// Ranking distance; diagnostic only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub distance: f64,
}

/// One disambiguation decision for a name occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// `<document-name>.xml-<ordinal>`
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub golden: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Set when the occurrence already sits inside an authority grouping.
    #[serde(default)]
    pub controlaccess: Option<bool>,
    /// How the golden candidate was selected; carried for diagnostics.
    #[serde(default)]
    pub method: Option<String>,
}

/// Key joining a record with its resolved node: `<type-code>-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsed form of a record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLocation {
    /// File name of the document, `.xml` extension included.
    pub document: String,
    /// Zero-based index among same-tagged elements in document order.
    pub ordinal: usize,
}

/// Why a record id could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("record id {0:?} has no '.xml-' separator")]
    MissingSeparator(String),

    #[error("record id {0:?} has an empty document name")]
    EmptyDocument(String),

    #[error("record id {id:?} has a non-numeric ordinal {ordinal:?}")]
    BadOrdinal { id: String, ordinal: String },
}

impl RecordLocation {
    /// Split `"<name>.xml-<n>"` on the last separator.
    pub fn parse(id: &str) -> Result<Self, IdError> {
        let (name, ordinal) = id
            .rsplit_once(ID_SEPARATOR)
            .ok_or_else(|| IdError::MissingSeparator(id.to_string()))?;
        if name.is_empty() {
            return Err(IdError::EmptyDocument(id.to_string()));
        }
        let ordinal = ordinal
            .parse::<usize>()
            .map_err(|_| IdError::BadOrdinal {
                id: id.to_string(),
                ordinal: ordinal.to_string(),
            })?;
        Ok(Self {
            document: format!("{name}.xml"),
            ordinal,
        })
    }
}

impl Record {
    pub fn key(&self) -> RecordKey {
        RecordKey(format!("{}-{}", self.kind.code(), self.id))
    }

    /// The accepted candidate id, if a decision was taken.
    ///
    /// Absent, blank and `"?"` golden values all mean "no decision".
    pub fn decision(&self) -> Option<&str> {
        self.golden.as_deref().filter(|g| {
            let g = g.trim();
            !g.is_empty() && g != UNKNOWN_GOLDEN
        })
    }

    pub fn in_controlaccess(&self) -> bool {
        self.controlaccess.unwrap_or(false)
    }

    pub fn location(&self) -> Result<RecordLocation, IdError> {
        RecordLocation::parse(&self.id)
    }

    /// The candidate whose id equals `golden`.
    pub fn chosen_candidate(&self) -> Option<&Candidate> {
        let golden = self.decision()?;
        self.candidates.iter().find(|c| c.id == golden)
    }

    pub fn candidate_ids(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.id.clone()).collect()
    }
}

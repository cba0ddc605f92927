//! eadmerge: authority-name merging for EAD finding aids
//!
//! Takes a batch of disambiguation records (name occurrences with an
//! accepted authority candidate) and writes each accepted name into the
//! `controlaccess` grouping of the finding aid it came from.
//!
//! # Core Concepts
//!
//! - **Records**: one decision each, addressing an element as
//!   `<document>.xml-<ordinal>` among elements of the record's kind
//! - **Document store**: parses every finding aid once and keeps the
//!   mutated tree for the rest of the run
//! - **Merge engine**: finds or creates wrapper, per-kind subgroup and
//!   leaf; idempotent on leaf text
//!
//! # Example
//!
//! ```no_run
//! use eadmerge::{MergeConfig, MergeRun};
//! use std::path::Path;
//!
//! let run = MergeRun::from_paths(
//!     MergeConfig::default(),
//!     Path::new("dump.json"),
//!     Path::new("ead/"),
//! )?;
//! let report = run.run();
//! println!("{} documents written", report.written.len());
//! # Ok::<(), eadmerge::RunError>(())
//! ```

pub mod config;
mod error;
pub mod locate;
pub mod merge;
pub mod record;
mod run;
pub mod store;
mod writer;
pub mod xml;

pub use config::{ConfigError, MergeConfig};
pub use error::{RecordError, RunError, RunResult, SkipReason, WriteError};
pub use locate::{Located, RecordLocator, ResolvedMatch, ResolvedMatches};
pub use merge::{LeafAction, MergeEngine, MergeOutcome};
pub use record::{Candidate, EntityKind, Locale, Record, RecordKey};
pub use run::{MergeRun, RecordFailure, RunReport, Stage};
pub use store::{DocumentStore, LoadError};
pub use writer::DocumentWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

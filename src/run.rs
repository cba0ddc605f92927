//! Three-phase merge run
//!
//! 1. resolve every record to a node (documents load lazily here)
//! 2. merge every resolved match, in resolution order
//! 3. write every modified document once
//!
//! Phases never interleave: resolution only ever sees unmerged trees.
//! All per-run state lives on [`MergeRun`]; nothing is global.

use crate::config::MergeConfig;
use crate::error::{RecordError, RunError, RunResult, SkipReason, WriteError};
use crate::locate::{Located, RecordLocator, ResolvedMatches};
use crate::merge::{LeafAction, MergeEngine, MergeOutcome};
use crate::record::{self, Record, RecordKey};
use crate::store::DocumentStore;
use crate::writer::DocumentWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Phase in which a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Merge,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolve => write!(f, "resolve"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// A record that failed, with the phase it failed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub key: RecordKey,
    pub stage: Stage,
    pub error: RecordError,
}

/// Everything that happened during a run.
///
/// The run itself never fails on per-record or per-document problems;
/// the caller decides what they mean for the exit status.
#[derive(Debug, Default)]
pub struct RunReport {
    pub records: usize,
    pub resolved: usize,
    /// Matches replaced by a later record with the same key.
    pub replaced: usize,
    pub skipped: Vec<(RecordKey, SkipReason)>,
    pub failures: Vec<RecordFailure>,
    pub merged: Vec<(RecordKey, MergeOutcome)>,
    pub written: Vec<PathBuf>,
    pub write_failures: Vec<WriteError>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.write_failures.is_empty()
    }

    pub fn created(&self) -> usize {
        self.merged
            .iter()
            .filter(|(_, outcome)| outcome.action == LeafAction::Created)
            .count()
    }

    pub fn refreshed(&self) -> usize {
        self.merged.len() - self.created()
    }

    fn fail(&mut self, key: RecordKey, stage: Stage, error: RecordError) {
        warn!(record = %key, stage = %stage, "{error}");
        self.failures.push(RecordFailure { key, stage, error });
    }
}

/// Run context: the batch, the document cache and the resolved matches.
pub struct MergeRun {
    config: MergeConfig,
    document_dir: PathBuf,
    records: Vec<Record>,
    store: DocumentStore,
    matches: ResolvedMatches,
}

impl MergeRun {
    /// Prepare a run over already-loaded records.
    pub fn new(config: MergeConfig, document_dir: impl Into<PathBuf>, records: Vec<Record>) -> RunResult<Self> {
        let document_dir = document_dir.into();
        config.validate()?;
        if !document_dir.is_dir() {
            return Err(RunError::DocumentDir(document_dir));
        }
        Ok(Self {
            config,
            document_dir,
            records,
            store: DocumentStore::new(),
            matches: ResolvedMatches::new(),
        })
    }

    /// Prepare a run by reading the record batch at `batch`.
    pub fn from_paths(config: MergeConfig, batch: &Path, document_dir: &Path) -> RunResult<Self> {
        let records = record::load_batch(batch)?;
        info!(records = records.len(), batch = %batch.display(), "loaded record batch");
        Self::new(config, document_dir, records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn matches(&self) -> &ResolvedMatches {
        &self.matches
    }

    /// Phase 1: locate every record.
    pub fn resolve(&mut self, report: &mut RunReport) {
        let locator = RecordLocator::new(&self.config, &self.document_dir);
        report.records = self.records.len();
        for (index, record) in self.records.iter().enumerate() {
            match locator.locate(&mut self.store, index, record) {
                Ok(Located::Match(resolved)) => {
                    report.resolved += 1;
                    if let Some(previous) = self.matches.insert(resolved) {
                        warn!(record = %previous.key, "duplicate record key, later record wins");
                        report.replaced += 1;
                    }
                }
                Ok(Located::Skip(reason)) => report.skipped.push((record.key(), reason)),
                Err(err) => report.fail(record.key(), Stage::Resolve, err),
            }
        }
        info!(resolved = self.matches.len(), "resolved records");
    }

    /// Phase 2: merge every resolved match into its document.
    pub fn merge(&mut self, report: &mut RunReport) {
        let engine = MergeEngine::new(&self.config);
        for resolved in self.matches.iter() {
            let record = self
                .records
                .get(resolved.record)
                .filter(|r| r.key() == resolved.key && r.decision().is_some());
            let Some(record) = record else {
                error!(record = %resolved.key, "resolved match lost its record");
                report.fail(
                    resolved.key.clone(),
                    Stage::Merge,
                    RecordError::MissingRecord(resolved.key.clone()),
                );
                continue;
            };
            let result = self
                .store
                .document_mut(&resolved.document)
                .map_err(RecordError::from)
                .and_then(|doc| engine.merge(doc, resolved.node, record));
            match result {
                Ok(outcome) => {
                    self.store.mark_modified(&resolved.document);
                    report.merged.push((resolved.key.clone(), outcome));
                }
                Err(err) => report.fail(resolved.key.clone(), Stage::Merge, err),
            }
        }
    }

    /// Phase 3: write each modified document once.
    pub fn write(&self, report: &mut RunReport) {
        let writer = DocumentWriter::new(&self.document_dir, &self.config.output_folder);
        for (source, doc) in self.store.modified_documents() {
            match writer.write(source, doc) {
                Ok(path) => report.written.push(path),
                Err(err) => {
                    error!("{err}");
                    report.write_failures.push(err);
                }
            }
        }
    }

    /// Run all three phases.
    pub fn run(mut self) -> RunReport {
        let mut report = RunReport::default();
        self.resolve(&mut report);
        self.merge(&mut report);
        self.write(&mut report);
        info!(
            records = report.records,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            created = report.created(),
            refreshed = report.refreshed(),
            written = report.written.len(),
            "merge run finished"
        );
        report
    }
}

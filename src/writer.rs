//! Document writer
//!
//! Persists merged trees as `<document-dir>/<output-folder>/<file-name>`.

use crate::error::WriteError;
use crate::xml::{self, Document};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes merged documents into one output folder.
pub struct DocumentWriter {
    output_dir: PathBuf,
}

impl DocumentWriter {
    /// Writer targeting `document_dir/output_folder`.
    pub fn new(document_dir: &Path, output_folder: &str) -> Self {
        Self {
            output_dir: document_dir.join(output_folder),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination for the document loaded from `source`.
    pub fn destination(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) => self.output_dir.join(name),
            None => self.output_dir.join(source),
        }
    }

    /// Serialize `doc` next to its siblings in the output folder.
    pub fn write(&self, source: &Path, doc: &Document) -> Result<PathBuf, WriteError> {
        let path = self.destination(source);
        let io_err = |source| WriteError {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.output_dir).map_err(io_err)?;
        std::fs::write(&path, xml::to_string(doc)).map_err(io_err)?;
        info!(path = %path.display(), "wrote merged document");
        Ok(path)
    }
}

use crate::document::RunDocument;
use crate::load_run_document_file;
use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default extension of run document files.
pub const DEFAULT_EXTENSION: &str = "json";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Run document directory not found: {path:?}")]
    DirectoryNotFound { path: PathBuf },
    #[error("No run document with index {index}, the source holds {len}")]
    NoSuchDocument { index: usize, len: usize },
}

/// Provides the run documents that make up a dataset.
///
/// Sources are read-only. Implementations must return the same ids in the same order for as long
/// as the underlying data does not change, since that order decides table row order.
pub trait DocumentSource {
    type Id: std::fmt::Debug;

    /// List the documents currently available.
    fn list(&self) -> anyhow::Result<Vec<Self::Id>>;

    /// Read one listed document.
    fn read(&self, id: &Self::Id) -> anyhow::Result<RunDocument>;
}

/// All run documents with a given extension inside one directory.
///
/// Sub-directories are not searched. Files are listed in file name order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.extension)
            .unwrap_or(false)
    }
}

impl DocumentSource for DirectorySource {
    type Id = PathBuf;

    fn list(&self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: self.path.clone(),
            }
            .into());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.path)
            .with_context(|| format!("Failed to list {}", self.path.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            if self.matches_extension(&path) {
                paths.push(path);
            } else {
                log::trace!("Skipping {}", path.display());
            }
        }
        paths.sort();

        log::debug!(
            "Found {} run documents in {}",
            paths.len(),
            self.path.display()
        );

        Ok(paths)
    }

    fn read(&self, id: &PathBuf) -> anyhow::Result<RunDocument> {
        load_run_document_file(id)
    }
}

/// Run documents that are already in memory, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<RunDocument>,
}

impl MemorySource {
    pub fn new(documents: Vec<RunDocument>) -> Self {
        Self { documents }
    }

    pub fn push(&mut self, document: RunDocument) {
        self.documents.push(document);
    }
}

impl DocumentSource for MemorySource {
    type Id = usize;

    fn list(&self) -> anyhow::Result<Vec<usize>> {
        Ok((0..self.documents.len()).collect())
    }

    fn read(&self, id: &usize) -> anyhow::Result<RunDocument> {
        self.documents
            .get(*id)
            .cloned()
            .ok_or_else(|| {
                SourceError::NoSuchDocument {
                    index: *id,
                    len: self.documents.len(),
                }
                .into()
            })
    }
}

use anyhow::Context;
use std::io::Read;
use std::path::Path;

mod document;
mod record;
mod source;

pub use document::{
    AssemblyState, AssemblyStructureDetails, EnvironmentDetails, EnvironmentSection, MemoryState,
    NetworkCount, NetworkState, RunDocument, StepDetail, TimerState, TimerStats,
    UNKNOWN_BASELINE,
};
pub use record::{extract_records, Metric, MetricRecord, BASELINE_COLUMN, STEP_ID_COLUMN};
pub use source::{DirectorySource, DocumentSource, MemorySource, SourceError, DEFAULT_EXTENSION};

/// Load a run document from a reader
///
/// The top level of the document must be a JSON object. Anything below it may be missing.
pub fn load_run_document<R: Read>(reader: R) -> anyhow::Result<RunDocument> {
    let reader = std::io::BufReader::new(reader);
    let document: RunDocument = serde_json::from_reader(reader)?;
    Ok(document)
}

/// Load a run document from a file
pub fn load_run_document_file(path: &Path) -> anyhow::Result<RunDocument> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open run document {}", path.display()))?;
    load_run_document(file)
        .with_context(|| format!("Failed to parse run document {}", path.display()))
}

//! Check runner
//!
//! Loads the corpus, runs the full analysis and assembles the report.

use crate::error::{TraceError, TraceResult};
use crate::report::TraceabilityReport;
use aidd_corpus::{CorpusLayer, LoadedCorpus};
use aidd_trace::{extract_references, find_placeholders, ConsistencyAnalyzer, IdentifierRegistry};
use std::path::PathBuf;

/// Analyze an already loaded corpus
#[must_use]
pub fn analyze_corpus(corpus: &LoadedCorpus) -> TraceabilityReport {
    let registry = IdentifierRegistry::build(&corpus.documents);
    let references = extract_references(&corpus.documents);
    let placeholders = find_placeholders(&corpus.documents);
    let analysis = ConsistencyAnalyzer::new().analyze(&registry, &references, &placeholders);

    tracing::info!(
        ids = analysis.ids_found,
        references = analysis.references_found,
        broken = analysis.broken_links.len(),
        pending = analysis.placeholders.len(),
        pass = analysis.overall_pass,
        "traceability analysed"
    );
    TraceabilityReport::build(corpus, &registry, references, analysis)
}

/// Load every file under `dirs` and check it
///
/// # Errors
/// [`TraceError::NoFiles`] when no corpus file exists under `dirs`.
pub fn run_check(layer: &CorpusLayer, dirs: &[PathBuf]) -> TraceResult<TraceabilityReport> {
    let corpus = layer.load(dirs);
    if corpus.is_empty() {
        return Err(TraceError::NoFiles("--dirs".to_string()));
    }
    Ok(analyze_corpus(&corpus))
}

//! Main annotator entry point

use crate::api::config::AnnotatorConfig;
use crate::api::output::{AnnotationSet, FamilyCounts, RunStats};
use crate::application::pipeline::run_document;
use crate::definition::{CompiledMarkerSet, MarkerDefinition};
use crate::error::{DefinitionError, Result};

/// Compiled annotation engine for one definition set
///
/// Compiling validates patterns, formulas, and hierarchy references once;
/// the annotator is then immutable and safe to share across threads.
#[derive(Debug)]
pub struct Annotator {
    set: CompiledMarkerSet,
    config: AnnotatorConfig,
}

impl Annotator {
    /// Compile a definition set with the default configuration
    pub fn new(definitions: &[MarkerDefinition]) -> std::result::Result<Self, DefinitionError> {
        Self::with_config(definitions, AnnotatorConfig::default())
    }

    /// Compile a definition set with a custom configuration
    pub fn with_config(
        definitions: &[MarkerDefinition],
        config: AnnotatorConfig,
    ) -> std::result::Result<Self, DefinitionError> {
        let set = CompiledMarkerSet::compile(definitions)?;
        Ok(Self { set, config })
    }

    /// Annotate one document
    ///
    /// Pure and synchronous: identical inputs yield bit-identical results.
    /// Recovered per-definition and per-window failures are reported in
    /// the result's diagnostics list, not as errors.
    pub fn annotate(&self, text: &str) -> Result<AnnotationSet> {
        let run = run_document(text, &self.set, &self.config)?;

        let mut family_counts = FamilyCounts::default();
        let annotations: Vec<_> = run
            .annotations
            .into_iter()
            .map(|candidate| {
                family_counts.add(candidate.family);
                candidate.into()
            })
            .collect();

        Ok(AnnotationSet {
            stats: RunStats {
                atomic_candidates: run.atomic_candidates,
                composed_candidates: run.composed_candidates,
                reported: annotations.len(),
                windows: run.windows,
            },
            family_counts,
            annotations,
            diagnostics: run.diagnostics,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Number of compiled definitions
    pub fn marker_count(&self) -> usize {
        self.set.len()
    }
}

/// Annotate one document with a one-off definition set
///
/// Convenience wrapper that compiles the definitions per call; keep an
/// [`Annotator`] around when processing more than one document.
pub fn annotate(
    text: &str,
    definitions: &[MarkerDefinition],
    config: &AnnotatorConfig,
) -> Result<AnnotationSet> {
    Annotator::with_config(definitions, config.clone())?.annotate(text)
}

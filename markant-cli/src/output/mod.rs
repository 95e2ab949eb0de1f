//! Report rendering
//!
//! One report per input document, either machine-readable JSON
//! (`.ann.json`, the batch format) or a human-readable text listing.

use anyhow::Result;
use markant_core::{Annotation, AnnotationSet, Diagnostic, FamilyCounts, RunStats};
use serde::Serialize;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Annotation document as pretty-printed JSON
    Json,
    /// Human-readable annotation listing
    Text,
}

impl OutputFormat {
    /// File extension for reports written to an output directory
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "ann.json",
            OutputFormat::Text => "ann.txt",
        }
    }
}

/// One document's annotation report
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    /// Input file name
    pub source: String,
    /// Reported annotations
    pub annotations: Vec<Annotation>,
    /// Per-family summary
    pub family_counts: FamilyCounts,
    /// Run counters
    pub stats: RunStats,
    /// Recovered failures
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentReport {
    /// Package an annotation set under its source name
    pub fn new(source: String, set: AnnotationSet) -> Self {
        Self {
            source,
            annotations: set.annotations,
            family_counts: set.family_counts,
            stats: set.stats,
            diagnostics: set.diagnostics,
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat, text: &str) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.render_text(text)),
        }
    }

    fn render_text(&self, text: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}: {} annotations ({} windows)\n",
            self.source, self.stats.reported, self.stats.windows
        ));
        for annotation in &self.annotations {
            let snippet: String = text
                .get(annotation.start..annotation.end)
                .unwrap_or("")
                .chars()
                .take(60)
                .collect();
            out.push_str(&format!(
                "  {:>6}..{:<6} {:<4} {:<32} {:.2}  {:?}\n",
                annotation.start,
                annotation.end,
                annotation.family.as_str(),
                annotation.marker_id,
                annotation.score,
                snippet
            ));
        }
        for diagnostic in &self.diagnostics {
            out.push_str(&format!("  warning: {diagnostic:?}\n"));
        }
        out
    }
}

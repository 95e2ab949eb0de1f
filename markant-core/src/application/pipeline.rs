//! Per-window pipeline and whole-document orchestration
//!
//! Each window runs the full pipeline — segment, match, compose, resolve
//! spans, resolve overlaps — on its own slice with no shared mutable
//! state; the compiled definition set is borrowed read-only. Window
//! results are shifted into document coordinates, exact duplicates from
//! overlap margins collapse, and one final overlap-resolution pass runs
//! globally. A window that fails is reported and excluded; its siblings
//! still produce results.

use crate::api::config::AnnotatorConfig;
use crate::application::chunker::split_windows;
use crate::definition::CompiledMarkerSet;
use crate::domain::boundary::Boundaries;
use crate::domain::candidate::MatchCandidate;
use crate::domain::compose::compose;
use crate::domain::matcher::match_atomics;
use crate::domain::overlap::resolve_overlaps;
use crate::domain::span::resolve_spans;
use crate::error::{Diagnostic, EngineError};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of one window's pipeline run
struct WindowOutput {
    candidates: Vec<MatchCandidate>,
    diagnostics: Vec<Diagnostic>,
    atomic_candidates: usize,
    composed_candidates: usize,
}

/// Result of a whole-document run, before API packaging
#[derive(Debug)]
pub(crate) struct DocumentRun {
    /// Final conflict-free candidates in document coordinates
    pub(crate) annotations: Vec<MatchCandidate>,
    /// Recovered per-definition and per-window failures
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Number of windows processed
    pub(crate) windows: usize,
    /// Atomic candidates produced across windows
    pub(crate) atomic_candidates: usize,
    /// Composed candidates produced across windows
    pub(crate) composed_candidates: usize,
}

/// Run the full pipeline over one document
pub(crate) fn run_document(
    text: &str,
    set: &CompiledMarkerSet,
    config: &AnnotatorConfig,
) -> Result<DocumentRun, EngineError> {
    if text.len() > config.max_input_bytes {
        return Err(EngineError::InputTooLarge {
            len: text.len(),
            cap: config.max_input_bytes,
        });
    }

    if text.len() <= config.chunk_threshold_bytes {
        let output = run_window(text, set, config);
        return Ok(DocumentRun {
            annotations: output.candidates,
            diagnostics: output.diagnostics,
            windows: 1,
            atomic_candidates: output.atomic_candidates,
            composed_candidates: output.composed_candidates,
        });
    }

    let windows = split_windows(text, config.chunk_threshold_bytes, config.chunk_overlap_bytes);
    let outputs = run_windows(text, &windows, set, config)?;

    let mut merged: Vec<MatchCandidate> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<(String, usize, usize)> = HashSet::new();
    let mut atomic_candidates = 0;
    let mut composed_candidates = 0;

    for (index, (window, output)) in windows.iter().zip(outputs).enumerate() {
        match output {
            Ok(output) => {
                diagnostics.extend(output.diagnostics);
                atomic_candidates += output.atomic_candidates;
                composed_candidates += output.composed_candidates;
                for candidate in output.candidates {
                    let candidate = candidate.offset_by(window.start);
                    // Overlap-margin duplicates collapse to one detection
                    let key = (candidate.marker_id.clone(), candidate.start, candidate.end);
                    if seen.insert(key) {
                        merged.push(candidate);
                    }
                }
            }
            Err(reason) => diagnostics.push(Diagnostic::WindowFailed { index, reason }),
        }
    }

    // One global pass collapses cross-window conflicts with the same
    // tie-break rules the windows used
    let annotations = resolve_overlaps(merged, &config.family_priority);

    Ok(DocumentRun {
        annotations,
        diagnostics,
        windows: windows.len(),
        atomic_candidates,
        composed_candidates,
    })
}

/// Process every window on a dedicated thread pool
#[cfg(feature = "parallel")]
fn run_windows(
    text: &str,
    windows: &[crate::application::chunker::ChunkWindow],
    set: &CompiledMarkerSet,
    config: &AnnotatorConfig,
) -> Result<Vec<Result<WindowOutput, String>>, EngineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.unwrap_or_else(num_cpus::get))
        .build()
        .map_err(|e| EngineError::Config(e.to_string()))?;
    Ok(pool.install(|| {
        windows
            .par_iter()
            .map(|window| guarded_window(&text[window.start..window.end], set, config))
            .collect()
    }))
}

/// Process every window sequentially
#[cfg(not(feature = "parallel"))]
fn run_windows(
    text: &str,
    windows: &[crate::application::chunker::ChunkWindow],
    set: &CompiledMarkerSet,
    config: &AnnotatorConfig,
) -> Result<Vec<Result<WindowOutput, String>>, EngineError> {
    Ok(windows
        .iter()
        .map(|window| guarded_window(&text[window.start..window.end], set, config))
        .collect())
}

/// Run one window, converting a panic into an isolated failure
fn guarded_window(
    text: &str,
    set: &CompiledMarkerSet,
    config: &AnnotatorConfig,
) -> Result<WindowOutput, String> {
    catch_unwind(AssertUnwindSafe(|| run_window(text, set, config))).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "window processing panicked".to_string())
    })
}

/// The pipeline for one window, in window-local coordinates
fn run_window(text: &str, set: &CompiledMarkerSet, config: &AnnotatorConfig) -> WindowOutput {
    let boundaries = Boundaries::segment(text);
    let mut arena = match_atomics(text, set);
    let atomic_candidates = arena.len();
    let diagnostics = compose(
        &mut arena,
        set,
        &boundaries,
        config.composed_min_score_default,
    );
    let composed_candidates = arena.len() - atomic_candidates;
    resolve_spans(&mut arena, set, &boundaries, text);
    let candidates = resolve_overlaps(arena, &config.family_priority);

    WindowOutput {
        candidates,
        diagnostics,
        atomic_candidates,
        composed_candidates,
    }
}

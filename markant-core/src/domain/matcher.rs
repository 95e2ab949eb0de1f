//! Atomic marker detection
//!
//! Scans the text with every compiled pattern of every atomic definition.
//! Occurrences of one pattern are non-overlapping (`find_iter` semantics);
//! different patterns of the same marker may produce overlapping spans and
//! both are kept — cross-marker conflicts are resolved later. Runs in time
//! linear in text length per pattern.

use crate::definition::{AtomicMarker, CompiledMarkerSet, MarkerKind};
use crate::domain::candidate::MatchCandidate;
use smallvec::SmallVec;
use std::collections::HashSet;

/// Score penalty for literal-derived patterns, matching the original
/// engine's match-quality factor for non-regex evidence
const LITERAL_PENALTY: f64 = 0.1;
const LITERAL_FLOOR: f64 = 0.4;

/// Find all atomic marker occurrences in the text
pub fn match_atomics(text: &str, set: &CompiledMarkerSet) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for marker in set.atomics() {
        let demote_spans = demote_spans(text, marker);
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for pattern in &marker.patterns {
            for hit in pattern.regex.find_iter(text) {
                let (start, end) = (hit.start(), hit.end());
                if end <= start {
                    continue;
                }
                // Identical spans from sibling patterns collapse to one
                if !seen.insert((start, end)) {
                    continue;
                }
                if overlaps_any(start, end, &demote_spans) {
                    continue;
                }

                let score = if pattern.literal {
                    (marker.score - LITERAL_PENALTY).max(LITERAL_FLOOR)
                } else {
                    marker.score
                };

                candidates.push(MatchCandidate {
                    marker_id: marker.id.clone(),
                    family: marker.family,
                    kind: MarkerKind::Atomic,
                    start,
                    end,
                    score,
                    label: marker.label.clone(),
                    source_children: SmallVec::new(),
                });
            }
        }
    }

    // Stable order for everything downstream
    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    candidates
}

/// Occurrences of a marker's demote patterns; any atomic match overlapping
/// one of these spans is suppressed
fn demote_spans(text: &str, marker: &AtomicMarker) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    for regex in &marker.demote {
        for hit in regex.find_iter(text) {
            if hit.end() > hit.start() {
                spans.push((hit.start(), hit.end()));
            }
        }
    }
    spans
}

fn overlaps_any(start: usize, end: usize, spans: &[(usize, usize)]) -> bool {
    spans.iter().any(|&(s, e)| start < e && s < end)
}

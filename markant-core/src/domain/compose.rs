//! Bottom-up composition across the marker hierarchy
//!
//! Levels are evaluated in the fixed order SEM → CLU → MEMA. Each level
//! binds only candidates from strictly lower levels, grouped into sentence
//! windows, and each level's output is immutable once produced. A child
//! candidate contributes to at most one emission per composed marker, so
//! sliding windows never duplicate a detection over the same evidence.

use crate::definition::{CompiledMarkerSet, ComposedMarker, Family, MarkerKind};
use crate::domain::boundary::Boundaries;
use crate::domain::candidate::MatchCandidate;
use crate::domain::expr::{self, Bindings};
use crate::error::Diagnostic;
use smallvec::SmallVec;
use std::collections::HashSet;

/// Run all composition levels over the arena, appending composed
/// candidates and returning recovered per-definition failures
pub fn compose(
    arena: &mut Vec<MatchCandidate>,
    set: &CompiledMarkerSet,
    boundaries: &Boundaries,
    min_score_default: f64,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let sentence_count = boundaries.sentences.len();
    if sentence_count == 0 {
        return diagnostics;
    }

    for level in Family::composed_levels() {
        // Bucket lower-level candidates by the sentence holding their midpoint
        let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); sentence_count];
        for (idx, candidate) in arena.iter().enumerate() {
            if candidate.family.rank() < level.rank() {
                if let Some(s) = boundaries.sentence_index_at(candidate.midpoint()) {
                    buckets[s].push(idx as u32);
                }
            }
        }

        let mut additions = Vec::new();
        for marker in set.composed_at(level) {
            evaluate_marker(
                marker,
                arena,
                &buckets,
                min_score_default,
                &mut additions,
                &mut diagnostics,
            );
        }
        arena.extend(additions);
    }

    diagnostics
}

fn evaluate_marker(
    marker: &ComposedMarker,
    arena: &[MatchCandidate],
    buckets: &[Vec<u32>],
    min_score_default: f64,
    additions: &mut Vec<MatchCandidate>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let max_window = marker
        .span_policy
        .map(|p| p.max_sentence_span.max(1))
        .unwrap_or(1);
    let min_score = marker.min_score.unwrap_or(min_score_default);
    let mut used: HashSet<u32> = HashSet::new();

    'windows: for window in 0..buckets.len() {
        for width in 1..=max_window {
            let last = (window + width - 1).min(buckets.len() - 1);

            let mut contributing: Vec<u32> = Vec::new();
            for bucket in &buckets[window..=last] {
                for &idx in bucket {
                    let child_id = arena[idx as usize].marker_id.as_str();
                    if marker.children.iter().any(|c| c.marker_id == child_id) {
                        contributing.push(idx);
                    }
                }
            }
            if contributing.is_empty() {
                continue;
            }
            // First qualifying window wins: evidence is never reused
            if contributing.iter().any(|idx| used.contains(idx)) {
                continue;
            }

            let mut bindings = Bindings::new();
            let mut total_children = 0usize;
            let mut weighted = 0.0;
            let mut weight_sum = 0.0;
            for child in &marker.children {
                let mut count = 0usize;
                for &idx in &contributing {
                    if arena[idx as usize].marker_id == child.marker_id {
                        count += 1;
                        weighted += arena[idx as usize].score * child.weight;
                    }
                }
                bindings.set(&child.marker_id, count as f64);
                total_children += count;
                weight_sum += child.weight;
            }
            let score = if weight_sum > 0.0 {
                (weighted / weight_sum).min(1.0)
            } else {
                0.0
            };
            bindings.set("total_children", total_children as f64);
            bindings.set("score", score);

            match expr::evaluate(&marker.activation, &bindings) {
                Ok(value) if value.is_truthy() => {}
                Ok(_) => continue,
                Err(err) => {
                    diagnostics.push(Diagnostic::ActivationFailed {
                        marker_id: marker.id.clone(),
                        window,
                        reason: err.to_string(),
                    });
                    continue 'windows;
                }
            }
            if score < min_score {
                continue;
            }

            let mut family = marker.family;
            if let Some(promotion) = &marker.promotion {
                if let Some(gate) = &promotion.activate_when {
                    match expr::evaluate(gate, &bindings) {
                        Ok(value) if value.is_truthy() => {}
                        Ok(_) => continue,
                        Err(err) => {
                            diagnostics.push(Diagnostic::ActivationFailed {
                                marker_id: marker.id.clone(),
                                window,
                                reason: err.to_string(),
                            });
                            continue 'windows;
                        }
                    }
                }
                if let Some(floor) = promotion.min_score {
                    if score < floor {
                        continue;
                    }
                }
                if let Some(target) = promotion.promote_to {
                    family = target;
                }
            }

            // Provisional span: raw union of the contributing children;
            // final geometry is the span resolver's job
            let start = contributing
                .iter()
                .map(|&idx| arena[idx as usize].start)
                .min()
                .expect("nonempty contributing set");
            let end = contributing
                .iter()
                .map(|&idx| arena[idx as usize].end)
                .max()
                .expect("nonempty contributing set");

            used.extend(contributing.iter().copied());
            additions.push(MatchCandidate {
                marker_id: marker.id.clone(),
                family,
                kind: MarkerKind::Composed,
                start,
                end,
                score,
                label: marker.label.clone(),
                source_children: SmallVec::from_vec(contributing),
            });
            continue 'windows;
        }
    }
}

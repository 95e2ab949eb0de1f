//! Overlap resolution
//!
//! Reduces the full candidate set to a conflict-free annotation set.
//! Conflict means sharing at least one byte. Candidates are ranked by the
//! tie-break chain — family priority, composed over atomic, score, span
//! length, start position — and admitted greedily in rank order; a
//! candidate conflicting with an already-admitted one is dropped whole.
//! The result never contains two overlapping spans, and candidates without
//! any conflict always pass through.

use crate::definition::{Family, MarkerKind};
use crate::domain::candidate::MatchCandidate;
use std::cmp::Ordering;

/// Default reporting priority: SEM > CLU > ATO > MEMA
pub const DEFAULT_FAMILY_PRIORITY: [Family; 4] =
    [Family::Sem, Family::Clu, Family::Ato, Family::Mema];

/// Position of a family in the priority order; lower wins
fn priority_rank(priority: &[Family; 4], family: Family) -> usize {
    priority
        .iter()
        .position(|f| *f == family)
        .expect("priority covers every family")
}

/// Full tie-break chain between two candidates; `Less` means `a` wins
fn compare(priority: &[Family; 4], a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    priority_rank(priority, a.family)
        .cmp(&priority_rank(priority, b.family))
        .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.marker_id.cmp(&b.marker_id))
}

fn kind_rank(kind: MarkerKind) -> u8 {
    match kind {
        MarkerKind::Composed => 0,
        MarkerKind::Atomic => 1,
    }
}

/// Resolve all conflicts, returning the surviving candidates ordered by
/// `(start, end)`
pub fn resolve_overlaps(
    mut candidates: Vec<MatchCandidate>,
    priority: &[Family; 4],
) -> Vec<MatchCandidate> {
    candidates.sort_by(|a, b| compare(priority, a, b));

    let mut kept: Vec<MatchCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|existing| existing.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    kept
}

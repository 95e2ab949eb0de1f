//! Span geometry resolution for composed candidates
//!
//! Applies each composed definition's declared span policy exactly once,
//! after all composition levels have run. Only the span is touched; score
//! and contributing children stay as composed. Updates are computed from
//! the provisional geometry of the whole arena before any are applied, so
//! resolution is independent of arena order.

use crate::definition::{CompiledMarkerSet, MarkerKind, SpanMode, SpanPolicy};
use crate::domain::boundary::{span_index_at, Boundaries, BoundarySpan};
use crate::domain::candidate::MatchCandidate;
use std::collections::HashMap;

/// Fallback byte radius when no token anchor can be located
const FALLBACK_RADIUS: usize = 50;

/// Resolve the spans of all composed candidates carrying a policy
pub fn resolve_spans(
    arena: &mut [MatchCandidate],
    set: &CompiledMarkerSet,
    boundaries: &Boundaries,
    text: &str,
) {
    let policies: HashMap<&str, SpanPolicy> = set
        .composed_markers()
        .iter()
        .filter_map(|m| m.span_policy.map(|p| (m.id.as_str(), p)))
        .collect();
    if policies.is_empty() {
        return;
    }

    let needs_tokens = policies
        .values()
        .any(|p| p.mode == SpanMode::AnchorWindow);
    let tokens = if needs_tokens {
        tokenize(text)
    } else {
        Vec::new()
    };

    let mut updates = Vec::new();
    for (idx, candidate) in arena.iter().enumerate() {
        if candidate.kind != MarkerKind::Composed {
            continue;
        }
        let Some(policy) = policies.get(candidate.marker_id.as_str()) else {
            continue;
        };

        let child_midpoints: Vec<usize> = candidate
            .source_children
            .iter()
            .map(|&child| arena[child as usize].midpoint())
            .collect();

        let span = match policy.mode {
            SpanMode::SentenceUnion => union_span(
                &boundaries.sentences,
                candidate.start,
                candidate.end,
                policy.max_sentence_span,
                &child_midpoints,
            ),
            SpanMode::ClauseUnion => union_span(
                &boundaries.clauses,
                candidate.start,
                candidate.end,
                policy.max_sentence_span,
                &child_midpoints,
            ),
            SpanMode::AnchorWindow => anchor_window(
                text,
                &tokens,
                candidate.start,
                candidate.end,
                policy.window_radius,
            ),
        };
        updates.push((idx, span));
    }

    for (idx, (start, end)) in updates {
        arena[idx].start = start;
        arena[idx].end = end;
    }
}

/// Union of the boundary spans overlapped by the candidate, capped
///
/// Over the cap, the contiguous cap-sized run holding the most
/// contributing-child midpoints survives; the earliest run wins ties.
fn union_span(
    spans: &[BoundarySpan],
    start: usize,
    end: usize,
    cap: usize,
    child_midpoints: &[usize],
) -> (usize, usize) {
    let cap = cap.max(1);
    let Some(first) = span_index_at(spans, start) else {
        return (start, end);
    };
    let last = span_index_at(spans, end.saturating_sub(1).max(start))
        .unwrap_or(spans.len() - 1);

    if last - first + 1 <= cap {
        return (spans[first].start, spans[last].end);
    }

    let mut best_run = first;
    let mut best_density = 0usize;
    for run in first..=(last + 1 - cap) {
        let lo = spans[run].start;
        let hi = spans[run + cap - 1].end;
        let density = child_midpoints
            .iter()
            .filter(|&&m| m >= lo && m < hi)
            .count();
        if density > best_density {
            best_density = density;
            best_run = run;
        }
    }
    (spans[best_run].start, spans[best_run + cap - 1].end)
}

/// Fixed token window around the earliest contributing child's start
fn anchor_window(
    text: &str,
    tokens: &[(usize, usize)],
    start: usize,
    end: usize,
    radius: usize,
) -> (usize, usize) {
    let anchor = tokens.partition_point(|&(_, token_end)| token_end <= start);
    if anchor < tokens.len() && tokens[anchor].0 <= start {
        let left = anchor.saturating_sub(radius);
        let right = (anchor + radius).min(tokens.len() - 1);
        return (tokens[left].0, tokens[right].1);
    }

    // No covering token: fall back to a byte window snapped to char
    // boundaries
    let mut lo = start.saturating_sub(FALLBACK_RADIUS);
    while !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + FALLBACK_RADIUS).min(text.len());
    while !text.is_char_boundary(hi) {
        hi -= 1;
    }
    (lo, hi)
}

/// Alphanumeric token spans of the text
fn tokenize(text: &str) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            tokens.push((s, i));
        }
    }
    if let Some(s) = start {
        tokens.push((s, text.len()));
    }
    tokens
}

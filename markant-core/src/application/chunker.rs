//! Window splitting for large documents
//!
//! Windows are cut at sentence boundaries, never mid-sentence, and overlap
//! by roughly the configured margin so detections near a cut are fully
//! contained in at least one window. Offsets stay in the document's
//! coordinate space; each window is a plain byte range.

use crate::domain::boundary::{span_index_at, BoundarySpan, SentenceIter};

/// One processing window over the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWindow {
    /// Byte start in the document, inclusive
    pub start: usize,
    /// Byte end in the document, exclusive
    pub end: usize,
}

impl ChunkWindow {
    /// Window length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for an empty window (never produced by the splitter)
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Split a document into overlapping sentence-aligned windows
///
/// Documents at or under the threshold come back as a single window.
pub fn split_windows(text: &str, threshold: usize, overlap: usize) -> Vec<ChunkWindow> {
    if text.len() <= threshold {
        return vec![ChunkWindow {
            start: 0,
            end: text.len(),
        }];
    }

    let sentences: Vec<BoundarySpan> = SentenceIter::new(text).collect();
    if sentences.len() <= 1 {
        // One giant sentence cannot be split safely
        return vec![ChunkWindow {
            start: 0,
            end: text.len(),
        }];
    }

    let last = sentences.len() - 1;
    let mut windows = Vec::new();
    let mut first = 0;

    loop {
        let window_start = sentences[first].start;
        let mut cut = first;
        while cut < last && sentences[cut].end - window_start < threshold {
            cut += 1;
        }
        let window_end = sentences[cut].end;
        windows.push(ChunkWindow {
            start: window_start,
            end: window_end,
        });
        if cut == last {
            break;
        }

        // Step back into the overlap margin, staying sentence-aligned and
        // always making progress
        let target = window_end.saturating_sub(overlap);
        let next = span_index_at(&sentences, target).unwrap_or(cut);
        first = next.clamp(first + 1, cut + 1);
    }

    windows
}

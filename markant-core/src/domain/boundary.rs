//! Sentence and clause boundary detection
//!
//! Sentences end at terminal punctuation followed by optional closing
//! quotes/brackets and whitespace, with an uppercase/digit start check on
//! the next sentence; dots after listed abbreviations never split, and
//! ambiguous cases fall back to "no split". Clauses additionally split at
//! commas, semicolons, colons, and a fixed list of coordinating
//! conjunctions. Both span sequences are non-overlapping and cover the
//! whole text.

/// Kind of a detected boundary span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// A full sentence
    Sentence,
    /// A clause within a sentence
    Clause,
}

/// A half-open segment of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundarySpan {
    /// Byte start, inclusive
    pub start: usize,
    /// Byte end, exclusive
    pub end: usize,
    /// Sentence or clause
    pub kind: BoundaryKind,
}

/// Sentence-terminal characters
const TERMINALS: [char; 4] = ['.', '!', '?', '…'];

/// Closing quotes/brackets swallowed into the ending sentence
const CLOSERS: [char; 10] = ['"', '\'', ')', ']', '}', '»', '«', '“', '”', '’'];

/// Characters that may open a new sentence besides uppercase/digits
const OPENERS: [char; 9] = ['"', '\'', '„', '“', '«', '»', '‚', '(', '['];

/// Dot-final tokens that never end a sentence
const ABBREVIATIONS: [&str; 20] = [
    "z.b.", "d.h.", "u.a.", "u.u.", "usw.", "bzw.", "vgl.", "ca.", "nr.", "dr.", "prof.",
    "abs.", "evtl.", "ggf.", "etc.", "e.g.", "i.e.", "mr.", "mrs.", "st.",
];

/// Coordinating conjunctions that open a new clause
const CONJUNCTIONS: [&str; 8] = ["und", "oder", "aber", "denn", "sondern", "and", "or", "but"];

/// Lazy, restartable sentence iterator
///
/// Yields non-overlapping spans covering the whole text; recreating the
/// iterator over the same input yields the identical sequence.
#[derive(Debug, Clone)]
pub struct SentenceIter<'a> {
    text: &'a str,
    start: usize,
    cursor: usize,
}

impl<'a> SentenceIter<'a> {
    /// Start a fresh pass over the text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            start: 0,
            cursor: 0,
        }
    }

    fn emit(&mut self, end: usize, next_start: usize, next_cursor: usize) -> BoundarySpan {
        let span = BoundarySpan {
            start: self.start,
            end,
            kind: BoundaryKind::Sentence,
        };
        self.start = next_start;
        self.cursor = next_cursor;
        span
    }
}

impl Iterator for SentenceIter<'_> {
    type Item = BoundarySpan;

    fn next(&mut self) -> Option<BoundarySpan> {
        let text = self.text;
        let len = text.len();
        if self.start >= len {
            return None;
        }

        let mut i = self.cursor;
        while i < len {
            let ch = text[i..].chars().next().expect("in-bounds char");

            if TERMINALS.contains(&ch) {
                if ch == '.' && ends_abbreviation(text, i) {
                    i += ch.len_utf8();
                    continue;
                }

                // Swallow terminal runs ("...", "?!") and closing quotes
                let mut j = i + ch.len_utf8();
                while let Some(next) = text[j..].chars().next() {
                    if TERMINALS.contains(&next) || CLOSERS.contains(&next) {
                        j += next.len_utf8();
                    } else {
                        break;
                    }
                }

                if j >= len {
                    return Some(self.emit(len, len, len));
                }

                let next = text[j..].chars().next().expect("in-bounds char");
                if next.is_whitespace() {
                    // Uppercase-start heuristic; ambiguous continuations
                    // (lowercase follow-up) do not split
                    let mut k = j;
                    while let Some(c) = text[k..].chars().next() {
                        if c.is_whitespace() {
                            k += c.len_utf8();
                        } else {
                            break;
                        }
                    }
                    if k >= len || starts_sentence(text[k..].chars().next().unwrap()) {
                        return Some(self.emit(j, j, j));
                    }
                }

                i = j;
                continue;
            }

            // Hard break on blank lines
            if ch == '\n' {
                let mut j = i + 1;
                let mut newlines = 1;
                while let Some(c) = text[j..].chars().next() {
                    if c == '\n' || c == '\r' {
                        newlines += 1;
                        j += c.len_utf8();
                    } else if c.is_whitespace() {
                        j += c.len_utf8();
                    } else {
                        break;
                    }
                }
                if newlines >= 2 && i > self.start {
                    return Some(self.emit(i, i, j));
                }
                i = j.max(i + 1);
                continue;
            }

            i += ch.len_utf8();
        }

        Some(self.emit(len, len, len))
    }
}

fn starts_sentence(ch: char) -> bool {
    ch.is_uppercase() || ch.is_numeric() || OPENERS.contains(&ch)
}

/// Whether the dot at `dot_pos` terminates a listed abbreviation
fn ends_abbreviation(text: &str, dot_pos: usize) -> bool {
    let mut back = dot_pos;
    let mut token_chars = 0;
    for ch in text[..dot_pos].chars().rev() {
        if ch.is_alphabetic() || ch == '.' {
            back -= ch.len_utf8();
            token_chars += 1;
            if token_chars > 8 {
                return false;
            }
        } else {
            break;
        }
    }
    if back == dot_pos {
        return false;
    }
    let token = text[back..dot_pos + 1].to_lowercase();
    ABBREVIATIONS.contains(&token.as_str())
}

/// Segmented view of one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundaries {
    /// Sentence spans, ordered, covering the whole text
    pub sentences: Vec<BoundarySpan>,
    /// Clause spans, ordered, covering the whole text
    pub clauses: Vec<BoundarySpan>,
}

impl Boundaries {
    /// Segment a text into sentence and clause spans
    pub fn segment(text: &str) -> Self {
        let sentences: Vec<BoundarySpan> = SentenceIter::new(text).collect();
        let mut clauses = Vec::with_capacity(sentences.len());
        for sentence in &sentences {
            split_clauses(text, sentence.start, sentence.end, &mut clauses);
        }
        Self { sentences, clauses }
    }

    /// Index of the sentence containing a byte position
    pub fn sentence_index_at(&self, pos: usize) -> Option<usize> {
        span_index_at(&self.sentences, pos)
    }

    /// Index of the clause containing a byte position
    pub fn clause_index_at(&self, pos: usize) -> Option<usize> {
        span_index_at(&self.clauses, pos)
    }
}

/// Locate the covering span via the contiguous-coverage invariant
pub(crate) fn span_index_at(spans: &[BoundarySpan], pos: usize) -> Option<usize> {
    let idx = spans.partition_point(|s| s.end <= pos);
    (idx < spans.len()).then_some(idx)
}

/// Split one sentence into clause spans appended to `out`
fn split_clauses(text: &str, start: usize, end: usize, out: &mut Vec<BoundarySpan>) {
    let mut cursor = start;
    let slice = &text[start..end];

    for (off, ch) in slice.char_indices() {
        let pos = start + off;
        if matches!(ch, ',' | ';' | ':') {
            let split = pos + ch.len_utf8();
            if split > cursor {
                out.push(BoundarySpan {
                    start: cursor,
                    end: split,
                    kind: BoundaryKind::Clause,
                });
                cursor = split;
            }
        } else if ch.is_whitespace() {
            let word_start = pos + ch.len_utf8();
            if word_start >= end || word_start <= cursor {
                continue;
            }
            if conjunction_end(text, word_start, end).is_some() {
                // Only split when the open clause already holds content
                if text[cursor..word_start]
                    .chars()
                    .any(|c| c.is_alphanumeric())
                {
                    out.push(BoundarySpan {
                        start: cursor,
                        end: word_start,
                        kind: BoundaryKind::Clause,
                    });
                    cursor = word_start;
                }
            }
        }
    }

    if end > cursor {
        out.push(BoundarySpan {
            start: cursor,
            end,
            kind: BoundaryKind::Clause,
        });
    }
}

/// If a coordinating conjunction starts at `pos`, return its end
fn conjunction_end(text: &str, pos: usize, limit: usize) -> Option<usize> {
    let mut end = pos;
    for ch in text[pos..limit].chars() {
        if ch.is_alphabetic() {
            end += ch.len_utf8();
        } else {
            break;
        }
    }
    if end == pos {
        return None;
    }
    let followed_ok = end >= limit
        || text[end..]
            .chars()
            .next()
            .map(|c| c.is_whitespace())
            .unwrap_or(true);
    if !followed_ok {
        return None;
    }
    let word = text[pos..end].to_lowercase();
    CONJUNCTIONS.contains(&word.as_str()).then_some(end)
}

//! Reported annotation types

use crate::definition::{Family, MarkerKind};
use crate::domain::candidate::MatchCandidate;
use crate::error::Diagnostic;
use serde::Serialize;

/// One reported annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Id of the producing marker definition
    pub marker_id: String,
    /// Reported family
    pub family: Family,
    /// Atomic or composed
    pub kind: MarkerKind,
    /// Byte start, inclusive
    pub start: usize,
    /// Byte end, exclusive
    pub end: usize,
    /// Confidence in 0.0..=1.0
    pub score: f64,
    /// Concept label from the definition, when declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<MatchCandidate> for Annotation {
    fn from(candidate: MatchCandidate) -> Self {
        Self {
            marker_id: candidate.marker_id,
            family: candidate.family,
            kind: candidate.kind,
            start: candidate.start,
            end: candidate.end,
            score: candidate.score,
            label: candidate.label,
        }
    }
}

/// Annotation counts per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FamilyCounts {
    /// Reported ATO annotations
    pub ato: usize,
    /// Reported SEM annotations
    pub sem: usize,
    /// Reported CLU annotations
    pub clu: usize,
    /// Reported MEMA annotations
    pub mema: usize,
}

impl FamilyCounts {
    /// Count for one family
    pub fn get(&self, family: Family) -> usize {
        match family {
            Family::Ato => self.ato,
            Family::Sem => self.sem,
            Family::Clu => self.clu,
            Family::Mema => self.mema,
        }
    }

    pub(crate) fn add(&mut self, family: Family) {
        match family {
            Family::Ato => self.ato += 1,
            Family::Sem => self.sem += 1,
            Family::Clu => self.clu += 1,
            Family::Mema => self.mema += 1,
        }
    }
}

/// Counters describing one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStats {
    /// Atomic candidates produced before resolution
    pub atomic_candidates: usize,
    /// Composed candidates produced before resolution
    pub composed_candidates: usize,
    /// Annotations surviving overlap resolution
    pub reported: usize,
    /// Windows the document was processed in
    pub windows: usize,
}

/// The final, conflict-free annotation set for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSet {
    /// Annotations ordered by `(start, end)`; no two overlap
    pub annotations: Vec<Annotation>,
    /// Per-family summary of `annotations`
    pub family_counts: FamilyCounts,
    /// Run counters
    pub stats: RunStats,
    /// Recovered failures; empty on a fully clean run
    pub diagnostics: Vec<Diagnostic>,
}

impl AnnotationSet {
    /// Number of reported annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// True when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Iterate over the reported annotations
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}

//! Marker definition model and compiled definition sets
//!
//! Definitions arrive already parsed (loading structured definition files is
//! a collaborator concern); [`CompiledMarkerSet::compile`] re-validates
//! everything that can be checked without text — pattern compilation,
//! formula syntax, child references, hierarchy ordering — so broken or
//! malicious definitions are rejected before any document is processed.

use crate::domain::expr::{self, CmpOp, Expr};
use crate::error::DefinitionError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four marker hierarchy levels, totally ordered ATO < SEM < CLU < MEMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Atomic: detected directly from raw text
    #[serde(rename = "ATO")]
    Ato,
    /// Semantic: composed from atomic evidence
    #[serde(rename = "SEM")]
    Sem,
    /// Cluster: composed from semantic evidence
    #[serde(rename = "CLU")]
    Clu,
    /// Meta-marker: the top of the hierarchy
    #[serde(rename = "MEMA")]
    Mema,
}

impl Family {
    /// Hierarchy rank; lower ranks are evaluated first
    pub fn rank(&self) -> u8 {
        match self {
            Family::Ato => 0,
            Family::Sem => 1,
            Family::Clu => 2,
            Family::Mema => 3,
        }
    }

    /// The canonical uppercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Ato => "ATO",
            Family::Sem => "SEM",
            Family::Clu => "CLU",
            Family::Mema => "MEMA",
        }
    }

    /// Derive the family from a marker id prefix (`ATO_`, `SEM_`, ...)
    pub fn from_id(id: &str) -> Option<Family> {
        if id.starts_with("ATO_") {
            Some(Family::Ato)
        } else if id.starts_with("SEM_") {
            Some(Family::Sem)
        } else if id.starts_with("CLU_") {
            Some(Family::Clu)
        } else if id.starts_with("MEMA_") {
            Some(Family::Mema)
        } else {
            None
        }
    }

    /// The composed levels in evaluation order
    pub fn composed_levels() -> [Family; 3] {
        [Family::Sem, Family::Clu, Family::Mema]
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ATO" => Ok(Family::Ato),
            "SEM" => Ok(Family::Sem),
            "CLU" => Ok(Family::Clu),
            "MEMA" => Ok(Family::Mema),
            other => Err(format!("unknown family '{other}'")),
        }
    }
}

/// Whether a marker is detected from text or composed from children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Pattern-matched against raw text
    Atomic,
    /// Derived from lower-level marker evidence
    Composed,
}

/// One declared pattern of an atomic marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    /// A regular expression with optional `i`/`m`/`s` flag characters
    Regex {
        /// The expression source
        regex: String,
        /// Flag characters; empty means case-insensitive by default
        #[serde(default)]
        flags: String,
    },
    /// A literal token, escaped and word-boundary-wrapped when alphanumeric
    Literal {
        /// The literal text
        literal: String,
    },
}

/// A child reference inside a composed definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSpec {
    /// Id of the contributing marker
    pub marker_id: String,
    /// Contribution weight for the composed score
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Span geometry modes for composed candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanMode {
    /// Expand to the union of overlapped sentences
    SentenceUnion,
    /// Expand to the union of overlapped clauses
    ClauseUnion,
    /// Fixed token window around the earliest contributing child
    AnchorWindow,
}

/// Span policy attached to a composed definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanPolicy {
    /// Geometry mode
    pub mode: SpanMode,
    /// Sentence/clause cap for the union modes; also the widest
    /// sentence window the composition engine will consider
    #[serde(default = "default_max_sentence_span")]
    pub max_sentence_span: usize,
    /// Token radius for [`SpanMode::AnchorWindow`]
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
}

fn default_max_sentence_span() -> usize {
    1
}

fn default_window_radius() -> usize {
    8
}

impl SpanPolicy {
    /// Sentence-union policy with the given sentence cap
    pub fn sentence_union(max_sentence_span: usize) -> Self {
        Self {
            mode: SpanMode::SentenceUnion,
            max_sentence_span,
            window_radius: default_window_radius(),
        }
    }

    /// Clause-union policy with the given clause cap
    pub fn clause_union(max_sentence_span: usize) -> Self {
        Self {
            mode: SpanMode::ClauseUnion,
            max_sentence_span,
            window_radius: default_window_radius(),
        }
    }

    /// Anchor-window policy with the given token radius
    pub fn anchor_window(window_radius: usize) -> Self {
        Self {
            mode: SpanMode::AnchorWindow,
            max_sentence_span: default_max_sentence_span(),
            window_radius,
        }
    }
}

/// Promotion rule retargeting a composed marker's reported family
///
/// Evaluated after activation against the same bindings; a failing rule
/// drops the candidate, a passing rule may promote it to another family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PromotionRule {
    /// Gate formula over `score` and `total_children`
    #[serde(default)]
    pub activate_when: Option<String>,
    /// Additional score floor for promotion
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Family the candidate is reported under when the rule passes
    #[serde(default)]
    pub promote_to: Option<Family>,
}

/// One marker definition, immutable for the lifetime of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDefinition {
    /// Unique id with a four-letter family prefix
    pub id: String,
    /// Declared hierarchy level; must agree with the id prefix
    pub family: Family,
    /// Atomic or composed
    pub kind: MarkerKind,
    /// Patterns of an atomic marker
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
    /// Base score of an atomic marker
    #[serde(default = "default_score")]
    pub score: f64,
    /// Patterns whose occurrences suppress overlapping atomic matches
    #[serde(default)]
    pub demote_if: Vec<PatternSpec>,
    /// Ordered children of a composed marker
    #[serde(default)]
    pub composed_of: Vec<ChildSpec>,
    /// Activation formula; missing means `total_children >= 1`
    #[serde(default)]
    pub activation: Option<String>,
    /// Span geometry; missing means the raw union of children
    #[serde(default)]
    pub span_policy: Option<SpanPolicy>,
    /// Score threshold; missing means the configured default
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Optional promotion rule
    #[serde(default)]
    pub promotion: Option<PromotionRule>,
    /// Human-readable concept name carried into annotations
    #[serde(default)]
    pub label: Option<String>,
}

fn default_score() -> f64 {
    0.7
}

impl MarkerDefinition {
    /// New atomic definition; the family is derived from the id prefix
    pub fn atomic(id: impl Into<String>, score: f64) -> Self {
        let id = id.into();
        let family = Family::from_id(&id).unwrap_or(Family::Ato);
        Self {
            id,
            family,
            kind: MarkerKind::Atomic,
            patterns: Vec::new(),
            score,
            demote_if: Vec::new(),
            composed_of: Vec::new(),
            activation: None,
            span_policy: None,
            min_score: None,
            promotion: None,
            label: None,
        }
    }

    /// New composed definition; the family is derived from the id prefix
    pub fn composed<I, S>(id: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let id = id.into();
        let family = Family::from_id(&id).unwrap_or(Family::Sem);
        Self {
            id,
            family,
            kind: MarkerKind::Composed,
            patterns: Vec::new(),
            score: default_score(),
            demote_if: Vec::new(),
            composed_of: children
                .into_iter()
                .map(|(marker_id, weight)| ChildSpec {
                    marker_id: marker_id.into(),
                    weight,
                })
                .collect(),
            activation: None,
            span_policy: None,
            min_score: None,
            promotion: None,
            label: None,
        }
    }

    /// Add a regex pattern
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.patterns.push(PatternSpec::Regex {
            regex: regex.into(),
            flags: String::new(),
        });
        self
    }

    /// Add a literal pattern
    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        self.patterns.push(PatternSpec::Literal {
            literal: literal.into(),
        });
        self
    }

    /// Add a demote pattern
    pub fn with_demote(mut self, regex: impl Into<String>) -> Self {
        self.demote_if.push(PatternSpec::Regex {
            regex: regex.into(),
            flags: String::new(),
        });
        self
    }

    /// Set the activation formula
    pub fn with_activation(mut self, formula: impl Into<String>) -> Self {
        self.activation = Some(formula.into());
        self
    }

    /// Set the span policy
    pub fn with_span_policy(mut self, policy: SpanPolicy) -> Self {
        self.span_policy = Some(policy);
        self
    }

    /// Set the score threshold
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Set the promotion rule
    pub fn with_promotion(mut self, rule: PromotionRule) -> Self {
        self.promotion = Some(rule);
        self
    }

    /// Set the concept label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A compiled atomic pattern
#[derive(Debug)]
pub(crate) struct CompiledPattern {
    pub(crate) regex: Regex,
    /// Literal-derived patterns score below regex-derived ones
    pub(crate) literal: bool,
}

/// A compiled atomic marker
#[derive(Debug)]
pub(crate) struct AtomicMarker {
    pub(crate) id: String,
    pub(crate) family: Family,
    pub(crate) score: f64,
    pub(crate) label: Option<String>,
    pub(crate) patterns: Vec<CompiledPattern>,
    pub(crate) demote: Vec<Regex>,
}

/// A compiled promotion rule
#[derive(Debug)]
pub(crate) struct CompiledPromotion {
    pub(crate) activate_when: Option<Expr>,
    pub(crate) min_score: Option<f64>,
    pub(crate) promote_to: Option<Family>,
}

/// A compiled composed marker
#[derive(Debug)]
pub(crate) struct ComposedMarker {
    pub(crate) id: String,
    pub(crate) family: Family,
    pub(crate) children: Vec<ChildSpec>,
    pub(crate) activation: Expr,
    pub(crate) min_score: Option<f64>,
    pub(crate) span_policy: Option<SpanPolicy>,
    pub(crate) promotion: Option<CompiledPromotion>,
    pub(crate) label: Option<String>,
}

/// A validated, compiled definition set, shared read-only across windows
#[derive(Debug, Default)]
pub struct CompiledMarkerSet {
    atomics: Vec<AtomicMarker>,
    composed: Vec<ComposedMarker>,
}

impl CompiledMarkerSet {
    /// Compile and validate a definition list
    ///
    /// Rejects the whole set on the first structural problem: duplicate
    /// ids, family/prefix mismatches, missing patterns or children,
    /// unknown or higher-level child references, uncompilable patterns,
    /// and malformed formulas.
    pub fn compile(definitions: &[MarkerDefinition]) -> Result<Self, DefinitionError> {
        let mut families: HashMap<&str, Family> = HashMap::new();
        for def in definitions {
            match Family::from_id(&def.id) {
                Some(family) if family == def.family => {}
                _ => {
                    return Err(DefinitionError::FamilyMismatch {
                        marker_id: def.id.clone(),
                    })
                }
            }
            if families.insert(def.id.as_str(), def.family).is_some() {
                return Err(DefinitionError::DuplicateId {
                    marker_id: def.id.clone(),
                });
            }
        }

        let mut atomics = Vec::new();
        let mut composed = Vec::new();

        for def in definitions {
            match def.kind {
                MarkerKind::Atomic => atomics.push(compile_atomic(def)?),
                MarkerKind::Composed => composed.push(compile_composed(def, &families)?),
            }
        }

        Ok(Self { atomics, composed })
    }

    /// Compiled atomic markers in declaration order
    pub(crate) fn atomics(&self) -> &[AtomicMarker] {
        &self.atomics
    }

    /// Compiled composed markers at one level, in declaration order
    pub(crate) fn composed_at(&self, family: Family) -> impl Iterator<Item = &ComposedMarker> {
        self.composed.iter().filter(move |m| m.family == family)
    }

    /// All compiled composed markers
    pub(crate) fn composed_markers(&self) -> &[ComposedMarker] {
        &self.composed
    }

    /// Number of definitions in the set
    pub fn len(&self) -> usize {
        self.atomics.len() + self.composed.len()
    }

    /// True when the set holds no definitions
    pub fn is_empty(&self) -> bool {
        self.atomics.is_empty() && self.composed.is_empty()
    }
}

fn compile_atomic(def: &MarkerDefinition) -> Result<AtomicMarker, DefinitionError> {
    if def.patterns.is_empty() {
        return Err(DefinitionError::MissingPatterns {
            marker_id: def.id.clone(),
        });
    }

    let mut patterns = Vec::with_capacity(def.patterns.len());
    for spec in &def.patterns {
        patterns.push(compile_pattern(&def.id, spec)?);
    }

    let mut demote = Vec::with_capacity(def.demote_if.len());
    for spec in &def.demote_if {
        demote.push(compile_pattern(&def.id, spec)?.regex);
    }

    Ok(AtomicMarker {
        id: def.id.clone(),
        family: def.family,
        score: def.score.clamp(0.0, 1.0),
        label: def.label.clone(),
        patterns,
        demote,
    })
}

fn compile_pattern(
    marker_id: &str,
    spec: &PatternSpec,
) -> Result<CompiledPattern, DefinitionError> {
    let (source, flags, literal) = match spec {
        PatternSpec::Regex { regex, flags } => (regex.clone(), flags.as_str(), false),
        PatternSpec::Literal { literal } => {
            let escaped = regex::escape(literal);
            // Bare words get word boundaries so "ein" does not hit "kein"
            let source = if !literal.is_empty()
                && literal.chars().all(|c| c.is_alphanumeric() || c == ' ')
            {
                format!(r"\b{escaped}\b")
            } else {
                escaped
            };
            (source, "", true)
        }
    };

    let regex = RegexBuilder::new(&source)
        // Matching is case-insensitive unless flags say otherwise
        .case_insensitive(flags.is_empty() || flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|source| DefinitionError::InvalidPattern {
            marker_id: marker_id.to_string(),
            source,
        })?;

    Ok(CompiledPattern { regex, literal })
}

fn compile_composed(
    def: &MarkerDefinition,
    families: &HashMap<&str, Family>,
) -> Result<ComposedMarker, DefinitionError> {
    if def.composed_of.is_empty() {
        return Err(DefinitionError::EmptyComposition {
            marker_id: def.id.clone(),
        });
    }

    for child in &def.composed_of {
        let child_family = families.get(child.marker_id.as_str()).ok_or_else(|| {
            DefinitionError::UnknownChild {
                marker_id: def.id.clone(),
                child: child.marker_id.clone(),
            }
        })?;
        if child_family.rank() > def.family.rank() {
            return Err(DefinitionError::HierarchyViolation {
                marker_id: def.id.clone(),
                child: child.marker_id.clone(),
            });
        }
    }

    let activation = match &def.activation {
        Some(formula) => parse_formula(&def.id, formula)?,
        // The original engine's default gate
        None => Expr::Cmp {
            op: CmpOp::Ge,
            lhs: Box::new(Expr::Ident("total_children".to_string())),
            rhs: Box::new(Expr::Num(1.0)),
        },
    };

    let promotion = match &def.promotion {
        Some(rule) => Some(CompiledPromotion {
            activate_when: rule
                .activate_when
                .as_deref()
                .map(|formula| parse_formula(&def.id, formula))
                .transpose()?,
            min_score: rule.min_score,
            promote_to: rule.promote_to,
        }),
        None => None,
    };

    Ok(ComposedMarker {
        id: def.id.clone(),
        family: def.family,
        children: def.composed_of.clone(),
        activation,
        min_score: def.min_score,
        span_policy: def.span_policy,
        promotion,
        label: def.label.clone(),
    })
}

fn parse_formula(marker_id: &str, formula: &str) -> Result<Expr, DefinitionError> {
    expr::parse(formula).map_err(|err| DefinitionError::FormulaSyntax {
        marker_id: marker_id.to_string(),
        detail: err.to_string(),
    })
}

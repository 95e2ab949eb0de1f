//! Marker definition bundle loading and validation
//!
//! The engine consumes an already-validated definition list; this module
//! is that collaborator. Bundles are JSON, either a bare array of
//! definitions or an object with a `markers` array. Cycle detection runs
//! here — the engine relies on hierarchy ordering and does not re-check
//! cycle freedom.

use anyhow::{Context, Result};
use markant_core::{CompiledMarkerSet, DefinitionError, MarkerDefinition, MarkerKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum BundleFile {
    Wrapped { markers: Vec<MarkerDefinition> },
    Bare(Vec<MarkerDefinition>),
}

/// Load and fully validate a definition bundle
pub fn load_bundle(path: &Path) -> Result<Vec<MarkerDefinition>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading definition bundle {}", path.display()))?;
    let bundle: BundleFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing definition bundle {}", path.display()))?;
    let markers = match bundle {
        BundleFile::Wrapped { markers } => markers,
        BundleFile::Bare(markers) => markers,
    };
    if markers.is_empty() {
        anyhow::bail!("definition bundle {} contains no markers", path.display());
    }
    detect_cycles(&markers)
        .with_context(|| format!("validating definition bundle {}", path.display()))?;
    Ok(markers)
}

/// Outcome of a standalone bundle check
#[derive(Debug)]
pub struct BundleSummary {
    /// Total number of definitions
    pub total: usize,
    /// Atomic definitions
    pub atomic: usize,
    /// Composed definitions
    pub composed: usize,
}

/// Run every load-time check a bundle must pass
pub fn check_bundle(markers: &[MarkerDefinition]) -> Result<BundleSummary, DefinitionError> {
    detect_cycles(markers)?;
    let set = CompiledMarkerSet::compile(markers)?;
    let atomic = markers
        .iter()
        .filter(|m| m.kind == MarkerKind::Atomic)
        .count();
    Ok(BundleSummary {
        total: set.len(),
        atomic,
        composed: set.len() - atomic,
    })
}

/// Depth-first cycle check over `composed_of` edges
pub fn detect_cycles(definitions: &[MarkerDefinition]) -> Result<(), DefinitionError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit<'a>(
        id: &'a str,
        children: &HashMap<&'a str, Vec<&'a str>>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<(), DefinitionError> {
        match marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(DefinitionError::DefinitionCycle {
                    marker_id: id.to_string(),
                })
            }
            None => {}
        }
        marks.insert(id, Mark::InProgress);
        if let Some(edges) = children.get(id) {
            for child in edges {
                visit(child, children, marks)?;
            }
        }
        marks.insert(id, Mark::Done);
        Ok(())
    }

    let children: HashMap<&str, Vec<&str>> = definitions
        .iter()
        .map(|def| {
            (
                def.id.as_str(),
                def.composed_of
                    .iter()
                    .map(|c| c.marker_id.as_str())
                    .collect(),
            )
        })
        .collect();

    let mut marks = HashMap::new();
    for def in definitions {
        visit(&def.id, &children, &mut marks)?;
    }
    Ok(())
}

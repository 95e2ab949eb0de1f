//! Orchestration over the pure domain layer
//!
//! Chunked processing of large documents: sentence-aligned window
//! splitting, per-window pipeline execution (parallel when the `parallel`
//! feature is enabled), and the global merge.

pub mod chunker;
pub(crate) mod pipeline;

pub use chunker::{split_windows, ChunkWindow};

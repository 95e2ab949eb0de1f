//! CLI command implementations

pub mod annotate;
pub mod validate;

pub use annotate::AnnotateArgs;
pub use validate::ValidateArgs;

//! Markant CLI library
//!
//! Command-line batch annotation on top of `markant-core`: definition
//! bundle loading and validation, glob input resolution, and JSON/text
//! report rendering.

pub mod bundle;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;

pub use error::{CliError, CliResult};

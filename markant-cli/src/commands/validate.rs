//! Validate command implementation

use crate::bundle;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Marker definition bundle (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub definitions: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        let markers = bundle::load_bundle(&self.definitions)?;
        let summary = bundle::check_bundle(&markers)?;
        println!(
            "OK: {} markers ({} atomic, {} composed)",
            summary.total, summary.atomic, summary.composed
        );
        Ok(())
    }
}

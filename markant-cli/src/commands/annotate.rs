//! Annotate command implementation

use crate::{bundle, config::FileConfig, input, output::DocumentReport, output::OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use markant_core::Annotator;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Arguments for the annotate command
#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Marker definition bundle (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub definitions: PathBuf,

    /// Output directory for reports (default: stdout)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Chunking threshold override in bytes
    #[arg(long, value_name = "BYTES")]
    pub chunk_threshold: Option<usize>,

    /// Engine options file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl AnnotateArgs {
    /// Execute the annotate command
    pub fn execute(&self) -> Result<()> {
        self.init_logging();

        let file_config = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let engine_config = file_config.into_engine_config(self.chunk_threshold)?;

        let markers = bundle::load_bundle(&self.definitions)?;
        let annotator = Annotator::with_config(&markers, engine_config)
            .context("compiling definition bundle")?;
        log::info!("Compiled {} marker definitions", annotator.marker_count());

        let files = input::resolve_patterns(&self.input)?;
        log::info!("Annotating {} files", files.len());

        if let Some(dir) = &self.output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
        }

        let progress = if self.quiet || self.output.is_none() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(files.len() as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .expect("static template is valid"),
            );
            bar
        };

        let results: Vec<(PathBuf, Result<String>)> = files
            .par_iter()
            .map(|path| {
                let rendered = self.annotate_file(&annotator, path);
                progress.inc(1);
                (path.clone(), rendered)
            })
            .collect();
        progress.finish_and_clear();

        let mut failures = 0usize;
        for (path, rendered) in results {
            match rendered {
                Ok(report) => self.emit(&path, &report)?,
                Err(err) => {
                    failures += 1;
                    log::error!("{}: {err:#}", path.display());
                }
            }
        }

        if failures > 0 {
            anyhow::bail!("{failures} of {} files failed", files.len());
        }
        Ok(())
    }

    fn annotate_file(&self, annotator: &Annotator, path: &Path) -> Result<String> {
        let text = input::read_document(path)?;
        let set = annotator
            .annotate(&text)
            .with_context(|| format!("annotating {}", path.display()))?;
        for diagnostic in &set.diagnostics {
            log::warn!("{}: {diagnostic:?}", path.display());
        }
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        DocumentReport::new(source, set).render(self.format, &text)
    }

    fn emit(&self, path: &Path, report: &str) -> Result<()> {
        match &self.output {
            Some(dir) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                let target = dir.join(format!("{stem}.{}", self.format.extension()));
                std::fs::write(&target, report)
                    .with_context(|| format!("writing report {}", target.display()))?;
            }
            None => println!("{report}"),
        }
        Ok(())
    }

    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(log_level),
        )
        .is_test(false)
        .try_init();
    }
}

// src/pipeline.rs

use anyhow::{Context, Result};
use std::{fs, path::PathBuf, time::Instant};
use tracing::info;

use crate::{
    config::Config,
    dataset::Dataset,
    output::{write_codebook, write_dataset},
    sources::{load_us_exclusions, load_uzbek_awards},
};

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub us_rows: usize,
    pub uzbek_rows: usize,
    pub total_rows: usize,
    pub dataset_path: PathBuf,
    pub codebook_path: PathBuf,
}

/// Regenerate the dataset and codebook from the configured sources.
#[tracing::instrument(level = "info", skip_all, fields(out = %cfg.output_dir.display()))]
pub fn run(cfg: &Config) -> Result<BuildSummary> {
    let start = Instant::now();

    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("creating output directory {:?}", cfg.output_dir))?;

    let us = load_us_exclusions(&cfg.sam_file)?;
    let uz = load_uzbek_awards(&cfg.uzbek_dir)?;
    let (us_rows, uzbek_rows) = (us.len(), uz.len());

    let dataset = Dataset::combine(us, uz)?;
    for ((country, kind), n) in dataset.counts() {
        info!(%country, record_type = %kind, rows = n, "dataset slice");
    }

    let summary = BuildSummary {
        us_rows,
        uzbek_rows,
        total_rows: dataset.len(),
        dataset_path: cfg.dataset_path(),
        codebook_path: cfg.codebook_path(),
    };
    write_dataset(&summary.dataset_path, dataset.records())?;
    write_codebook(&summary.codebook_path)?;

    info!(
        rows = summary.total_rows,
        elapsed = ?start.elapsed(),
        "build complete"
    );
    Ok(summary)
}

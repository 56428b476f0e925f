// src/config.rs

use std::{
    env,
    path::{Path, PathBuf},
};

pub const DATASET_FILE: &str = "foia_vendor_risk_dataset.csv";
pub const CODEBOOK_FILE: &str = "foia_vendor_risk_codebook.csv";

const DEFAULT_DATA_DIR: &str = "Data";
const DEFAULT_OUTPUT_DIR: &str = "outputs";
const SAM_EXTRACT: &str = "USA/samexclusionspublicextract-gsa-1626.csv";
const UZBEK_SUBDIR: &str = "Uzbekistan";

/// Where the build reads its sources from and writes its outputs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SAM Exclusions Public Extract (CSV).
    pub sam_file: PathBuf,
    /// Directory holding the Uzbek procurement CSV extracts.
    pub uzbek_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl Config {
    /// Lay out the standard `USA/` and `Uzbekistan/` inputs under `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>, output_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            sam_file: data_dir.join(SAM_EXTRACT),
            uzbek_dir: data_dir.join(UZBEK_SUBDIR),
            output_dir: output_dir.into(),
        }
    }

    /// Defaults, overridden by `VENDOR_RISK_DATA_DIR`, `VENDOR_RISK_SAM_FILE`,
    /// `VENDOR_RISK_UZBEK_DIR` and `VENDOR_RISK_OUTPUT_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = var("VENDOR_RISK_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let output_dir = var("VENDOR_RISK_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into());
        let mut cfg = Self::with_data_dir(&data_dir, output_dir);

        if let Some(sam) = var("VENDOR_RISK_SAM_FILE") {
            cfg.sam_file = sam.into();
        }
        if let Some(uzb) = var("VENDOR_RISK_UZBEK_DIR") {
            cfg.uzbek_dir = uzb.into();
        }
        cfg
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(DATASET_FILE)
    }

    pub fn codebook_path(&self) -> PathBuf {
        self.output_dir.join(CODEBOOK_FILE)
    }
}

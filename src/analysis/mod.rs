// src/analysis/mod.rs
//! Descriptive statistics over a published dataset.

use anyhow::{Context, Result};
use std::{collections::HashMap, path::Path};
use tracing::info;

use crate::record::RiskRecord;

pub mod contracts;
pub mod cross_ref;
pub mod exclusions;
pub mod report;
pub mod risk;
pub mod summary;
pub mod transparency;

pub use contracts::{analyze_contracts, ContractAnalysis, ValueStats, VendorValue};
pub use cross_ref::{cross_reference, CrossBorderVendor};
pub use exclusions::{analyze_exclusions, ExclusionAnalysis};
pub use report::Report;
pub use risk::{risk_indicators, VendorRisk};
pub use summary::{summarize, SummaryStats};
pub use transparency::{transparency_metrics, TransparencyMetrics};

/// Read a dataset CSV written by the build back into records.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<RiskRecord>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset {:?}", path))?;

    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize().enumerate() {
        let rec: RiskRecord =
            row.with_context(|| format!("Bad record in {:?} at data row {}", path, idx + 1))?;
        out.push(rec);
    }
    info!(records = out.len(), "loaded dataset");
    Ok(out)
}

/// Frequency of each value, most common first; ties broken alphabetically.
pub fn value_counts<'a, I>(items: I, limit: Option<usize>) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(n) = limit {
        sorted.truncate(n);
    }
    sorted
}

/// Whole-unit amount with comma digit grouping: `1234567.8` → `1,234,568`.
pub fn group_thousands(v: f64) -> String {
    let rounded = v.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

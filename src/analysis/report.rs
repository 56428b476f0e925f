// src/analysis/report.rs
//! All analysis sections over one dataset, and their CSV files.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::{
    analyze_contracts, analyze_exclusions, cross_reference, risk_indicators, summarize,
    transparency_metrics, ContractAnalysis, CrossBorderVendor, ExclusionAnalysis, SummaryStats,
    TransparencyMetrics, VendorRisk,
};
use crate::output::{write_rows, write_section};
use crate::record::RiskRecord;

pub const SUMMARY_FILE: &str = "dataset_summary.csv";
pub const EXCLUSIONS_FILE: &str = "exclusions_analysis.csv";
pub const CONTRACTS_FILE: &str = "uzbek_contracts_stats.csv";
pub const CROSS_BORDER_FILE: &str = "cross_border_vendors.csv";
pub const RISK_FILE: &str = "vendor_risk_indicators.csv";
pub const TRANSPARENCY_FILE: &str = "transparency_metrics.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: SummaryStats,
    pub exclusions: Option<ExclusionAnalysis>,
    pub contracts: Option<ContractAnalysis>,
    pub cross_border: Vec<CrossBorderVendor>,
    pub risks: Vec<VendorRisk>,
    pub transparency: TransparencyMetrics,
}

impl Report {
    pub fn build(records: &[RiskRecord]) -> Self {
        Self {
            summary: summarize(records),
            exclusions: analyze_exclusions(records),
            contracts: analyze_contracts(records),
            cross_border: cross_reference(records),
            risks: risk_indicators(records),
            transparency: transparency_metrics(records),
        }
    }

    /// Write one CSV per section into `out`.
    ///
    /// An empty section has no file; one left by an earlier run is removed so
    /// the directory always reflects this dataset.
    #[tracing::instrument(level = "info", skip_all, fields(out = %out.display()))]
    pub fn write_csvs(&self, out: &Path) -> Result<()> {
        write_rows(out.join(SUMMARY_FILE), &[&self.summary])?;

        let exclusions: Vec<_> = self
            .exclusions
            .as_ref()
            .map(ExclusionAnalysis::to_row)
            .transpose()?
            .into_iter()
            .collect();
        write_section(out.join(EXCLUSIONS_FILE), &exclusions)?;

        let contracts: Vec<_> = self.contracts.iter().map(|c| &c.value_stats).collect();
        write_section(out.join(CONTRACTS_FILE), &contracts)?;

        write_section(out.join(CROSS_BORDER_FILE), &self.cross_border)?;
        write_section(out.join(RISK_FILE), &self.risks)?;
        write_rows(out.join(TRANSPARENCY_FILE), &self.transparency.rows())?;

        info!("wrote analysis outputs");
        Ok(())
    }
}

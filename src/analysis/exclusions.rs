use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use super::value_counts;
use crate::process::parse_date;
use crate::record::{RecordType, RiskRecord};

const TOP_N: usize = 10;

/// Breakdown of SAM exclusions by the agency/program/type carried in `notes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExclusionAnalysis {
    pub total_exclusions: usize,
    pub unique_excluded_vendors: usize,
    pub top_agencies: Vec<(String, usize)>,
    pub top_programs: Vec<(String, usize)>,
    pub exclusion_types: Vec<(String, usize)>,
    pub yearly_trends: BTreeMap<i32, usize>,
}

/// Flat CSV shape; the nested tallies are embedded as JSON.
#[derive(Debug, Serialize)]
pub struct ExclusionRow {
    pub total_exclusions: usize,
    pub unique_excluded_vendors: usize,
    pub top_agencies: String,
    pub top_programs: String,
    pub exclusion_types: String,
    pub yearly_trends: String,
}

impl ExclusionAnalysis {
    pub fn to_row(&self) -> serde_json::Result<ExclusionRow> {
        Ok(ExclusionRow {
            total_exclusions: self.total_exclusions,
            unique_excluded_vendors: self.unique_excluded_vendors,
            top_agencies: serde_json::to_string(&self.top_agencies)?,
            top_programs: serde_json::to_string(&self.top_programs)?,
            exclusion_types: serde_json::to_string(&self.exclusion_types)?,
            yearly_trends: serde_json::to_string(&self.yearly_trends)?,
        })
    }
}

/// `None` when the dataset holds no exclusions.
pub fn analyze_exclusions(records: &[RiskRecord]) -> Option<ExclusionAnalysis> {
    let exclusions: Vec<&RiskRecord> = records
        .iter()
        .filter(|r| r.record_type == RecordType::Exclusion)
        .collect();
    if exclusions.is_empty() {
        return None;
    }

    // notes = "agency | program | type"
    let parts: Vec<Vec<&str>> = exclusions
        .iter()
        .map(|r| r.notes.split(" | ").collect())
        .collect();
    let nth = |n: usize| parts.iter().filter_map(move |p| p.get(n).copied());

    let mut yearly_trends = BTreeMap::new();
    for year in exclusions
        .iter()
        .filter_map(|r| parse_date(&r.record_date))
        .map(|d| d.year())
    {
        *yearly_trends.entry(year).or_insert(0) += 1;
    }

    Some(ExclusionAnalysis {
        total_exclusions: exclusions.len(),
        unique_excluded_vendors: exclusions
            .iter()
            .map(|r| r.vendor_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        top_agencies: value_counts(nth(0), Some(TOP_N)),
        top_programs: value_counts(nth(1), Some(TOP_N)),
        exclusion_types: value_counts(nth(2), None),
        yearly_trends,
    })
}

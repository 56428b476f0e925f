use serde::Serialize;
use std::collections::HashSet;

use crate::record::{Country, RiskRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransparencyMetrics {
    /// `(field, percent of rows where it is populated)`.
    pub completeness: Vec<(&'static str, f64)>,
    /// Mean of `completeness`, rounded to two decimals.
    pub data_quality_score: f64,
    pub us_sources: usize,
    pub uzbek_sources: usize,
    pub total_sources: usize,
}

#[derive(Debug, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: f64,
}

impl TransparencyMetrics {
    pub fn rows(&self) -> Vec<MetricRow> {
        self.completeness
            .iter()
            .map(|&(metric, value)| MetricRow { metric, value })
            .collect()
    }
}

pub fn transparency_metrics(records: &[RiskRecord]) -> TransparencyMetrics {
    let pct = |populated: usize| {
        if records.is_empty() {
            0.0
        } else {
            populated as f64 / records.len() as f64 * 100.0
        }
    };
    let filled = |f: fn(&RiskRecord) -> bool| pct(records.iter().filter(|r| f(r)).count());

    let completeness = vec![
        ("vendor_name", filled(|r| !r.vendor_name.is_empty())),
        (
            "government_identifier",
            filled(|r| !r.government_identifier.is_empty()),
        ),
        ("record_date", filled(|r| !r.record_date.is_empty())),
        ("value", filled(|r| r.value.is_some())),
        ("notes", filled(|r| !r.notes.is_empty())),
    ];
    let avg = completeness.iter().map(|(_, v)| v).sum::<f64>() / completeness.len() as f64;

    let sources = |country: Option<Country>| {
        records
            .iter()
            .filter(|r| country.map_or(true, |c| r.country == c))
            .map(|r| r.source_url.as_str())
            .collect::<HashSet<_>>()
            .len()
    };

    TransparencyMetrics {
        completeness,
        data_quality_score: (avg * 100.0).round() / 100.0,
        us_sources: sources(Some(Country::UnitedStates)),
        uzbek_sources: sources(Some(Country::Uzbekistan)),
        total_sources: sources(None),
    }
}

use serde::Serialize;
use std::collections::BTreeMap;

use super::group_thousands;
use crate::record::{Country, RecordType, RiskRecord};

pub const EXCLUSION_WEIGHT: u32 = 10;
pub const HIGH_VALUE_WEIGHT: u32 = 5;
pub const HIGH_VALUE_THRESHOLD: f64 = 1_000_000.0;
pub const CROSS_BORDER_WEIGHT: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorRisk {
    pub vendor_name: String,
    pub risk_score: u32,
    /// `; `-separated human-readable reasons.
    pub risk_factors: String,
    pub total_records: usize,
    /// Countries in order of first appearance, `, `-separated.
    pub countries: String,
}

/// Score every vendor name; only vendors with a positive score are returned,
/// highest first (ties in name order).
pub fn risk_indicators(records: &[RiskRecord]) -> Vec<VendorRisk> {
    let mut groups: BTreeMap<&str, Vec<&RiskRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(r.vendor_name.as_str()).or_default().push(r);
    }

    let mut out: Vec<VendorRisk> = groups
        .into_iter()
        .filter_map(|(vendor, group)| score_vendor(vendor, &group))
        .collect();
    out.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
    out
}

fn score_vendor(vendor: &str, group: &[&RiskRecord]) -> Option<VendorRisk> {
    let mut score = 0;
    let mut factors = Vec::new();

    let exclusions = group
        .iter()
        .filter(|r| r.record_type == RecordType::Exclusion)
        .count() as u32;
    if exclusions > 0 {
        score += exclusions * EXCLUSION_WEIGHT;
        factors.push(format!("{} exclusion(s)", exclusions));
    }

    let max_award = group
        .iter()
        .filter(|r| r.record_type == RecordType::ContractAward)
        .filter_map(|r| r.value)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    if let Some(max) = max_award.filter(|m| *m > HIGH_VALUE_THRESHOLD) {
        score += HIGH_VALUE_WEIGHT;
        factors.push(format!("High-value contract ({})", group_thousands(max)));
    }

    let mut countries: Vec<Country> = Vec::new();
    for r in group {
        if !countries.contains(&r.country) {
            countries.push(r.country);
        }
    }
    if countries.len() > 1 {
        score += CROSS_BORDER_WEIGHT;
        factors.push("Cross-border activity".to_string());
    }

    (score > 0).then(|| VendorRisk {
        vendor_name: vendor.to_string(),
        risk_score: score,
        risk_factors: factors.join("; "),
        total_records: group.len(),
        countries: countries
            .iter()
            .map(Country::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

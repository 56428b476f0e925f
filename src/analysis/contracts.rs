use serde::Serialize;
use std::collections::BTreeMap;

use super::value_counts;
use crate::record::{RecordType, RiskRecord};

const TOP_N: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueStats {
    pub total_contracts: usize,
    pub contracts_with_value: usize,
    pub total_value: f64,
    pub mean_value: f64,
    pub median_value: f64,
    pub max_value: f64,
    pub min_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorValue {
    pub vendor_name: String,
    pub total_value: f64,
    pub contract_count: usize,
    pub avg_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractAnalysis {
    pub value_stats: ValueStats,
    pub top_vendors_by_count: Vec<(String, usize)>,
    /// Empty when no award carries a value.
    pub top_vendors_by_value: Vec<VendorValue>,
}

/// `None` when the dataset holds no contract awards.
pub fn analyze_contracts(records: &[RiskRecord]) -> Option<ContractAnalysis> {
    let awards: Vec<&RiskRecord> = records
        .iter()
        .filter(|r| r.record_type == RecordType::ContractAward)
        .collect();
    if awards.is_empty() {
        return None;
    }

    let valued: Vec<(&str, f64)> = awards
        .iter()
        .filter_map(|r| r.value.map(|v| (r.vendor_name.as_str(), v)))
        .collect();
    let mut values: Vec<f64> = valued.iter().map(|(_, v)| *v).collect();

    let value_stats = ValueStats {
        total_contracts: awards.len(),
        contracts_with_value: values.len(),
        total_value: values.iter().sum(),
        mean_value: mean(&values),
        median_value: median(&mut values),
        max_value: values.iter().copied().fold(None, max_opt).unwrap_or(0.0),
        min_value: values.iter().copied().fold(None, min_opt).unwrap_or(0.0),
    };

    let mut per_vendor: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &(vendor, v) in &valued {
        let e = per_vendor.entry(vendor).or_insert((0.0, 0));
        e.0 += v;
        e.1 += 1;
    }
    let mut top_vendors_by_value: Vec<VendorValue> = per_vendor
        .into_iter()
        .map(|(vendor, (total, count))| VendorValue {
            vendor_name: vendor.to_string(),
            total_value: total,
            contract_count: count,
            avg_value: total / count as f64,
        })
        .collect();
    // BTreeMap order breaks ties by name
    top_vendors_by_value.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    top_vendors_by_value.truncate(TOP_N);

    Some(ContractAnalysis {
        value_stats,
        top_vendors_by_count: value_counts(
            awards.iter().map(|r| r.vendor_name.as_str()),
            Some(TOP_N),
        ),
        top_vendors_by_value,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn max_opt(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |a| a.max(v)))
}

fn min_opt(acc: Option<f64>, v: f64) -> Option<f64> {
    Some(acc.map_or(v, |a| a.min(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{award, exclusion, sample};

    #[test]
    fn value_stats_over_valued_awards() {
        let a = analyze_contracts(&sample()).expect("awards present");
        let s = &a.value_stats;
        assert_eq!(s.total_contracts, 3);
        assert_eq!(s.contracts_with_value, 2);
        assert_eq!(s.total_value, 2_500_000.0);
        assert_eq!(s.mean_value, 1_250_000.0);
        assert_eq!(s.median_value, 1_250_000.0);
        assert_eq!(s.max_value, 2_000_000.0);
        assert_eq!(s.min_value, 500_000.0);

        assert_eq!(
            a.top_vendors_by_count,
            vec![("Tex Service".to_string(), 2), ("Acme Corp".to_string(), 1)]
        );
        let by_value: Vec<_> = a
            .top_vendors_by_value
            .iter()
            .map(|v| (v.vendor_name.as_str(), v.contract_count))
            .collect();
        assert_eq!(by_value, vec![("Acme Corp", 1), ("Tex Service", 1)]);
    }

    #[test]
    fn awards_without_values_give_zeroed_stats() {
        let a = analyze_contracts(&[award("Tex", None, "1"), award("Tex", None, "1")]).unwrap();
        assert_eq!(a.value_stats.contracts_with_value, 0);
        assert_eq!(a.value_stats.median_value, 0.0);
        assert_eq!(a.value_stats.max_value, 0.0);
        assert!(a.top_vendors_by_value.is_empty());
    }

    #[test]
    fn odd_count_median_is_middle_value() {
        let mut v = vec![5.0, 1.0, 3.0];
        assert_eq!(median(&mut v), 3.0);
    }

    #[test]
    fn no_awards_yields_none() {
        assert!(analyze_contracts(&[exclusion("Acme", "", "")]).is_none());
    }
}

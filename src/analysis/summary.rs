use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::process::parse_date;
use crate::record::{RecordType, RiskRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub unique_vendors: usize,
    pub countries: usize,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub us_exclusions: usize,
    pub uzbek_awards: usize,
    pub records_with_value: usize,
    pub total_contract_value: f64,
}

pub fn summarize(records: &[RiskRecord]) -> SummaryStats {
    let dates: Vec<NaiveDate> = records
        .iter()
        .filter_map(|r| parse_date(&r.record_date))
        .collect();
    let values: Vec<f64> = records.iter().filter_map(|r| r.value).collect();

    SummaryStats {
        total_records: records.len(),
        unique_vendors: records
            .iter()
            .map(|r| r.vendor_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        countries: records.iter().map(|r| r.country).collect::<HashSet<_>>().len(),
        date_range_start: dates.iter().min().copied(),
        date_range_end: dates.iter().max().copied(),
        us_exclusions: records
            .iter()
            .filter(|r| r.record_type == RecordType::Exclusion)
            .count(),
        uzbek_awards: records
            .iter()
            .filter(|r| r.record_type == RecordType::ContractAward)
            .count(),
        records_with_value: values.len(),
        total_contract_value: values.iter().sum(),
    }
}

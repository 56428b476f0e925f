// src/record.rs

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Output columns, in the order they are written.
pub const COLUMNS: [&str; 10] = [
    "country",
    "record_type",
    "vendor_name",
    "government_identifier",
    "record_id",
    "record_date",
    "value",
    "currency",
    "notes",
    "source_url",
];

/// Jurisdiction that published the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "United States")]
    UnitedStates,
    #[serde(rename = "Uzbekistan")]
    Uzbekistan,
}

impl Country {
    pub fn as_str(&self) -> &'static str {
        match self {
            Country::UnitedStates => "United States",
            Country::Uzbekistan => "Uzbekistan",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Exclusion,
    ContractAward,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Exclusion => "exclusion",
            RecordType::ContractAward => "contract_award",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One harmonised row of the published dataset.
///
/// Field order matches [`COLUMNS`]; the CSV header is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub country: Country,
    pub record_type: RecordType,
    pub vendor_name: String,
    pub government_identifier: String,
    pub record_id: String,
    /// `YYYY-MM-DD`, or empty when the source had no usable date.
    pub record_date: String,
    #[serde(serialize_with = "serialize_amount")]
    pub value: Option<f64>,
    pub currency: String,
    pub notes: String,
    pub source_url: String,
}

impl RiskRecord {
    /// Start a record with only the mandatory fields populated.
    pub fn new(country: Country, record_type: RecordType, vendor_name: impl Into<String>) -> Self {
        Self {
            country,
            record_type,
            vendor_name: vendor_name.into(),
            government_identifier: String::new(),
            record_id: String::new(),
            record_date: String::new(),
            value: None,
            currency: String::new(),
            notes: String::new(),
            source_url: String::new(),
        }
    }

    /// The enumerations can never be blank, so only the vendor is checked.
    pub fn is_valid(&self) -> bool {
        !self.vendor_name.trim().is_empty()
    }
}

/// Render an amount without float noise: `1500000`, `1234.5`.
pub fn format_amount(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

fn serialize_amount<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_str(&format_amount(*v)),
        None => s.serialize_none(),
    }
}

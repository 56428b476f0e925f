// src/dataset.rs

use anyhow::{bail, Result};
use std::{cmp::Ordering, collections::BTreeMap};

use crate::record::{Country, RecordType, RiskRecord};

/// The harmonised, sorted union of every source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<RiskRecord>,
}

impl Dataset {
    /// Union the mapped US and Uzbek tables.
    ///
    /// Nothing is dropped or merged here: the output row count is the sum of
    /// the inputs. A record with a blank vendor is rejected outright.
    pub fn combine(us: Vec<RiskRecord>, uz: Vec<RiskRecord>) -> Result<Self> {
        let mut records = us;
        records.extend(uz);

        if let Some((i, bad)) = records.iter().enumerate().find(|(_, r)| !r.is_valid()) {
            bail!(
                "record {} ({} {}, id {:?}) has no vendor name",
                i,
                bad.country,
                bad.record_type,
                bad.record_id
            );
        }

        for r in &mut records {
            trim_fields(r);
        }
        // stable: equal keys keep source order
        records.sort_by(compare_records);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RiskRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RiskRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row counts per (country, record type), in sort order.
    pub fn counts(&self) -> BTreeMap<(Country, RecordType), usize> {
        let mut out = BTreeMap::new();
        for r in &self.records {
            *out.entry((r.country, r.record_type)).or_insert(0) += 1;
        }
        out
    }
}

fn trim_fields(r: &mut RiskRecord) {
    for field in [
        &mut r.vendor_name,
        &mut r.government_identifier,
        &mut r.record_id,
        &mut r.record_date,
        &mut r.currency,
        &mut r.notes,
        &mut r.source_url,
    ] {
        let trimmed = field.trim();
        if trimmed.len() != field.len() {
            *field = trimmed.to_string();
        }
    }
}

/// Order by country, record type, vendor, date, id. Blank dates and ids last.
fn compare_records(a: &RiskRecord, b: &RiskRecord) -> Ordering {
    a.country
        .as_str()
        .cmp(b.country.as_str())
        .then_with(|| a.record_type.as_str().cmp(b.record_type.as_str()))
        .then_with(|| a.vendor_name.cmp(&b.vendor_name))
        .then_with(|| blanks_last(&a.record_date, &b.record_date))
        .then_with(|| blanks_last(&a.record_id, &b.record_id))
}

fn blanks_last(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

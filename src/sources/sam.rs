// src/sources/sam.rs
//! SAM Exclusions Public Extract (GSA) → unified records.

use anyhow::Result;
use csv::StringRecord;
use std::path::Path;
use tracing::{info, warn};

use super::{load_table, RawTable};
use crate::process::{join_nonempty, normalize_date};
use crate::record::{Country, RecordType, RiskRecord};

pub const SAM_SOURCE_URL: &str = "https://open.gsa.gov/api/sam/";

/// Columns the extract must carry.
pub const SAM_COLUMNS: [&str; 20] = [
    "Classification",
    "Name",
    "Prefix",
    "First",
    "Middle",
    "Last",
    "Suffix",
    "City",
    "State / Province",
    "Country",
    "DUNS",
    "Exclusion Program",
    "Excluding Agency",
    "Exclusion Type",
    "Active Date",
    "Termination Date",
    "Record Status",
    "SAM Number",
    "CAGE",
    "Creation_Date",
];

struct SamColumns {
    name: usize,
    prefix: usize,
    first: usize,
    middle: usize,
    last: usize,
    suffix: usize,
    duns: usize,
    program: usize,
    agency: usize,
    exclusion_type: usize,
    active_date: usize,
    sam_number: usize,
    creation_date: usize,
}

impl SamColumns {
    fn resolve(table: &RawTable) -> Result<Self> {
        for col in SAM_COLUMNS {
            table.require_column(col)?;
        }
        Ok(Self {
            name: table.require_column("Name")?,
            prefix: table.require_column("Prefix")?,
            first: table.require_column("First")?,
            middle: table.require_column("Middle")?,
            last: table.require_column("Last")?,
            suffix: table.require_column("Suffix")?,
            duns: table.require_column("DUNS")?,
            program: table.require_column("Exclusion Program")?,
            agency: table.require_column("Excluding Agency")?,
            exclusion_type: table.require_column("Exclusion Type")?,
            active_date: table.require_column("Active Date")?,
            sam_number: table.require_column("SAM Number")?,
            creation_date: table.require_column("Creation_Date")?,
        })
    }
}

/// Load the SAM extract at `path` and map each row onto a [`RiskRecord`].
///
/// Rows without any usable vendor name are dropped with a warning.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_us_exclusions<P: AsRef<Path>>(path: P) -> Result<Vec<RiskRecord>> {
    let table = load_table(path)?;
    let records = map_exclusions(&table)?;
    info!(
        rows = table.rows.len(),
        records = records.len(),
        "mapped SAM exclusions"
    );
    Ok(records)
}

fn map_exclusions(table: &RawTable) -> Result<Vec<RiskRecord>> {
    let cols = SamColumns::resolve(table)?;
    let cell = |row: &StringRecord, idx: usize| RawTable::cell(row, Some(idx));

    let mut out = Vec::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let mut vendor = cell(row, cols.name);
        if vendor.is_empty() {
            vendor = join_nonempty(
                [
                    cell(row, cols.prefix),
                    cell(row, cols.first),
                    cell(row, cols.middle),
                    cell(row, cols.last),
                    cell(row, cols.suffix),
                ],
                " ",
            );
        }

        let mut rec = RiskRecord::new(Country::UnitedStates, RecordType::Exclusion, vendor);
        if !rec.is_valid() {
            warn!(
                file = %table.path.display(),
                line = table.line_of(n),
                "dropping exclusion without a vendor name"
            );
            continue;
        }

        rec.government_identifier = cell(row, cols.duns);
        rec.record_id = cell(row, cols.sam_number);
        rec.record_date = normalize_date(&cell(row, cols.active_date))
            .or_else(|| normalize_date(&cell(row, cols.creation_date)))
            .unwrap_or_default();
        rec.notes = format!(
            "{} | {} | {}",
            cell(row, cols.agency),
            cell(row, cols.program),
            cell(row, cols.exclusion_type)
        )
        .trim_matches(|c: char| c == ' ' || c == '|')
        .to_string();
        rec.source_url = SAM_SOURCE_URL.to_string();
        out.push(rec);
    }
    Ok(out)
}

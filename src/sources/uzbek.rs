// src/sources/uzbek.rs
//! Uzbekistan Open Data Portal procurement extracts → unified records.

use anyhow::{anyhow, Context, Result};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

use super::{load_table, RawTable};
use crate::process::{find_column, join_nonempty, normalize_date, parse_amount};
use crate::record::{Country, RecordType, RiskRecord};

pub const UZBEK_DATASETS_URL: &str = "https://data.egov.uz/datasets/";

const VENDOR: &[&str] = &[
    "Name of supplier",
    "Supplier of goods",
    "Supplier",
    "Ишлаб чиқарувчи",
];
const IDENTIFIER: &[&str] = &["STIR", "TIN", "ИНН", "pinfl"];
const CONTRACT: &[&str] = &["Contract number", "Лот/шартнома", "Лот", "Lot"];
const DATE: &[&str] = &[
    "Date of conclusion",
    "Дата договора",
    "Date of contract",
    "Date of registration",
];
const AMOUNT: &[&str] = &["Contract amount", "Amount", "amount of money", "Price"];
const CURRENCY: &[&str] = &["Currency"];
const SUBJECT: &[&str] = &["subject", "Product name", "товарлар", "Public procurements"];
const PURCHASE_TYPE: &[&str] = &["Purchase type", "type of purchase", "амалга"];
const PLATFORM: &[&str] = &["Platform name"];
const FUNDING: &[&str] = &["Source of funding", "Source of funds", "Source"];

/// Header positions discovered for one extract. Only the vendor is mandatory.
#[derive(Debug)]
struct AwardColumns {
    vendor: usize,
    identifier: Option<usize>,
    contract: Option<usize>,
    date: Option<usize>,
    amount: Option<usize>,
    currency: Option<usize>,
    /// `(label, column)` pairs concatenated into `notes`, in output order.
    notes: Vec<(&'static str, usize)>,
}

impl AwardColumns {
    fn discover(table: &RawTable) -> Option<Self> {
        let locate = |candidates: &[&str]| {
            find_column(&table.headers, candidates).and_then(|h| table.column_index(h))
        };

        let notes = [
            ("Purchase type", PURCHASE_TYPE),
            ("Platform", PLATFORM),
            ("Subject", SUBJECT),
            ("Funding source", FUNDING),
        ]
        .into_iter()
        .filter_map(|(label, candidates)| locate(candidates).map(|idx| (label, idx)))
        .collect();

        Some(Self {
            vendor: locate(VENDOR)?,
            identifier: locate(IDENTIFIER),
            contract: locate(CONTRACT),
            date: locate(DATE),
            amount: locate(AMOUNT),
            currency: locate(CURRENCY),
            notes,
        })
    }
}

/// Stack every `*.csv` extract in `dir`, in sorted path order.
///
/// Each file's stem is the portal dataset id and ends up in `source_url`.
/// Files without a recognisable supplier column are skipped with a warning.
#[tracing::instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn load_uzbek_awards<P: AsRef<Path>>(dir: P) -> Result<Vec<RiskRecord>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(anyhow!("Uzbek source directory {:?} not found", dir));
    }

    let files = list_extracts(dir)?;
    if files.is_empty() {
        warn!("no Uzbek CSV extracts found");
    }

    let mut out = Vec::new();
    for path in files {
        let table = load_table(&path)?;
        let records = map_awards(&table)?;
        info!(
            file = %path.display(),
            rows = table.rows.len(),
            records = records.len(),
            "mapped Uzbek awards"
        );
        out.extend(records);
    }
    Ok(out)
}

fn list_extracts(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow!("non UTF-8 path {:?}", dir))?;
    let pattern = format!("{}/*.csv", Pattern::escape(dir_str));
    let mut files = glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list {:?}", dir))?;
    files.sort();
    Ok(files)
}

fn map_awards(table: &RawTable) -> Result<Vec<RiskRecord>> {
    let Some(cols) = AwardColumns::discover(table) else {
        warn!(
            file = %table.path.display(),
            headers = %table.headers.join(" | "),
            "no supplier column; skipping extract"
        );
        return Ok(Vec::new());
    };
    debug!(file = %table.path.display(), ?cols, "discovered columns");

    let source_url = dataset_url(&table.path)?;

    let mut out = Vec::with_capacity(table.rows.len());
    for (n, row) in table.rows.iter().enumerate() {
        let mut rec = RiskRecord::new(
            Country::Uzbekistan,
            RecordType::ContractAward,
            RawTable::cell(row, Some(cols.vendor)),
        );
        if !rec.is_valid() {
            warn!(
                file = %table.path.display(),
                line = table.line_of(n),
                "dropping award without a supplier name"
            );
            continue;
        }

        rec.government_identifier = RawTable::cell(row, cols.identifier);
        rec.record_id = RawTable::cell(row, cols.contract);
        rec.record_date = normalize_date(&RawTable::cell(row, cols.date)).unwrap_or_default();
        rec.value = parse_amount(&RawTable::cell(row, cols.amount));
        rec.currency = RawTable::cell(row, cols.currency);
        rec.notes = join_nonempty(
            cols.notes.iter().filter_map(|(label, idx)| {
                let v = RawTable::cell(row, Some(*idx));
                (!v.is_empty()).then(|| format!("{}: {}", label, v))
            }),
            " | ",
        );
        rec.source_url = source_url.clone();
        out.push(rec);
    }
    Ok(out)
}

/// `https://data.egov.uz/datasets/<file stem>`, the stem appended as one
/// percent-encoded path segment.
fn dataset_url(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .ok_or_else(|| anyhow!("cannot derive dataset id from {:?}", path))?;
    let mut url = Url::parse(UZBEK_DATASETS_URL).context("parsing Uzbek datasets URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot take path segments", UZBEK_DATASETS_URL))?
        .pop_if_empty()
        .push(stem);
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
        fs::write(dir.join(name), content)?;
        Ok(())
    }

    #[test]
    fn maps_award_with_value_and_currency() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "610.csv",
            "Name of supplier,Supplier STIR,Contract number,Date of conclusion,Contract amount,Currency,Purchase type,Platform name,Subject of procurement,Source of funding\n\
             OOO Tex Service,301234567,L-77,15.02.2023,1 500 000,UZS,Direct,xarid.uzex.uz,Paper,Budget\n",
        )?;

        let recs = load_uzbek_awards(dir.path())?;
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.country, Country::Uzbekistan);
        assert_eq!(r.record_type, RecordType::ContractAward);
        assert_eq!(r.vendor_name, "OOO Tex Service");
        assert_eq!(r.government_identifier, "301234567");
        assert_eq!(r.record_id, "L-77");
        assert_eq!(r.record_date, "2023-02-15");
        assert_eq!(r.value, Some(1_500_000.0));
        assert_eq!(r.currency, "UZS");
        assert_eq!(
            r.notes,
            "Purchase type: Direct | Platform: xarid.uzex.uz | Subject: Paper | Funding source: Budget"
        );
        assert_eq!(r.source_url, "https://data.egov.uz/datasets/610");
        Ok(())
    }

    #[test]
    fn files_are_stacked_in_sorted_order() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "b.csv", "Supplier,Amount\nSecond,10\n")?;
        write(dir.path(), "a.csv", "Supplier,Amount\nFirst,oops\n")?;
        write(dir.path(), "notes.txt", "ignored")?;

        let recs = load_uzbek_awards(dir.path())?;
        let names: Vec<_> = recs.iter().map(|r| r.vendor_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        // unparsable amount stays empty
        assert_eq!(recs[0].value, None);
        assert_eq!(recs[1].value, Some(10.0));
        assert_eq!(recs[0].record_id, "");
        assert_eq!(recs[0].notes, "");
        Ok(())
    }

    #[test]
    fn extract_without_supplier_is_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        write(dir.path(), "x.csv", "Region,Amount\nTashkent,5\n")?;
        write(dir.path(), "y.csv", "Supplier,Amount\n,5\nReal,6\n")?;

        let recs = load_uzbek_awards(dir.path())?;
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].vendor_name, "Real");
        Ok(())
    }

    #[test]
    fn cyrillic_headers_are_recognised() -> Result<()> {
        let dir = TempDir::new()?;
        write(
            dir.path(),
            "ru.csv",
            "Ишлаб чиқарувчи,ИНН,Лот,Дата договора\nАО Завод,200100300,12/4,01.03.2022\n",
        )?;
        let recs = load_uzbek_awards(dir.path())?;
        assert_eq!(recs[0].vendor_name, "АО Завод");
        assert_eq!(recs[0].government_identifier, "200100300");
        assert_eq!(recs[0].record_id, "12/4");
        assert_eq!(recs[0].record_date, "2022-03-01");
        Ok(())
    }

    #[test]
    fn dataset_url_keeps_stem_as_one_segment() -> Result<()> {
        assert_eq!(
            dataset_url(Path::new("/data/610.csv"))?,
            "https://data.egov.uz/datasets/610"
        );
        assert_eq!(
            dataset_url(Path::new("uz:610.csv"))?,
            "https://data.egov.uz/datasets/uz:610"
        );
        assert_eq!(
            dataset_url(Path::new("lot#7 a.csv"))?,
            "https://data.egov.uz/datasets/lot%237%20a"
        );
        assert!(dataset_url(Path::new("..csv")).is_err());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(load_uzbek_awards("/no/such/uzbek/dir").is_err());
    }

    #[test]
    fn empty_directory_yields_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(load_uzbek_awards(dir.path())?.is_empty());
        Ok(())
    }
}

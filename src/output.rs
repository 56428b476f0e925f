// src/output.rs

use anyhow::{Context, Result};
use csv::{Terminator, Writer, WriterBuilder};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::record::{RiskRecord, COLUMNS};

/// Column descriptions for the published codebook, in output order.
pub const CODEBOOK: [(&str, &str); 10] = [
    (
        "country",
        "Country or sovereign body that published the record.",
    ),
    (
        "record_type",
        "Either 'exclusion' from SAM (USA) or 'contract_award' from Uzbekistan procurement extracts.",
    ),
    (
        "vendor_name",
        "Primary organization or individual name as published.",
    ),
    (
        "government_identifier",
        "Unique identifier or tax ID provided by the source (DUNS/STIR).",
    ),
    (
        "record_id",
        "SAM Number for exclusions or contract number/lot reference for awards. Not a unique key: rows are not de-duplicated, so a record repeated in a source appears once per repetition.",
    ),
    (
        "record_date",
        "Published effective date (Active Date for exclusions; contract signature date for awards) formatted as YYYY-MM-DD where available.",
    ),
    (
        "value",
        "Monetary value when provided (contract amount in Uzbek soum).",
    ),
    ("currency", "ISO or literal currency string as published."),
    (
        "notes",
        "Concatenated contextual metadata (agency, program, purchase type, etc.).",
    ),
    (
        "source_url",
        "Landing page for the originating dataset or API.",
    ),
];

#[derive(Serialize)]
struct CodebookRow<'a> {
    column: &'a str,
    description: &'a str,
}

/// Write the dataset CSV: header row then one line per record.
pub fn write_dataset<P: AsRef<Path>>(path: P, records: &[RiskRecord]) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |wtr| {
        if records.is_empty() {
            // serialize() only emits the header alongside the first row
            wtr.write_record(COLUMNS)?;
        }
        for rec in records {
            wtr.serialize(rec)?;
        }
        Ok(())
    })
    .with_context(|| format!("writing dataset {:?}", path))?;
    info!(path = %path.display(), rows = records.len(), "wrote dataset");
    Ok(())
}

/// Write the `column,description` codebook.
pub fn write_codebook<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |wtr| {
        for (column, description) in CODEBOOK {
            wtr.serialize(CodebookRow {
                column,
                description,
            })?;
        }
        Ok(())
    })
    .with_context(|| format!("writing codebook {:?}", path))?;
    info!(path = %path.display(), columns = CODEBOOK.len(), "wrote codebook");
    Ok(())
}

/// Serialize `rows` to a CSV file under the output directory.
pub fn write_rows<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |wtr| {
        for row in rows {
            wtr.serialize(row)?;
        }
        Ok(())
    })
    .with_context(|| format!("writing {:?}", path))
}

/// Like [`write_rows`], but an empty section removes any file at `path`
/// instead of writing one. Returns whether a file was written.
pub fn write_section<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<bool> {
    let path = path.as_ref();
    if rows.is_empty() {
        match fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "removed stale output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("removing {:?}", path)),
        }
        return Ok(false);
    }
    write_rows(path, rows)?;
    Ok(true)
}

/// Build the file next to `path` and rename it over the target once complete,
/// so a failed run never leaves a truncated output behind.
fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Writer<BufWriter<File>>) -> Result<()>,
{
    let tmp_path = tmp_sibling(path);
    let file = File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(BufWriter::new(file));

    let result = fill(&mut wtr).and_then(|_| {
        let mut inner = wtr.into_inner().map_err(|e| e.into_error())?;
        inner.flush()?;
        Ok(())
    });
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".into());
    path.with_file_name(format!(".{}.tmp", name))
}

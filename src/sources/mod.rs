// src/sources/mod.rs

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use csv::{Position, ReaderBuilder, StringRecord};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read, Seek},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::process::clean_str;

pub mod sam;
pub mod uzbek;

pub use sam::load_us_exclusions;
pub use uzbek::load_uzbek_awards;

/// Leading bytes of a ZIP container, i.e. an XLSX workbook.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// A headered table (CSV file or first workbook sheet) held in memory.
#[derive(Debug)]
pub struct RawTable {
    pub path: PathBuf,
    /// Header names, cleaned (trimmed, BOM and outer quotes removed).
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` fields.
    pub rows: Vec<StringRecord>,
    index: HashMap<String, usize>,
}

impl RawTable {
    fn new(path: &Path, headers: Vec<String>, rows: Vec<StringRecord>) -> Self {
        // first occurrence wins for duplicated header names
        let index = headers
            .iter()
            .enumerate()
            .rev()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self {
            path: path.to_path_buf(),
            headers,
            rows,
            index,
        }
    }

    /// Position of `name` in the header row.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`column_index`](Self::column_index), but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            anyhow!(
                "{}: required column {:?} not found (have: {})",
                self.path.display(),
                name,
                self.headers.join(", ")
            )
        })
    }

    /// Cleaned value of `row` at `idx`; empty if the index is absent.
    pub fn cell(row: &StringRecord, idx: Option<usize>) -> String {
        idx.and_then(|i| row.get(i)).map(clean_str).unwrap_or_default()
    }

    /// Data line number of the `n`th row (0-based), counting the header as line 1.
    pub fn line_of(&self, n: usize) -> u64 {
        self.rows
            .get(n)
            .and_then(|r| r.position())
            .map(|p| p.line())
            .unwrap_or(n as u64 + 2)
    }
}

/// Read a headered table in full.
///
/// Portal extracts are sometimes XLSX workbooks saved under a `.csv` name;
/// those are recognised by their ZIP signature and their first sheet is read
/// instead.
///
/// Fails with the file (and line, where known) named on: missing or
/// unreadable file, a row whose field count differs from the header, or a
/// field that is not valid UTF-8.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut file =
        File::open(path).with_context(|| format!("Failed to open source file {:?}", path))?;

    let mut magic = Vec::with_capacity(ZIP_MAGIC.len());
    (&mut file)
        .take(ZIP_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .with_context(|| format!("Failed to read {:?}", path))?;

    let table = if magic == ZIP_MAGIC {
        info!("workbook signature found; reading first sheet");
        read_workbook(path)?
    } else {
        file.rewind().with_context(|| format!("Failed to rewind {:?}", path))?;
        read_table(BufReader::new(file), path)?
    };
    debug!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded table"
    );
    Ok(table)
}

fn read_table<R: Read>(reader: R, path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Failed to read header row of {:?}", path))?
        .iter()
        .map(clean_str)
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(anyhow!("{:?} has an empty header row", path));
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| {
            format!("Malformed CSV in {:?} at data row {}", path, idx + 1)
        })?;
        // csv skips blank lines, but a lone delimiter-only line still counts
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(record);
    }

    Ok(RawTable::new(path, headers, rows))
}

/// First worksheet of an XLSX workbook; row 1 holds the headers.
fn read_workbook(path: &Path) -> Result<RawTable> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("Failed to open workbook {:?}", path))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("{:?} has no worksheet", path))?
        .with_context(|| format!("Failed to read first sheet of {:?}", path))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|row| row.iter().map(|c| clean_str(&cell_text(c))).collect())
        .unwrap_or_default();
    if headers.iter().all(String::is_empty) {
        return Err(anyhow!("{:?} has an empty header row", path));
    }

    let mut rows = Vec::new();
    for (idx, row) in sheet_rows.enumerate() {
        let fields: Vec<String> = row.iter().map(cell_text).collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut record = StringRecord::from(fields);
        let mut pos = Position::new();
        // header is line 1
        pos.set_line(idx as u64 + 2);
        record.set_position(Some(pos));
        rows.push(record);
    }

    Ok(RawTable::new(path, headers, rows))
}

/// Text of a workbook cell; dates become `YYYY-MM-DD`, whole floats lose `.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        _ => cell.as_string().unwrap_or_else(|| cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use zip::write::{ExtendedFileOptions, FileOptions};
    use zip::CompressionMethod;

    /// Minimal single-sheet XLSX with inline-string and numeric cells.
    fn workbook_bytes(rows: &[&[&str]]) -> Result<Vec<u8>> {
        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                let cell_ref = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                if value.parse::<f64>().is_ok() {
                    sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, value));
                } else if !value.is_empty() {
                    sheet.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        cell_ref, value
                    ));
                }
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, body) in parts {
                let options = FileOptions::<ExtendedFileOptions>::default()
                    .compression_method(CompressionMethod::Stored);
                zip.start_file(name, options)?;
                zip.write_all(body.as_bytes())?;
            }
            zip.finish()?;
        }
        Ok(buf)
    }

    #[test]
    fn loads_headers_and_rows() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "\u{feff}Name , DUNS\nAcme Corp,123\n\"Beta, Inc\",456\n")?;

        let table = load_table(tmp.path())?;
        assert_eq!(table.headers, vec!["Name", "DUNS"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column_index("DUNS"), Some(1));
        assert_eq!(RawTable::cell(&table.rows[1], table.column_index("Name")), "Beta, Inc");
        assert_eq!(RawTable::cell(&table.rows[1], None), "");
        assert_eq!(table.line_of(1), 3);
        Ok(())
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_table("/definitely/not/here.csv").unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/not/here.csv"));
    }

    #[test]
    fn wrong_field_count_is_fatal() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "a,b\n1,2\n3\n")?;

        let err = load_table(tmp.path()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("data row 2"), "{}", msg);
        assert!(msg.contains(&tmp.path().display().to_string()), "{}", msg);
        Ok(())
    }

    #[test]
    fn invalid_utf8_is_fatal() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"a,b\n\xff\xfe,2\n")?;
        assert!(load_table(tmp.path()).is_err());
        Ok(())
    }

    #[test]
    fn reads_workbook_saved_as_csv() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&workbook_bytes(&[
            &["Name of supplier", "STIR", "Contract amount"],
            &["OOO Tex Service", "301234567", "1500000"],
            &["", "", ""],
            &["Beta Trade", "", "250000.5"],
        ])?)?;

        let table = load_table(tmp.path())?;
        assert_eq!(table.headers, vec!["Name of supplier", "STIR", "Contract amount"]);
        assert_eq!(table.rows.len(), 2);
        let amount = table.column_index("Contract amount");
        assert_eq!(RawTable::cell(&table.rows[0], table.column_index("STIR")), "301234567");
        assert_eq!(RawTable::cell(&table.rows[0], amount), "1500000");
        assert_eq!(RawTable::cell(&table.rows[1], amount), "250000.5");
        assert_eq!(RawTable::cell(&table.rows[1], table.column_index("STIR")), "");
        // blank sheet row skipped, numbering still follows the sheet
        assert_eq!(table.line_of(1), 4);
        Ok(())
    }

    #[test]
    fn require_column_lists_available_headers() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "Name,DUNS\nAcme,1\n")?;
        let table = load_table(tmp.path())?;
        let msg = table.require_column("CAGE").unwrap_err().to_string();
        assert!(msg.contains("\"CAGE\""));
        assert!(msg.contains("Name, DUNS"));
        Ok(())
    }
}

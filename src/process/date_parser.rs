use chrono::{NaiveDate, NaiveDateTime};

/// Date-only layouts, in the order they are tried.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d"];

/// Layouts that carry a time part we discard.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a published date into a `NaiveDate`.
///
/// Slashed dates are U.S. month-first (SAM), dotted dates are day-first
/// (Uzbek portal). Fractional seconds and a trailing `Z` are ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }
    // "2023-04-01T10:00:00.123Z" → "2023-04-01T10:00:00"
    let s = s.trim_end_matches('Z');
    let s = match s.find('.') {
        Some(idx) if idx >= 19 => &s[..idx],
        _ => s,
    };

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Normalise to `YYYY-MM-DD`; `None` when the value is blank or unparsable.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

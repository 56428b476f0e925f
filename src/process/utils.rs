use once_cell::sync::Lazy;
use regex::Regex;

/// Digit-group separators seen in published amounts: spaces, NBSP/NNBSP, apostrophes.
static GROUP_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\u{00A0}\u{202F}']").expect("separator regex should compile"));

/// Trim whitespace, drop a UTF-8 BOM and strip one pair of outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Return the first header that contains any candidate, case-insensitively.
///
/// Candidates are tried in priority order; for each one, headers are scanned
/// in file order.
pub fn find_column<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        let needle = candidate.to_lowercase();
        headers
            .iter()
            .find(|h| h.to_lowercase().contains(&needle))
            .map(String::as_str)
    })
}

/// Join the non-empty parts with `sep`.
pub fn join_nonempty<I, S>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter(|p| !p.as_ref().is_empty())
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Parse a published monetary amount.
///
/// Accepts `1500000`, `1 500 000,50`, `1,500,000.50`, `12'000`, `12,500`, `0,125`.
/// Returns `None` for anything that is not a finite number once separators are removed.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    let spaced = GROUP_SEPARATORS.is_match(&cleaned);
    let compact = GROUP_SEPARATORS.replace_all(&cleaned, "");
    let normalized = match (compact.contains('.'), compact.matches(',').count()) {
        // comma as thousands separator alongside a decimal point
        (true, _) => compact.replace(',', ""),
        (false, 1) if comma_is_thousands(&compact, spaced) => compact.replace(',', ""),
        (false, 1) => compact.replace(',', "."),
        (false, 0) => compact.into_owned(),
        // several commas and no point: grouping only
        (false, _) => compact.replace(',', ""),
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A lone comma groups thousands only when exactly three digits follow it,
/// the integer part is not zero, and no other group separator was used.
fn comma_is_thousands(compact: &str, spaced: bool) -> bool {
    let Some((int, frac)) = compact.split_once(',') else {
        return false;
    };
    let int = int.trim_start_matches(['-', '+']);
    !spaced && frac.len() == 3 && !int.trim_start_matches('0').is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_strips_quotes_and_bom() {
        assert_eq!(clean_str("  Acme Corp "), "Acme Corp");
        assert_eq!(clean_str("\"Acme\""), "Acme");
        assert_eq!(clean_str("\u{feff}Name"), "Name");
        assert_eq!(clean_str("\""), "\"");
    }

    #[test]
    fn find_column_respects_candidate_priority() {
        let headers: Vec<String> = ["Source of funding", "Name of supplier", "Supplier STIR"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            find_column(&headers, &["Name of supplier", "Supplier"]),
            Some("Name of supplier")
        );
        // "supplier" matches the first header containing it, in file order
        assert_eq!(find_column(&headers, &["supplier"]), Some("Name of supplier"));
        assert_eq!(find_column(&headers, &["stir", "tin"]), Some("Supplier STIR"));
        assert_eq!(find_column(&headers, &["Currency"]), None);
    }

    #[test]
    fn find_column_matches_cyrillic_headers() {
        let headers = vec!["Ишлаб чиқарувчи".to_string(), "ИНН".to_string()];
        assert_eq!(
            find_column(&headers, &["Supplier", "Ишлаб чиқарувчи"]),
            Some("Ишлаб чиқарувчи")
        );
        assert_eq!(find_column(&headers, &["инн"]), Some("ИНН"));
    }

    #[test]
    fn join_nonempty_skips_blanks() {
        assert_eq!(join_nonempty(["Mr", "", "John", "Doe"], " "), "Mr John Doe");
        assert_eq!(join_nonempty(Vec::<String>::new(), " | "), "");
    }

    #[test]
    fn parse_amount_handles_local_formats() {
        assert_eq!(parse_amount("1500000"), Some(1_500_000.0));
        assert_eq!(parse_amount("1 500 000,50"), Some(1_500_000.5));
        assert_eq!(parse_amount("1\u{00A0}200"), Some(1200.0));
        assert_eq!(parse_amount("1,500,000.25"), Some(1_500_000.25));
        assert_eq!(parse_amount("12'000"), Some(12_000.0));
        assert_eq!(parse_amount("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_amount("12,500"), Some(12_500.0));
        assert_eq!(parse_amount("1000,5"), Some(1000.5));
        assert_eq!(parse_amount("0,125"), Some(0.125));
        assert_eq!(parse_amount("-0,500"), Some(-0.5));
        assert_eq!(parse_amount(",250"), Some(0.25));
        assert_eq!(parse_amount("1 000,000"), Some(1000.0));
        assert_eq!(parse_amount("12'500,250"), Some(12_500.25));
        assert_eq!(parse_amount("-12,500"), Some(-12_500.0));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("inf"), None);
    }
}

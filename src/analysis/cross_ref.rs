use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{Country, RiskRecord};

/// Vendor name that appears verbatim (case-insensitively) in both jurisdictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossBorderVendor {
    pub vendor_name: String,
    pub us_records: usize,
    pub uzbek_records: usize,
    pub note: String,
}

/// Exact upper-cased name matches only; results need manual verification.
pub fn cross_reference(records: &[RiskRecord]) -> Vec<CrossBorderVendor> {
    let mut tally: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for r in records {
        let e = tally.entry(r.vendor_name.to_uppercase()).or_insert((0, 0));
        match r.country {
            Country::UnitedStates => e.0 += 1,
            Country::Uzbekistan => e.1 += 1,
        }
    }

    tally
        .into_iter()
        .filter(|(_, (us, uz))| *us > 0 && *uz > 0)
        .map(|(name, (us, uz))| CrossBorderVendor {
            vendor_name: name,
            us_records: us,
            uzbek_records: uz,
            note: "Requires manual verification".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{award, exclusion, sample};

    #[test]
    fn finds_vendor_in_both_countries() {
        let hits = cross_reference(&sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].vendor_name, "ACME CORP");
        assert_eq!(hits[0].us_records, 2);
        assert_eq!(hits[0].uzbek_records, 1);
    }

    #[test]
    fn match_ignores_case() {
        let hits = cross_reference(&[exclusion("Acme Corp", "", ""), award("ACME corp", None, "1")]);
        assert_eq!(hits.len(), 1);
        assert!(cross_reference(&[exclusion("Acme", "", "")]).is_empty());
    }
}

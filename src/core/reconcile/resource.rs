//! Resource-class filter
//!
//! Electronic-only resources are held through licences, not shelves, so
//! their holdings are never expected to match. The class is read from
//! control field `008`, first character: `O` marks an electronic resource.

use crate::adapters::marc::MarcRecord;
use crate::domain::{Anomaly, FetchResult, Ppn};
use std::collections::HashSet;

const CLASS_FIELD: &str = "008";
const ELECTRONIC: char = 'O';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Electronic,
    Other,
    /// Record or field could not be read
    Unknown,
}

impl ResourceClass {
    pub fn is_excluded(self) -> bool {
        self == ResourceClass::Electronic
    }
}

/// Class of a MARCXML record
pub fn classify(xml: &str) -> ResourceClass {
    let record = match MarcRecord::from_xml(xml) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(error = %e, "Cannot decode record for classification");
            return ResourceClass::Unknown;
        }
    };

    let class = record
        .get_field(CLASS_FIELD)
        .first()
        .and_then(|field| field.value(""))
        .and_then(|value| value.chars().next());

    match class {
        Some(ELECTRONIC) => ResourceClass::Electronic,
        Some(_) => ResourceClass::Other,
        None => ResourceClass::Unknown,
    }
}

/// Identifiers whose fetched record marks an electronic resource
///
/// Failed fetches and unreadable records are kept out of the result.
pub fn electronic_identifiers(records: Vec<(Ppn, FetchResult<String>)>) -> HashSet<Ppn> {
    records
        .into_iter()
        .filter_map(|(ppn, result)| match result {
            Ok(xml) => classify(&xml).is_excluded().then_some(ppn),
            Err(e) => {
                tracing::debug!(ppn = %ppn, error = %e, "Keeping record, class unavailable");
                None
            }
        })
        .collect()
}

/// Identifiers carrying at least one anomaly, in first-seen order
pub fn anomalous_identifiers(anomalies: &[Anomaly]) -> Vec<Ppn> {
    let mut seen = HashSet::new();
    anomalies
        .iter()
        .filter(|a| seen.insert(a.identifier.clone()))
        .map(|a| a.identifier.clone())
        .collect()
}

/// Drops the anomalies of excluded identifiers; returns how many went
pub fn drop_excluded(anomalies: &mut Vec<Anomaly>, excluded: &HashSet<Ppn>) -> usize {
    let before = anomalies.len();
    anomalies.retain(|a| !excluded.contains(&a.identifier));
    before - anomalies.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchError;
    use test_case::test_case;

    fn record_with_008(value: &str) -> String {
        format!(
            "<record><leader>00000cam a2200000 i 4500</leader>\
             <controlfield tag=\"001\">123456789</controlfield>\
             <controlfield tag=\"008\">{value}</controlfield></record>"
        )
    }

    #[test_case(&record_with_008("Oax3"), ResourceClass::Electronic ; "electronic")]
    #[test_case(&record_with_008("Aax3"), ResourceClass::Other ; "printed text")]
    #[test_case(&record_with_008(" Oax3"), ResourceClass::Other ; "blank first position")]
    #[test_case(&record_with_008(""), ResourceClass::Unknown ; "empty 008")]
    #[test_case("<record><leader>x</leader></record>", ResourceClass::Unknown ; "missing 008")]
    #[test_case("not xml at all", ResourceClass::Unknown ; "undecodable")]
    fn test_classify(xml: &str, expected: ResourceClass) {
        assert_eq!(classify(xml), expected);
    }

    fn ppn(id: &str) -> Ppn {
        Ppn::new(id).unwrap()
    }

    #[test]
    fn test_electronic_identifiers_fail_open() {
        let excluded = electronic_identifiers(vec![
            (ppn("100000000"), Ok(record_with_008("Oa"))),
            (ppn("200000000"), Ok(record_with_008("Aa"))),
            (ppn("300000000"), Err(FetchError::TransientNetwork("timeout".to_string()))),
            (ppn("400000000"), Ok("garbage".to_string())),
        ]);
        assert_eq!(excluded, [ppn("100000000")].into_iter().collect());
    }

    #[test]
    fn test_drop_excluded() {
        let mut anomalies = vec![
            Anomaly::missing_in_target(ppn("100000000"), "15", "A1", "x"),
            Anomaly::missing_in_target(ppn("200000000"), "15", "A1", "x"),
            Anomaly::missing_in_source(ppn("100000000"), "15", "A1", "y"),
        ];
        assert_eq!(
            anomalous_identifiers(&anomalies),
            vec![ppn("100000000"), ppn("200000000")]
        );

        let removed = drop_excluded(&mut anomalies, &[ppn("100000000")].into_iter().collect());
        assert_eq!(removed, 2);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].identifier, ppn("200000000"));
    }
}

//! Reconciliation comparator
//!
//! A SUDOC holding is matched when an eligible Alma holding of the same
//! work sits in one of the Alma libraries mapped to its RCR. An Alma holding
//! is matched when a SUDOC holding of the work sits in one of the RCRs mapped
//! to its library. Every unmatched holding becomes an [`Anomaly`].

use crate::core::mapping::CodeMapping;
use crate::domain::{Anomaly, TargetLocation, ValidityFilter, WorkRecord};
use std::collections::HashSet;
use std::sync::Arc;

pub struct Comparator {
    mapping: Arc<CodeMapping>,
    validity: ValidityFilter,
    multi_building: HashSet<String>,
}

impl Comparator {
    pub fn new(
        mapping: Arc<CodeMapping>,
        validity: ValidityFilter,
        multi_building: HashSet<String>,
    ) -> Self {
        Self {
            mapping,
            validity,
            multi_building,
        }
    }

    pub fn mapping(&self) -> &CodeMapping {
        &self.mapping
    }

    /// Anomalies of one record, SUDOC side first, in holding order
    ///
    /// A side that could not be fetched counts as holding nothing.
    pub fn compare(&self, record: &WorkRecord) -> Vec<Anomaly> {
        let eligible: Vec<&TargetLocation> = record
            .target()
            .iter()
            .filter(|t| self.validity.is_valid(t))
            .collect();
        let source_codes: HashSet<&str> = record
            .source()
            .iter()
            .map(|s| s.holder_code.as_str())
            .collect();

        let mut anomalies = Vec::new();

        for source in record.source() {
            let equivalents = self.mapping.source_to_target(&source.holder_code);
            let matched = eligible
                .iter()
                .any(|t| equivalents.iter().any(|code| *code == t.holder_code));
            if matched {
                continue;
            }

            let mut label = source.display_name.clone();
            if self.multi_building.contains(&source.holder_code) && !source.sub_location.is_empty()
            {
                label.push_str(" - ");
                label.push_str(&source.sub_location);
            }
            anomalies.push(Anomaly::missing_in_target(
                record.identifier.clone(),
                &source.region_code,
                &source.holder_code,
                label,
            ));
        }

        for target in eligible {
            let equivalents = self.mapping.target_to_source(&target.holder_code);
            if equivalents
                .iter()
                .any(|code| source_codes.contains(code.as_str()))
            {
                continue;
            }

            // First mapped RCR stands for the library; unmapped libraries get none
            let holder_code = equivalents.first().map(String::as_str).unwrap_or_default();
            let region_code = self.mapping.region(holder_code).unwrap_or_default();
            let label = self
                .mapping
                .target_name(&target.holder_code)
                .unwrap_or(target.holder_name.as_str());

            anomalies.push(Anomaly::missing_in_source(
                record.identifier.clone(),
                region_code,
                holder_code,
                label,
            ));
        }

        anomalies
    }

    /// Anomalies of every record, in record order
    pub fn compare_all<'a>(&self, records: impl IntoIterator<Item = &'a WorkRecord>) -> Vec<Anomaly> {
        records
            .into_iter()
            .flat_map(|record| self.compare(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapping::MappingRow;
    use crate::domain::{AnomalySide, Item, Ppn, SourceLocation};

    fn mapping() -> Arc<CodeMapping> {
        Arc::new(
            CodeMapping::from_rows(vec![
                MappingRow::new("BU Lettres", "B1", "A1", "15", ""),
                MappingRow::new("BU Lettres annexe", "B2", "A1", "15", ""),
                MappingRow::new("BU Sciences", "B3", "A3", "15", ""),
                MappingRow::new("BU Sciences", "B3", "A4", "16", ""),
                MappingRow::new("Documentation", "B9", "", "", ""),
            ])
            .unwrap(),
        )
    }

    fn comparator() -> Comparator {
        Comparator::new(
            mapping(),
            ValidityFilter::default(),
            ["A1".to_string()].into_iter().collect(),
        )
    }

    fn available(library: &str) -> TargetLocation {
        TargetLocation::builder(library)
            .holder_name(format!("{library} from Alma"))
            .item(Item::new(""))
            .build()
    }

    fn source(rcr: &str) -> SourceLocation {
        SourceLocation::new(rcr).with_holder_details("15", format!("Library {rcr}"))
    }

    fn record(sources: Vec<SourceLocation>, targets: Vec<TargetLocation>) -> WorkRecord {
        let mut record = WorkRecord::new(Ppn::new("123456789").unwrap());
        record.source_locations = Some(sources);
        record.target_locations = Some(targets);
        record
    }

    #[test]
    fn test_matched_through_any_equivalent() {
        let anomalies = comparator().compare(&record(vec![source("A1")], vec![available("B2")]));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_source_without_target_is_anomaly() {
        let anomalies = comparator().compare(&record(vec![source("A1")], vec![]));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].side(), AnomalySide::MissingInTarget);
        assert_eq!(anomalies[0].holder_code, "A1");
        assert_eq!(anomalies[0].region_code, "15");
        assert_eq!(anomalies[0].source_label, "Library A1");
    }

    #[test]
    fn test_unmapped_source_is_anomaly() {
        let anomalies =
            comparator().compare(&record(vec![source("A7")], vec![available("B1")]));
        let sides: Vec<AnomalySide> = anomalies.iter().map(Anomaly::side).collect();
        assert_eq!(
            sides,
            vec![AnomalySide::MissingInTarget, AnomalySide::MissingInSource]
        );
    }

    #[test]
    fn test_ineligible_target_counts_as_absent() {
        let ordered = TargetLocation::builder("B1").item(Item::new("ACQ")).build();
        let anomalies = comparator().compare(&record(vec![source("A1")], vec![ordered]));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].side(), AnomalySide::MissingInTarget);
    }

    #[test]
    fn test_target_anomaly_uses_first_mapped_rcr() {
        let anomalies = comparator().compare(&record(vec![], vec![available("B3")]));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].holder_code, "A3");
        assert_eq!(anomalies[0].region_code, "15");
        assert_eq!(anomalies[0].target_label, "BU Sciences");
        assert!(anomalies[0].source_label.is_empty());
    }

    #[test]
    fn test_target_matched_by_second_rcr() {
        let anomalies = comparator().compare(&record(vec![source("A4")], vec![available("B3")]));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_target_without_rcr_has_empty_holder() {
        let anomalies = comparator().compare(&record(vec![], vec![available("B9")]));
        assert_eq!(anomalies[0].holder_code, "");
        assert_eq!(anomalies[0].region_code, "");
        assert_eq!(anomalies[0].target_label, "Documentation");
    }

    #[test]
    fn test_unknown_library_falls_back_to_alma_name() {
        let anomalies = comparator().compare(&record(vec![], vec![available("ZZ")]));
        assert_eq!(anomalies[0].target_label, "ZZ from Alma");
    }

    #[test]
    fn test_multi_building_label() {
        let located = source("A1").with_sub_location("Richter, Triolet");
        let anomalies = comparator().compare(&record(vec![located], vec![]));
        assert_eq!(anomalies[0].source_label, "Library A1 - Richter, Triolet");

        let elsewhere = source("A3").with_sub_location("Magasin");
        let anomalies = comparator().compare(&record(vec![elsewhere], vec![]));
        assert_eq!(anomalies[0].source_label, "Library A3");
    }

    #[test]
    fn test_missing_target_side_counts_as_empty() {
        let mut partial = record(vec![source("A1")], vec![]);
        partial.target_locations = None;
        assert_eq!(comparator().compare(&partial).len(), 1);
    }

    #[test]
    fn test_compare_is_deterministic() {
        let records = vec![
            record(vec![source("A1"), source("A3")], vec![available("B9")]),
            record(vec![source("A4")], vec![available("B1"), available("B3")]),
        ];
        let comparator = comparator();
        let first = comparator.compare_all(&records);
        let second = comparator.compare_all(&records);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }
}

//! Eligibility rule for Alma holdings
//!
//! A holding counts as a real copy only when it is published, has items,
//! and at least one item is out of an excluded process (by default `ACQ`,
//! copies still being ordered).

use super::location::TargetLocation;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityFilter {
    excluded_process_codes: HashSet<String>,
}

impl ValidityFilter {
    pub fn new<I, S>(excluded_process_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_process_codes: excluded_process_codes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_valid(&self, location: &TargetLocation) -> bool {
        if location.suppressed || location.items.is_empty() {
            return false;
        }
        !location
            .items
            .iter()
            .all(|item| self.excluded_process_codes.contains(&item.process_code))
    }
}

impl Default for ValidityFilter {
    fn default() -> Self {
        Self::new(["ACQ"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::Item;
    use test_case::test_case;

    fn location(suppressed: bool, codes: &[&str]) -> TargetLocation {
        let mut builder = TargetLocation::builder("LETTRES").suppressed(suppressed);
        for code in codes {
            builder = builder.item(Item::new(*code));
        }
        builder.build()
    }

    #[test_case(false, &["ACQ"], false ; "all items in acquisition")]
    #[test_case(false, &["ACQ", "ACQ"], false ; "several items all in acquisition")]
    #[test_case(false, &["ACQ", ""], true ; "one item in place")]
    #[test_case(false, &["LOAN"], true ; "item on loan")]
    #[test_case(false, &[], false ; "no items")]
    #[test_case(true, &[""], false ; "suppressed holding")]
    fn test_default_validity(suppressed: bool, codes: &[&str], expected: bool) {
        let filter = ValidityFilter::default();
        assert_eq!(filter.is_valid(&location(suppressed, codes)), expected);
    }

    #[test]
    fn test_custom_excluded_codes() {
        let filter = ValidityFilter::new(vec!["ACQ".to_string(), "LOST_LOAN".to_string()]);
        assert!(!filter.is_valid(&location(false, &["ACQ", "LOST_LOAN"])));
        assert!(filter.is_valid(&location(false, &["ACQ", "WORK_ORDER_DEPARTMENT"])));
    }

    #[test]
    fn test_empty_exclusion_keeps_any_item() {
        let filter = ValidityFilter::new(Vec::<String>::new());
        assert!(filter.is_valid(&location(false, &["ACQ"])));
    }
}

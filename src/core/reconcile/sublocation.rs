//! Merge of multi-building holdings
//!
//! Some RCRs cover several buildings and SUDOC lists one `930` per building.
//! Those holdings are folded into one location whose sub-location lists
//! every distinct building, so they yield a single anomaly.

use crate::domain::SourceLocation;
use std::collections::{HashMap, HashSet};

/// Folds the locations of multi-building RCRs into one location per RCR
///
/// The merged location takes the place of the first occurrence. Its
/// sub-location is the distinct non-empty sub-locations joined with `", "`.
/// Other locations are kept unchanged.
pub fn merge_sublocations(
    locations: Vec<SourceLocation>,
    multi_building: &HashSet<String>,
) -> Vec<SourceLocation> {
    let mut merged: Vec<SourceLocation> = Vec::with_capacity(locations.len());
    let mut parts: HashMap<usize, Vec<String>> = HashMap::new();
    let mut first_seen: HashMap<String, usize> = HashMap::new();

    for location in locations {
        if !multi_building.contains(&location.holder_code) {
            merged.push(location);
            continue;
        }

        let idx = match first_seen.get(&location.holder_code) {
            Some(idx) => *idx,
            None => {
                let idx = merged.len();
                first_seen.insert(location.holder_code.clone(), idx);
                merged.push(location.clone());
                idx
            }
        };

        let sub_location = location.sub_location.trim();
        let seen = parts.entry(idx).or_default();
        if !sub_location.is_empty() && !seen.iter().any(|s| s == sub_location) {
            seen.push(sub_location.to_string());
        }
    }

    for (idx, sub_locations) in parts {
        merged[idx].sub_location = sub_locations.join(", ");
    }
    merged
}

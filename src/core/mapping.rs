//! Library code mapping between SUDOC and Alma
//!
//! The table is many-to-many: an RCR may cover several Alma libraries and
//! an Alma library may report under several RCRs. It is loaded once and
//! read-only afterwards, so it can be shared behind an `Arc`.

use crate::domain::{CaslError, Result};
use std::collections::{HashMap, HashSet};

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    /// Alma library name
    pub target_name: String,
    /// Alma library code
    pub target_code: String,
    /// RCR, may be empty for libraries with no SUDOC counterpart
    pub source_code: String,
    /// ILN of the RCR
    pub region_code: String,
    /// SUDOC library name, may be empty
    pub source_name: String,
}

impl MappingRow {
    pub fn new(
        target_name: impl Into<String>,
        target_code: impl Into<String>,
        source_code: impl Into<String>,
        region_code: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            target_code: target_code.into(),
            source_code: source_code.into(),
            region_code: region_code.into(),
            source_name: source_name.into(),
        }
    }
}

/// Provider of mapping rows
pub trait MappingSource {
    fn load(&self) -> Result<Vec<MappingRow>>;
}

/// Bidirectional code mapping with display names and region lookup
#[derive(Debug, Clone, Default)]
pub struct CodeMapping {
    source_to_target: HashMap<String, Vec<String>>,
    target_to_source: HashMap<String, Vec<String>>,
    target_names: HashMap<String, String>,
    source_names: HashMap<String, String>,
    regions: HashMap<String, String>,
    target_codes: Vec<String>,
}

impl CodeMapping {
    /// Loads the mapping from a source
    pub fn load(source: &dyn MappingSource) -> Result<Self> {
        let rows = source.load()?;
        let mapping = Self::from_rows(rows)?;
        tracing::info!(
            target_codes = mapping.target_codes.len(),
            source_codes = mapping.source_to_target.len(),
            "Code mapping loaded"
        );
        Ok(mapping)
    }

    /// Builds the mapping from rows
    ///
    /// # Errors
    ///
    /// A row without an Alma library code is rejected.
    pub fn from_rows(rows: impl IntoIterator<Item = MappingRow>) -> Result<Self> {
        let mut mapping = Self::default();

        for (idx, row) in rows.into_iter().enumerate() {
            let target_code = row.target_code.trim().to_string();
            let source_code = row.source_code.trim().to_string();
            if target_code.is_empty() {
                return Err(CaslError::Mapping(format!(
                    "Mapping row {} has no Alma library code",
                    idx + 1
                )));
            }

            if !mapping.target_names.contains_key(&target_code) {
                mapping.target_codes.push(target_code.clone());
            }
            let target_name = mapping.target_names.entry(target_code.clone()).or_default();
            if target_name.is_empty() {
                *target_name = row.target_name.trim().to_string();
            }

            if source_code.is_empty() {
                continue;
            }

            push_unique(
                mapping.source_to_target.entry(source_code.clone()).or_default(),
                &target_code,
            );
            push_unique(
                mapping.target_to_source.entry(target_code.clone()).or_default(),
                &source_code,
            );

            let region = row.region_code.trim();
            match mapping.regions.get(&source_code) {
                Some(existing) if existing != region => {
                    tracing::warn!(
                        rcr = %source_code,
                        kept = %existing,
                        ignored = %region,
                        "RCR mapped to several ILNs"
                    );
                }
                Some(_) => {}
                None => {
                    mapping.regions.insert(source_code.clone(), region.to_string());
                }
            }

            let source_name = row.source_name.trim();
            if !source_name.is_empty() {
                mapping
                    .source_names
                    .entry(source_code)
                    .or_insert_with(|| source_name.to_string());
            }
        }

        Ok(mapping)
    }

    /// Alma library codes equivalent to an RCR
    pub fn source_to_target(&self, source_code: &str) -> &[String] {
        self.source_to_target
            .get(source_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// RCRs equivalent to an Alma library code, in table order
    pub fn target_to_source(&self, target_code: &str) -> &[String] {
        self.target_to_source
            .get(target_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn target_name(&self, target_code: &str) -> Option<&str> {
        self.target_names
            .get(target_code)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn source_name(&self, source_code: &str) -> Option<&str> {
        self.source_names.get(source_code).map(String::as_str)
    }

    /// ILN of an RCR
    pub fn region(&self, source_code: &str) -> Option<&str> {
        self.regions.get(source_code).map(String::as_str)
    }

    /// Every Alma library code of the table, in table order
    pub fn target_codes(&self) -> &[String] {
        &self.target_codes
    }

    /// Every Alma library code of the table, as a set
    pub fn target_code_set(&self) -> HashSet<String> {
        self.target_codes.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.target_codes.is_empty()
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

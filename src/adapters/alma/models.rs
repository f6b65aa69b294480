//! Alma REST API response models (XML)

use serde::Deserialize;

/// `<bibs total_record_count="...">`
#[derive(Debug, Deserialize)]
pub struct Bibs {
    #[serde(rename = "@total_record_count", default)]
    pub total_record_count: String,

    #[serde(rename = "bib", default)]
    pub bibs: Vec<Bib>,
}

#[derive(Debug, Deserialize)]
pub struct Bib {
    #[serde(default)]
    pub mms_id: String,

    #[serde(default)]
    pub network_numbers: NetworkNumbers,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkNumbers {
    #[serde(rename = "network_number", default)]
    pub values: Vec<String>,
}

/// `<items total_record_count="...">`
#[derive(Debug, Deserialize)]
pub struct Items {
    #[serde(rename = "@total_record_count", default)]
    pub total_record_count: String,

    #[serde(rename = "item", default)]
    pub items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ItemEntry {
    #[serde(default)]
    pub holding_data: HoldingData,

    #[serde(default)]
    pub item_data: ItemData,
}

#[derive(Debug, Default, Deserialize)]
pub struct HoldingData {
    #[serde(default)]
    pub holding_id: String,

    #[serde(default)]
    pub holding_suppress_from_publishing: String,

    #[serde(default)]
    pub call_number: String,
}

impl HoldingData {
    pub fn is_suppressed(&self) -> bool {
        self.holding_suppress_from_publishing.trim() == "true"
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub base_status: CodeDesc,

    #[serde(default)]
    pub process_type: CodeDesc,

    #[serde(default)]
    pub library: CodeDesc,

    #[serde(default)]
    pub location: CodeDesc,
}

/// Element with a code as text and a `desc` attribute
#[derive(Debug, Default, Deserialize)]
pub struct CodeDesc {
    #[serde(rename = "@desc", default)]
    pub desc: String,

    #[serde(rename = "$text", default)]
    pub code: String,
}

/// Error body: `<web_service_result><errorList><error>...`
#[derive(Debug, Deserialize)]
pub struct WebServiceResult {
    #[serde(rename = "errorList", default)]
    pub error_list: ErrorList,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorList {
    #[serde(rename = "error", default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEntry {
    #[serde(rename = "errorCode", default)]
    pub code: String,

    #[serde(rename = "errorMessage", default)]
    pub message: String,
}

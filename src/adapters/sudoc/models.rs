//! `iln2rcr` response models

use serde::Deserialize;

/// `<sudoc service="iln2rcr">` root
#[derive(Debug, Deserialize)]
pub struct Iln2RcrResponse {
    #[serde(rename = "query", default)]
    pub queries: Vec<Iln2RcrQuery>,
}

/// Libraries of one ILN
#[derive(Debug, Deserialize)]
pub struct Iln2RcrQuery {
    #[serde(default)]
    pub iln: String,

    #[serde(default)]
    pub result: Iln2RcrResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct Iln2RcrResult {
    #[serde(rename = "library", default)]
    pub libraries: Vec<Iln2RcrLibrary>,
}

#[derive(Debug, Deserialize)]
pub struct Iln2RcrLibrary {
    #[serde(default)]
    pub rcr: String,

    #[serde(default)]
    pub shortname: String,
}

//! SUDOC HTTP client

use super::models::Iln2RcrResponse;
use crate::adapters::fetcher::{RecordFetcher, RequestCounts, SourceFetcher};
use crate::adapters::http::{build_http_client, classify_status, transport_error, with_trailing_slash};
use crate::adapters::marc::MarcRecord;
use crate::config::SudocConfig;
use crate::domain::ids::Ppn;
use crate::domain::{CaslError, FetchError, FetchResult, Result, SourceLocation};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Holdings field of SUDOC records
const HOLDINGS_TAG: &str = "930";

/// What the holder directory knows about an RCR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderInfo {
    /// ILN the library belongs to
    pub region_code: String,
    /// Library short name
    pub display_name: String,
}

/// Client for the SUDOC record and `iln2rcr` services
///
/// # Example
///
/// ```no_run
/// use casl::adapters::sudoc::SudocClient;
/// use casl::adapters::SourceFetcher;
/// use casl::config::load_config;
/// use casl::domain::Ppn;
///
/// # async fn example() -> casl::domain::Result<()> {
/// let config = load_config("casl.toml")?;
/// let client = SudocClient::new(&config.sudoc).await?;
/// let ppn = Ppn::new("076254208").map_err(casl::domain::CaslError::Validation)?;
/// let locations = client.get_locations(&ppn).await?;
/// # Ok(())
/// # }
/// ```
pub struct SudocClient {
    client: Client,
    base_url: String,
    holders: HashMap<String, HolderInfo>,
    followed: HashSet<String>,
    record_requests: AtomicU64,
    directory_requests: AtomicU64,
}

impl SudocClient {
    /// Builds the client and loads the holder directory of the tracked ILNs
    ///
    /// # Errors
    ///
    /// Fails when the directory service is unreachable or knows none of the ILNs.
    pub async fn new(config: &SudocConfig) -> Result<Self> {
        let client = build_http_client(config.timeout_seconds)?;
        let url = format!(
            "{}{}",
            with_trailing_slash(&config.iln2rcr_url),
            config.ilns.join(",")
        );

        tracing::info!(ilns = ?config.ilns, "Loading SUDOC holder directory");

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| CaslError::Fetch(transport_error(e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CaslError::Fetch(transport_error(e)))?;
        if !status.is_success() {
            return Err(CaslError::Fetch(classify_status(status.as_u16(), &body)));
        }

        let holders = parse_directory(&body)?;
        let sudoc = Self::with_directory(client, config, holders);
        sudoc.directory_requests.fetch_add(1, Ordering::Relaxed);
        Ok(sudoc)
    }

    /// Builds the client from an already known holder directory
    pub fn from_directory(
        config: &SudocConfig,
        holders: HashMap<String, HolderInfo>,
    ) -> Result<Self> {
        let client = build_http_client(config.timeout_seconds)?;
        Ok(Self::with_directory(client, config, holders))
    }

    fn with_directory(
        client: Client,
        config: &SudocConfig,
        holders: HashMap<String, HolderInfo>,
    ) -> Self {
        let ignored: HashSet<&str> = config.ignored_rcrs.iter().map(String::as_str).collect();
        let followed: HashSet<String> = holders
            .keys()
            .filter(|rcr| !ignored.contains(rcr.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            holders = holders.len(),
            followed = followed.len(),
            ignored = ignored.len(),
            "SUDOC holder directory ready"
        );

        Self {
            client,
            base_url: with_trailing_slash(&config.base_url),
            holders,
            followed,
            record_requests: AtomicU64::new(0),
            directory_requests: AtomicU64::new(0),
        }
    }

    /// RCRs of the tracked ILNs minus the ignored ones
    pub fn followed_rcrs(&self) -> &HashSet<String> {
        &self.followed
    }

    /// Directory entry of an RCR
    pub fn holder(&self, rcr: &str) -> Option<&HolderInfo> {
        self.holders.get(rcr)
    }

    async fn get_record(&self, ppn: &Ppn) -> FetchResult<String> {
        let url = format!("{}{}.xml", self.base_url, ppn);
        self.record_requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(ppn = %ppn, "Fetching SUDOC record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return response.text().await.map_err(transport_error);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &body))
    }

    fn describe(&self, mut location: SourceLocation) -> SourceLocation {
        if let Some(info) = self.holders.get(&location.holder_code) {
            location = location.with_holder_details(&info.region_code, &info.display_name);
        }
        location
    }
}

#[async_trait]
impl SourceFetcher for SudocClient {
    fn name(&self) -> &str {
        "sudoc"
    }

    async fn get_locations(&self, ppn: &Ppn) -> FetchResult<Vec<SourceLocation>> {
        let xml = self.get_record(ppn).await?;
        let locations = parse_locations(ppn, &xml)?;
        Ok(locations.into_iter().map(|l| self.describe(l)).collect())
    }

    fn request_counts(&self) -> RequestCounts {
        let records = self.record_requests.load(Ordering::Relaxed);
        let directory = self.directory_requests.load(Ordering::Relaxed);
        vec![
            ("records", records),
            ("iln2rcr", directory),
            ("total", records + directory),
        ]
    }
}

#[async_trait]
impl RecordFetcher for SudocClient {
    async fn fetch_record(&self, ppn: &Ppn) -> FetchResult<String> {
        self.get_record(ppn).await
    }
}

/// Reads the holder directory from an `iln2rcr` answer
pub fn parse_directory(xml: &str) -> Result<HashMap<String, HolderInfo>> {
    let response: Iln2RcrResponse = quick_xml::de::from_str(xml)
        .map_err(|e| CaslError::Serialization(format!("Invalid iln2rcr response: {e}")))?;

    if response.queries.is_empty() {
        return Err(CaslError::Configuration(
            "iln2rcr returned no library for the configured ILNs".to_string(),
        ));
    }

    let mut holders = HashMap::new();
    for query in response.queries {
        for library in query.result.libraries {
            let rcr = library.rcr.trim().to_string();
            if rcr.is_empty() {
                continue;
            }
            holders.insert(
                rcr,
                HolderInfo {
                    region_code: query.iln.trim().to_string(),
                    display_name: library.shortname.trim().to_string(),
                },
            );
        }
    }
    Ok(holders)
}

/// Extracts the holdings (field 930) of a MARCXML record
///
/// `$5` holds `RCR:item` and must appear once; `$c` is the optional
/// sub-location and may appear at most once.
pub fn parse_locations(ppn: &Ppn, xml: &str) -> FetchResult<Vec<SourceLocation>> {
    let record = MarcRecord::from_xml(xml)?;
    let mut locations = Vec::new();

    for field in record.get_field(HOLDINGS_TAG) {
        let ids = field.values("5");
        if ids.len() != 1 {
            return Err(FetchError::Decode(format!(
                "PPN {ppn}: field {HOLDINGS_TAG} must carry exactly one $5, found {}",
                ids.len()
            )));
        }
        let rcr = ids[0].split(':').next().unwrap_or_default().trim();
        if rcr.is_empty() {
            return Err(FetchError::Decode(format!(
                "PPN {ppn}: field {HOLDINGS_TAG} has an empty $5"
            )));
        }

        let subs = field.values("c");
        if subs.len() > 1 {
            return Err(FetchError::Decode(format!(
                "PPN {ppn}: field {HOLDINGS_TAG} carries {} $c sub-locations",
                subs.len()
            )));
        }

        locations.push(
            SourceLocation::new(rcr).with_sub_location(subs.first().copied().unwrap_or_default()),
        );
    }

    Ok(locations)
}

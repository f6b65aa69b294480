//! Alma REST API client

use super::models::{Bibs, ItemEntry, Items, WebServiceResult};
use crate::adapters::fetcher::{RequestCounts, TargetFetcher};
use crate::adapters::http::{build_http_client, classify_status, transport_error, with_trailing_slash};
use crate::config::{AlmaConfig, SecretString};
use crate::domain::ids::Ppn;
use crate::domain::{
    CaslError, FetchError, FetchResult, Item, Result, TargetLocation, ValidityFilter,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Items per page of the holdings/items endpoint
const ITEMS_PAGE_SIZE: &str = "100";

/// Client for the Alma bibs and items endpoints
///
/// A lookup resolves the PPN to MMS ids through `other_system_id`, then reads
/// the items of every matching MMS and groups them per holding.
pub struct AlmaClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    ignored_collections: HashSet<String>,
    validity: ValidityFilter,
    bib_requests: AtomicU64,
    item_requests: AtomicU64,
}

impl AlmaClient {
    /// Create a new Alma client
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the base URL cannot be parsed.
    pub fn new(config: &AlmaConfig) -> Result<Self> {
        let client = build_http_client(config.timeout_seconds)?;
        let base_url = Url::parse(&with_trailing_slash(&config.base_url)).map_err(|e| {
            CaslError::Configuration(format!("Invalid alma.base_url '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            ignored_collections: config.ignored_collections.iter().cloned().collect(),
            validity: ValidityFilter::new(config.excluded_process_codes.iter().cloned()),
            bib_requests: AtomicU64::new(0),
            item_requests: AtomicU64::new(0),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> FetchResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Decode(format!("Invalid request URL for {path}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("apikey", self.api_key.expose_secret().as_ref());
        Ok(url)
    }

    async fn get_xml(&self, url: Url) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml")
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(decode_error(status.as_u16(), &body))
        }
    }

    /// MMS ids whose network numbers carry exactly this PPN
    async fn find_mms_ids(&self, ppn: &Ppn) -> FetchResult<Vec<String>> {
        let other_system_id = ppn.network_number();
        let url = self.endpoint(
            "bibs",
            &[
                ("view", "brief"),
                ("expand", "None"),
                ("other_system_id", other_system_id.as_str()),
            ],
        )?;

        self.bib_requests.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(ppn = %ppn, "Looking up Alma bibs");
        let body = self.get_xml(url).await?;
        let bibs: Bibs = quick_xml::de::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("Invalid bibs response: {e}")))?;

        if bibs.total_record_count.trim() == "0" {
            return Err(FetchError::NotFound(format!("No Alma bib for PPN {ppn}")));
        }

        let mms_ids: Vec<String> = bibs
            .bibs
            .into_iter()
            .filter(|bib| {
                bib.network_numbers
                    .values
                    .iter()
                    .any(|n| n.trim() == other_system_id)
            })
            .map(|bib| bib.mms_id)
            .collect();

        if mms_ids.is_empty() {
            return Err(FetchError::NotFound(format!(
                "No Alma bib carries network number {other_system_id}"
            )));
        }
        if mms_ids.len() > 1 {
            tracing::debug!(ppn = %ppn, mms_ids = ?mms_ids, "PPN matches several Alma bibs");
        }
        Ok(mms_ids)
    }

    async fn get_items(&self, mms_id: &str) -> FetchResult<Vec<ItemEntry>> {
        let url = self.endpoint(
            &format!("bibs/{mms_id}/holdings/ALL/items"),
            &[("limit", ITEMS_PAGE_SIZE)],
        )?;

        self.item_requests.fetch_add(1, Ordering::Relaxed);
        let body = self.get_xml(url).await?;
        let items: Items = quick_xml::de::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("Invalid items response: {e}")))?;
        Ok(items.items)
    }
}

#[async_trait]
impl TargetFetcher for AlmaClient {
    fn name(&self) -> &str {
        "alma"
    }

    async fn get_locations(&self, ppn: &Ppn) -> FetchResult<Vec<TargetLocation>> {
        let mut locations = Vec::new();
        for mms_id in self.find_mms_ids(ppn).await? {
            let items = self.get_items(&mms_id).await?;
            locations.extend(group_by_holding(items));
        }
        Ok(locations)
    }

    async fn get_filtered_locations(
        &self,
        ppn: &Ppn,
        holder_codes: &HashSet<String>,
    ) -> FetchResult<Vec<TargetLocation>> {
        let locations = self.get_locations(ppn).await?;
        Ok(locations
            .into_iter()
            .filter(|l| holder_codes.contains(&l.holder_code))
            .filter(|l| !self.ignored_collections.contains(&l.location_code))
            .filter(|l| self.validity.is_valid(l))
            .collect())
    }

    fn request_counts(&self) -> RequestCounts {
        let bibs = self.bib_requests.load(Ordering::Relaxed);
        let items = self.item_requests.load(Ordering::Relaxed);
        vec![("bibs", bibs), ("items", items), ("total", bibs + items)]
    }
}

/// Groups items into one location per holding, in order of first appearance
pub fn group_by_holding(entries: Vec<ItemEntry>) -> Vec<TargetLocation> {
    let mut holding_ids: Vec<String> = Vec::new();
    let mut locations: Vec<TargetLocation> = Vec::new();

    for entry in entries {
        let item = Item {
            process_code: entry.item_data.process_type.code.trim().to_string(),
            process_label: entry.item_data.process_type.desc.clone(),
            base_status: entry.item_data.base_status.code.trim().to_string(),
        };

        match holding_ids
            .iter()
            .position(|id| *id == entry.holding_data.holding_id)
        {
            Some(idx) => locations[idx].items.push(item),
            None => {
                holding_ids.push(entry.holding_data.holding_id.clone());
                locations.push(
                    TargetLocation::builder(entry.item_data.library.code.trim())
                        .holder_name(entry.item_data.library.desc)
                        .location(
                            entry.item_data.location.code.trim(),
                            entry.item_data.location.desc,
                        )
                        .call_number(entry.holding_data.call_number.trim())
                        .suppressed(entry.holding_data.is_suppressed())
                        .item(item)
                        .build(),
                );
            }
        }
    }

    locations
}

/// Maps an Alma error answer to the fetch error taxonomy
///
/// The body is `<web_service_result>` with an `errorList`; when it cannot be
/// read, the status alone decides.
pub fn decode_error(status: u16, body: &str) -> FetchError {
    let entry = quick_xml::de::from_str::<WebServiceResult>(body)
        .ok()
        .and_then(|result| result.error_list.errors.into_iter().next());

    let Some(entry) = entry else {
        return classify_status(status, body);
    };

    let message = format!("{}: {}", entry.code.trim(), entry.message.trim());
    match (status, entry.code.trim()) {
        (429, "DAILY_THRESHOLD") => FetchError::RemoteRejected { status, message },
        (429, _) => FetchError::RateLimited(message),
        (500..=599, _) => FetchError::RemoteServerError { status, message },
        _ => FetchError::RemoteRejected { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::alma::models::{CodeDesc, HoldingData, ItemData};
    use test_case::test_case;

    fn error_body(code: &str) -> String {
        format!(
            "<web_service_result><errorsExist>true</errorsExist><errorList><error>\
             <errorCode>{code}</errorCode><errorMessage>message</errorMessage>\
             </error></errorList></web_service_result>"
        )
    }

    #[test_case(429, "PER_SECOND_THRESHOLD", "rate_limited" ; "per second threshold")]
    #[test_case(429, "DAILY_THRESHOLD", "remote_rejected" ; "daily threshold")]
    #[test_case(400, "GENERAL_ERROR", "remote_rejected" ; "general error")]
    #[test_case(400, "402203", "remote_rejected" ; "unknown mms")]
    #[test_case(403, "UNAUTHORIZED", "remote_rejected" ; "unauthorized")]
    #[test_case(403, "REQUEST_TOO_LARGE", "remote_rejected" ; "too large")]
    #[test_case(500, "GENERAL_ERROR", "remote_server_error" ; "server general error")]
    #[test_case(503, "ROUTING_ERROR", "remote_server_error" ; "routing error")]
    fn test_decode_error(status: u16, code: &str, kind: &str) {
        let err = decode_error(status, &error_body(code));
        assert_eq!(err.kind(), kind);
        assert!(err.to_string().contains(code));
    }

    #[test]
    fn test_decode_error_without_body_uses_status() {
        assert_eq!(decode_error(429, "").kind(), "rate_limited");
        assert_eq!(decode_error(502, "<html>Bad gateway</html>").kind(), "remote_server_error");
        assert_eq!(decode_error(404, "").kind(), "not_found");
    }

    fn entry(holding: &str, library: &str, process: &str) -> ItemEntry {
        ItemEntry {
            holding_data: HoldingData {
                holding_id: holding.to_string(),
                holding_suppress_from_publishing: "false".to_string(),
                call_number: "840 HUG".to_string(),
            },
            item_data: ItemData {
                base_status: CodeDesc {
                    desc: "Item in place".to_string(),
                    code: "1".to_string(),
                },
                process_type: CodeDesc {
                    desc: String::new(),
                    code: process.to_string(),
                },
                library: CodeDesc {
                    desc: format!("Library {library}"),
                    code: library.to_string(),
                },
                location: CodeDesc {
                    desc: "Magasin".to_string(),
                    code: "MAG".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_group_by_holding() {
        let locations = group_by_holding(vec![
            entry("H1", "LETTRES", "ACQ"),
            entry("H2", "SCIENCES", ""),
            entry("H1", "LETTRES", ""),
        ]);

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].holder_code, "LETTRES");
        assert_eq!(locations[0].holder_name, "Library LETTRES");
        assert_eq!(locations[0].items.len(), 2);
        assert_eq!(locations[0].items[0].process_code, "ACQ");
        assert_eq!(locations[1].holder_code, "SCIENCES");
        assert_eq!(locations[1].location_code, "MAG");
        assert_eq!(locations[1].call_number, "840 HUG");
    }
}

use std::fmt;
use std::time::Duration;

use psync_dispatch::{BatchReceipt, BatchVerb, CatalogSink, OutboundProduct, SinkError};
use psync_reconcile::snapshot_adapter;
use psync_schemas::DestinationProduct;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::payload::{BatchItem, WooProduct};

const API_PREFIX: &str = "wp-json/wc/v3";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(500);

#[derive(Clone)]
pub struct WooConfig {
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl WooConfig {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for WooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WooConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub struct WooClient {
    http: reqwest::blocking::Client,
    config: WooConfig,
}

impl WooClient {
    pub fn new(config: WooConfig) -> Result<Self, SinkError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            API_PREFIX,
            path
        )
    }

    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<String, SinkError> {
        let resp = req
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .send()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(SinkError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl CatalogSink for WooClient {
    fn fetch_all(&self) -> Result<Vec<DestinationProduct>, SinkError> {
        let url = self.url("products");
        let per_page = self.config.page_size.to_string();
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_s = page.to_string();
            let body = self.send(
                self.http
                    .get(&url)
                    .query(&[("per_page", per_page.as_str()), ("page", page_s.as_str())]),
            )?;
            let products = snapshot_adapter::parse_page(&body)
                .map_err(|e| SinkError::Decode(e.to_string()))?;
            if products.is_empty() {
                break;
            }
            debug!(page, count = products.len(), "fetched destination page");
            all.extend(products);
            page += 1;
        }

        info!(products = all.len(), pages = page - 1, "destination snapshot fetched");
        Ok(all)
    }

    fn submit_batch(
        &mut self,
        verb: BatchVerb,
        records: &[OutboundProduct],
    ) -> Result<BatchReceipt, SinkError> {
        let items: Vec<WooProduct> = records.iter().map(WooProduct::from).collect();
        let items = serde_json::to_value(items).map_err(|e| SinkError::Decode(e.to_string()))?;
        let mut payload = Map::new();
        payload.insert(verb.as_str().to_string(), items);

        let body = self.send(self.http.post(self.url("products/batch")).json(&payload))?;

        let response: Value =
            serde_json::from_str(&body).map_err(|e| SinkError::Decode(e.to_string()))?;
        let list = response
            .get(verb.as_str())
            .cloned()
            .ok_or_else(|| SinkError::Decode(format!("batch response has no '{verb}' list")))?;
        let list: Vec<BatchItem> =
            serde_json::from_value(list).map_err(|e| SinkError::Decode(e.to_string()))?;

        let mut receipt = BatchReceipt::default();
        for item in list {
            match item.error {
                Some(err) => {
                    receipt.rejected += 1;
                    warn!(%verb, id = ?item.id, code = %err.code, message = %err.message, "item rejected");
                }
                None => receipt.accepted += 1,
            }
        }
        Ok(receipt)
    }
}

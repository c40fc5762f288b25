//! Rate-limited E-utilities client.
//!
//! Every request carries the `tool`/`email`/`db` identification parameters
//! and passes through the [`RequestGate`] before dispatch. Searches are
//! history-enabled so fetches can page through the server-side cursor
//! without re-sending the term.

pub mod rate_limit;
pub mod wire;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use rate_limit::RequestGate;
use wire::{RawRecord, SearchHandle};

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov";
const ESEARCH_PATH: &str = "/entrez/eutils/esearch.fcgi";
const EFETCH_PATH: &str = "/entrez/eutils/efetch.fcgi";

/// Pause after every efetch page; keeps back-to-back paging inside the
/// 3-requests-per-second ceiling independently of the gate
const BATCH_DELAY: Duration = Duration::from_millis(340);

/// Client for the NCBI E-utilities endpoints
#[derive(Debug, Clone)]
pub struct EutilsClient {
    http: reqwest::Client,
    gate: Arc<RequestGate>,
    base_url: String,
    tool: String,
    email: String,
}

impl EutilsClient {
    /// Create a client from the harvest configuration
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            gate: Arc::new(RequestGate::new(config.requests_per_second)),
            base_url: DEFAULT_BASE_URL.to_string(),
            tool: config.tool.clone(),
            email: config.email.clone(),
        })
    }

    /// Point the client at a different host (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tool", self.tool.clone()),
            ("email", self.email.clone()),
            ("db", "pubmed".to_string()),
        ]
    }

    async fn get(&self, path: &str, params: &[(&'static str, String)]) -> Result<String> {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}{}?{}", self.base_url, path, query);

        self.gate.acquire().await;
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HarvestError::Remote {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    /// Run a history-enabled search for `term`.
    ///
    /// Requests zero records; only the match count and the history cursor
    /// are needed.
    pub async fn search(&self, term: &str) -> Result<SearchHandle> {
        let mut params = self.base_params();
        params.push(("term", term.to_string()));
        params.push(("usehistory", "y".to_string()));
        params.push(("retmax", "0".to_string()));

        let xml = self.get(ESEARCH_PATH, &params).await?;
        let handle = wire::parse_search_response(&xml)?;
        debug!(term, count = handle.count, "esearch complete");
        Ok(handle)
    }

    /// Fetch up to `retmax` records starting at `retstart` through the
    /// handle's cursor. An empty vec means the cursor is exhausted.
    pub async fn fetch_batch(
        &self,
        handle: &SearchHandle,
        retstart: usize,
        retmax: usize,
    ) -> Result<Vec<RawRecord>> {
        let mut params = self.base_params();
        params.push(("WebEnv", handle.web_env.clone()));
        params.push(("query_key", handle.query_key.clone()));
        params.push(("retstart", retstart.to_string()));
        params.push(("retmax", retmax.to_string()));
        params.push(("rettype", "xml".to_string()));
        params.push(("retmode", "xml".to_string()));

        let xml = self.get(EFETCH_PATH, &params).await?;
        let records = wire::parse_fetch_response(&xml)?;
        debug!(retstart, retmax, decoded = records.len(), "efetch complete");

        if !records.is_empty() {
            tokio::time::sleep(BATCH_DELAY).await;
        }

        Ok(records)
    }
}

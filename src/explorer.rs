use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;

const SATS_PER_BTC: f64 = 100_000_000.0;

/// Minimal client for an Esplora-style block explorer (`GET {base}/tx/{txid}`).
pub struct ExplorerClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

/// The subset of the Esplora transaction document we merge into analyses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplorerTx {
    pub txid: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub weight: u64,
    /// Fee in satoshis.
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub vin: Vec<serde_json::Value>,
    #[serde(default)]
    pub vout: Vec<ExplorerOutput>,
    pub status: ExplorerStatus,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplorerOutput {
    /// Value in satoshis.
    pub value: u64,
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplorerStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u32>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl ExplorerTx {
    pub fn fee_btc(&self) -> f64 {
        self.fee as f64 / SATS_PER_BTC
    }

    pub fn output_value_btc(&self) -> f64 {
        self.vout.iter().map(|o| o.value).sum::<u64>() as f64 / SATS_PER_BTC
    }

    /// Virtual size, weight / 4 rounded up.
    pub fn vsize(&self) -> u64 {
        self.weight.div_ceil(4)
    }
}

impl ExplorerClient {
    pub fn new(config: &ExplorerConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build explorer HTTP client ({e}), using defaults");
            Client::new()
        });
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    pub fn tx_url(&self, txid: &str) -> String {
        format!("{}/tx/{}", self.base_url, txid)
    }

    /// Fetch a transaction, bounded by the configured timeout.
    pub async fn fetch_tx(&self, txid: &str) -> Result<ExplorerTx, ExplorerError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        match tokio::time::timeout(self.timeout, self.request(txid)).await {
            Ok(result) => result,
            Err(_) => Err(ExplorerError::Timeout(timeout_ms)),
        }
    }

    /// Current chain tip height (`GET {base}/blocks/tip/height`, plain text).
    pub async fn fetch_tip_height(&self) -> Result<u32, ExplorerError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let url = format!("{}/blocks/tip/height", self.base_url);
        let body = match tokio::time::timeout(self.timeout, async {
            let resp = self.get(&url).await?;
            Ok::<_, ExplorerError>(resp.text().await?)
        })
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(ExplorerError::Timeout(timeout_ms)),
        };
        body.trim()
            .parse()
            .map_err(|_| ExplorerError::Parse(body.trim().to_string()))
    }

    async fn request(&self, txid: &str) -> Result<ExplorerTx, ExplorerError> {
        let resp = self.get(&self.tx_url(txid)).await?;
        Ok(resp.json::<ExplorerTx>().await?)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ExplorerError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ExplorerError::Timeout(self.timeout.as_millis() as u64)
            } else {
                ExplorerError::Http(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExplorerError::Status(status.as_u16()));
        }
        Ok(resp)
    }
}

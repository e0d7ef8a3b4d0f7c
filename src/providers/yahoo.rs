use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::quote::{FxRateProvider, QuoteProvider};
use crate::providers::util::with_retry;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent("networth/0.1")
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

// Successful chart responses carry the price in result[0].meta; error
// responses replace "result" with null, which fails the parse below and is
// reported as a malformed body.
#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

async fn fetch_chart_price(base_url: &str, symbol: &str, desc: &str) -> Result<f64> {
    let url = format!(
        "{}/v8/finance/chart/{}?interval=1d&range=1d",
        base_url, symbol
    );
    debug!("Requesting quote from {}", url);

    let client = http_client()?;
    let response = with_retry(|| client.get(&url).send(), FETCH_RETRIES, RETRY_DELAY_MS)
        .await
        .map_err(|e| anyhow!("Request error: {} for {}: {}", e, desc, symbol))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "HTTP error: {} for {}: {}",
            response.status(),
            desc,
            symbol
        ));
    }

    let text = response.text().await?;
    let data: ChartResponse = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse quote response for {}: {}", symbol, e))?;

    let item = data
        .chart
        .result
        .first()
        .ok_or_else(|| anyhow!("No quote data found for {}: {}", desc, symbol))?;

    Ok(item.meta.regular_market_price)
}

/// Stock quotes from a Yahoo-Finance-shaped chart endpoint.
pub struct YahooQuoteProvider {
    base_url: String,
}

impl YahooQuoteProvider {
    pub fn new(base_url: &str) -> Self {
        YahooQuoteProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    #[instrument(name = "YahooQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        let price = fetch_chart_price(&self.base_url, symbol, "symbol").await?;
        debug!(price, "Received quote for {}", symbol);
        Ok(price)
    }
}

/// FX rates from the same chart endpoint, via the `{from}{to}=X` pair symbol.
pub struct YahooFxProvider {
    base_url: String,
}

impl YahooFxProvider {
    pub fn new(base_url: &str) -> Self {
        YahooFxProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl FxRateProvider for YahooFxProvider {
    #[instrument(name = "YahooFxFetch", skip(self))]
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64> {
        let pair = format!("{from}{to}=X");
        let rate = fetch_chart_price(&self.base_url, &pair, "currency pair").await?;
        debug!(rate, "Received rate for {}", pair);
        Ok(rate)
    }
}

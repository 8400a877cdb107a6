use crate::api::PriceSource;
use crate::models::Candle;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;

const COINBASE_API_BASE: &str = "https://api.exchange.coinbase.com";
const USER_AGENT: &str = concat!("trendbot/", env!("CARGO_PKG_VERSION"));

/// Coinbase Exchange market-data client
///
/// Uses the public candles endpoint; no API key required. Product ids look
/// like "BTC-USD". The endpoint serves at most 300 candles per request.
#[derive(Clone)]
pub struct CoinbaseClient {
    client: Client,
    base_url: String,
}

impl CoinbaseClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINBASE_API_BASE.to_string())
    }

    fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }
}

/// Map a timeframe string onto the candle granularities Coinbase serves
fn granularity_secs(timeframe: &str) -> Result<u64> {
    let secs = match timeframe {
        "1m" => 60,
        "5m" => 300,
        "15m" => 900,
        "1h" => 3600,
        "6h" => 21600,
        "1d" => 86400,
        other => bail!("unsupported timeframe '{}'", other),
    };
    Ok(secs)
}

#[async_trait]
impl PriceSource for CoinbaseClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let granularity = granularity_secs(timeframe)?;
        let url = format!(
            "{}/products/{}/candles?granularity={}",
            self.base_url, symbol, granularity
        );

        tracing::debug!("Fetching {} candles for {} ({})", limit, symbol, timeframe);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Candle request for {} failed", symbol))?
            .error_for_status()
            .with_context(|| format!("Candle request for {} rejected", symbol))?;

        // Rows are [time, low, high, open, close, volume], newest first
        let rows: Vec<[f64; 6]> = response
            .json()
            .await
            .with_context(|| format!("Malformed candle response for {}", symbol))?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let timestamp = DateTime::from_timestamp(row[0] as i64, 0)
                .with_context(|| format!("Invalid candle timestamp {}", row[0]))?;
            candles.push(Candle {
                timestamp,
                low: row[1],
                high: row[2],
                open: row[3],
                close: row[4],
                volume: row[5],
            });
        }

        // Oldest to newest, keeping only the `limit` most recent bars
        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }

        Ok(candles)
    }
}

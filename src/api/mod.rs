pub mod coinbase;

pub use coinbase::CoinbaseClient;

use crate::models::Candle;
use async_trait::async_trait;

/// Boundary to an external market-data provider.
///
/// Implementations return OHLCV bars ordered oldest to newest; the engines
/// consume only the close of each bar. Failures (network errors, rate
/// limits, unsupported symbols) stay opaque and propagate unchanged — the
/// engines never retry.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Candle>>;
}

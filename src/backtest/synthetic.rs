use crate::api::PriceSource;
use crate::models::Candle;
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with noise (-2% daily average)
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// Constant close price, no drift or noise
    Flat,
}

/// Generates synthetic price data for backtesting
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    /// Generate candles for a specific market scenario
    ///
    /// # Arguments
    /// * `scenario` - The market scenario to simulate
    /// * `num_candles` - Number of candles to generate
    /// * `interval_minutes` - Minutes between candles
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let start_time = Utc::now() - Duration::minutes(num_candles as i64 * interval_minutes);

        match scenario {
            MarketScenario::Uptrend => {
                self.generate_trend(start_time, num_candles, interval_minutes, 0.02)
            }
            MarketScenario::Downtrend => {
                self.generate_trend(start_time, num_candles, interval_minutes, -0.02)
            }
            MarketScenario::Sideways => {
                self.generate_sideways(start_time, num_candles, interval_minutes)
            }
            MarketScenario::Flat => self.generate_flat(start_time, num_candles, interval_minutes),
        }
    }

    /// Drift toward `daily_drift` with reduced noise so the trend dominates
    fn generate_trend(
        &mut self,
        start_time: DateTime<Utc>,
        num_candles: usize,
        interval_minutes: i64,
        daily_drift: f64,
    ) -> Vec<Candle> {
        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;

        let drift_per_interval = daily_drift / (24.0 * 60.0 / interval_minutes as f64);

        for i in 0..num_candles {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let drift = current_price * drift_per_interval;
            let noise = current_price * self.rng.gen_range(-0.001..0.001); // ±0.1% noise
            current_price += drift + noise;

            candles.push(self.create_candle(current_price, timestamp));
        }

        candles
    }

    /// Mean-reverting random walk around the base price
    fn generate_sideways(
        &mut self,
        start_time: DateTime<Utc>,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;
        let mean_price = self.base_price;

        for i in 0..num_candles {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let reversion = (mean_price - current_price) * 0.1; // 10% pull to mean
            let noise = current_price * self.rng.gen_range(-0.01..0.01); // ±1% noise
            current_price += reversion + noise;

            candles.push(self.create_candle(current_price, timestamp));
        }

        candles
    }

    /// Every close exactly at the base price
    fn generate_flat(
        &mut self,
        start_time: DateTime<Utc>,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        (0..num_candles)
            .map(|i| {
                let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);
                Candle {
                    timestamp,
                    open: self.base_price,
                    high: self.base_price,
                    low: self.base_price,
                    close: self.base_price,
                    volume: self.base_volume,
                }
            })
            .collect()
    }

    /// Build realistic OHLC around an exact close price
    fn create_candle(&mut self, price: f64, timestamp: DateTime<Utc>) -> Candle {
        let noise_pct = 0.002; // ±0.2% intrabar movement

        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));
        let open_raw = price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct));
        let open = open_raw.clamp(low, high);

        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            timestamp,
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}

/// Price source serving deterministic synthetic bars, for offline runs and
/// tests. The same scenario and seed always produce the same history.
pub struct SyntheticSource {
    scenario: MarketScenario,
    seed: u64,
}

impl SyntheticSource {
    pub fn new(scenario: MarketScenario, seed: u64) -> Self {
        Self { scenario, seed }
    }
}

fn interval_minutes(timeframe: &str) -> anyhow::Result<i64> {
    let minutes = match timeframe {
        "1m" => 1,
        "5m" => 5,
        "15m" => 15,
        "1h" => 60,
        "6h" => 360,
        "1d" => 1440,
        other => bail!("unsupported timeframe '{}'", other),
    };
    Ok(minutes)
}

#[async_trait]
impl PriceSource for SyntheticSource {
    async fn fetch_bars(
        &self,
        _symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Candle>> {
        let interval = interval_minutes(timeframe)?;
        let mut generator = SyntheticDataGenerator::new(self.seed);
        Ok(generator.generate(self.scenario, limit, interval))
    }
}

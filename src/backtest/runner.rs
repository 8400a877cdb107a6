use crate::api::PriceSource;
use crate::error::Error;
use crate::indicators;
use crate::models::{Candle, Position, TradeEvent, TradeSide};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Flat transaction fee applied on every entry and exit (0.1%)
const FEE_RATE: f64 = 0.001;

/// Parameters for one backtest run
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Asset to replay, e.g. "BTC-USD"
    pub symbol: String,
    /// Bar duration, e.g. "1d"
    pub timeframe: String,
    /// Number of historical bars to replay. Some exchanges cap this (300, 1000)
    pub limit: usize,
    /// Capital the simulation starts with
    pub investment: f64,
}

/// Outcome of one backtest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Investment value after the simulation
    pub final_value: f64,
    /// Every simulated entry and exit, in chronological order
    pub trades: Vec<TradeEvent>,
}

impl BacktestResult {
    /// Buy markers as (index, price) pairs, for the presentation layer
    pub fn buys(&self) -> Vec<(usize, f64)> {
        self.markers(TradeSide::Buy)
    }

    /// Sell markers as (index, price) pairs
    pub fn sells(&self) -> Vec<(usize, f64)> {
        self.markers(TradeSide::Sell)
    }

    fn markers(&self, side: TradeSide) -> Vec<(usize, f64)> {
        self.trades
            .iter()
            .filter(|t| t.side == side)
            .map(|t| (t.index, t.price))
            .collect()
    }

    /// Print a formatted report to stdout
    pub fn print_report(&self, initial_investment: f64) {
        let return_pct =
            (self.final_value - initial_investment) / initial_investment * 100.0;

        println!("\n══════════ BACKTEST REPORT ══════════");
        println!("  Initial:   ${:.2}", initial_investment);
        println!("  Final:     ${:.2}", self.final_value);
        println!("  Return:    {:+.2}%", return_pct);
        println!("  Buys:      {}", self.buys().len());
        println!("  Sells:     {}", self.sells().len());
        println!("═════════════════════════════════════\n");
    }
}

/// Replays a signal strategy chronologically over historical bars.
///
/// All four strategy variants share one simulation loop; they differ only
/// in the closure that derives the recommended holding state at each step.
pub struct BacktestRunner {
    config: BacktestConfig,
}

impl BacktestRunner {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Backtest the single simple moving average strategy: hold while the
    /// approximated SMA rises step over step.
    pub async fn simple_moving_average<S>(&self, source: &S, window: usize) -> Result<BacktestResult>
    where
        S: PriceSource + ?Sized,
    {
        let closes = self.fetch_closes(source, window).await?;
        let smoothed = indicators::simple_moving_average(&closes, window, true)?;

        let result = self.simulate(&closes, |i, held| {
            slope_position(smoothed[i - 1], smoothed[i], held)
        });
        self.log_outcome("SMA", &result);
        Ok(result)
    }

    /// Backtest the single exponential moving average strategy: hold while
    /// the smoothed estimate rises step over step.
    pub async fn exponential_moving_average<S>(
        &self,
        source: &S,
        alpha: f64,
    ) -> Result<BacktestResult>
    where
        S: PriceSource + ?Sized,
    {
        let closes = self.fetch_closes(source, 1).await?;
        let smoothed = indicators::exponential_moving_average(&closes, alpha)?;

        let result = self.simulate(&closes, |i, held| {
            slope_position(smoothed[i - 1], smoothed[i], held)
        });
        self.log_outcome("EMA", &result);
        Ok(result)
    }

    /// Backtest the SMA crossover strategy: hold while the short-window
    /// average sits above the long-window average. Both averages use the
    /// approximated start so they index 1:1 against the raw prices.
    pub async fn moving_average_crossover<S>(
        &self,
        source: &S,
        short_window: usize,
        long_window: usize,
    ) -> Result<BacktestResult>
    where
        S: PriceSource + ?Sized,
    {
        let closes = self.fetch_closes(source, long_window).await?;
        let short = indicators::simple_moving_average(&closes, short_window, true)?;
        let long = indicators::simple_moving_average(&closes, long_window, true)?;

        let result = self.simulate(&closes, |i, _| {
            if long[i] < short[i] {
                Position::In
            } else {
                Position::Out
            }
        });
        self.log_outcome("SMA crossover", &result);
        Ok(result)
    }

    /// Backtest the EMA crossover strategy: hold while the more reactive
    /// (big alpha) average sits above the less reactive one.
    pub async fn exponential_moving_average_crossover<S>(
        &self,
        source: &S,
        small_alpha: f64,
        big_alpha: f64,
    ) -> Result<BacktestResult>
    where
        S: PriceSource + ?Sized,
    {
        let closes = self.fetch_closes(source, 1).await?;
        let less_reactive = indicators::exponential_moving_average(&closes, small_alpha)?;
        let more_reactive = indicators::exponential_moving_average(&closes, big_alpha)?;

        let result = self.simulate(&closes, |i, _| {
            if less_reactive[i] < more_reactive[i] {
                Position::In
            } else {
                Position::Out
            }
        });
        self.log_outcome("EMA crossover", &result);
        Ok(result)
    }

    /// One fetch per run; fewer bars than `needed` is a data error, kept
    /// distinct from parameter validation inside the smoothing engine.
    async fn fetch_closes<S>(&self, source: &S, needed: usize) -> Result<Vec<f64>>
    where
        S: PriceSource + ?Sized,
    {
        let bars = source
            .fetch_bars(&self.config.symbol, &self.config.timeframe, self.config.limit)
            .await?;
        let closes = Candle::closes(&bars);
        if closes.len() < needed {
            return Err(Error::InsufficientData {
                needed,
                got: closes.len(),
            });
        }

        tracing::info!(
            "Starting backtest: {} bars of {} ({})",
            closes.len(),
            self.config.symbol,
            self.config.timeframe
        );
        Ok(closes)
    }

    /// Walk the price history chronologically, moving all capital in and
    /// out on each position transition and charging the flat fee both ways.
    fn simulate<F>(&self, prices: &[f64], recommend: F) -> BacktestResult
    where
        F: Fn(usize, Position) -> Position,
    {
        let mut investment = self.config.investment;
        let mut position = Position::Out;
        let mut buy_price = 0.0;
        let mut trades = Vec::new();

        for i in 1..prices.len() {
            let recommended = recommend(i, position);
            match (position, recommended) {
                (Position::Out, Position::In) => {
                    buy_price = prices[i];
                    position = Position::In;
                    investment *= 1.0 - FEE_RATE;
                    trades.push(TradeEvent {
                        index: i,
                        price: buy_price,
                        side: TradeSide::Buy,
                    });
                    tracing::debug!("BUY  @ {:.4} (index {})", buy_price, i);
                }
                (Position::In, Position::Out) => {
                    let sell_price = prices[i];
                    position = Position::Out;
                    // Ratio multiply first, then the exit fee
                    investment *= sell_price / buy_price;
                    investment *= 1.0 - FEE_RATE;
                    trades.push(TradeEvent {
                        index: i,
                        price: sell_price,
                        side: TradeSide::Sell,
                    });
                    tracing::debug!("SELL @ {:.4} (index {})", sell_price, i);
                }
                _ => {}
            }
        }

        // A position never closed is marked to market at the final price
        if position == Position::In {
            investment = investment * (prices[prices.len() - 1] / buy_price) * (1.0 - FEE_RATE);
        }

        BacktestResult {
            final_value: investment,
            trades,
        }
    }

    fn log_outcome(&self, strategy: &str, result: &BacktestResult) {
        tracing::info!(
            "Backtest complete ({}): {} trades, {:.2} -> {:.2}",
            strategy,
            result.trades.len(),
            self.config.investment,
            result.final_value
        );
    }
}

/// Recommended state from two consecutive smoothed values. A strictly
/// rising average recommends being in, a strictly falling one out; a flat
/// step keeps whatever the caller currently holds.
fn slope_position(prev: f64, cur: f64, held: Position) -> Position {
    if prev < cur {
        Position::In
    } else if prev > cur {
        Position::Out
    } else {
        held
    }
}

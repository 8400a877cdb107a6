use anyhow::Context;
use clap::Parser;
use trendbot::api::{CoinbaseClient, PriceSource};
use trendbot::backtest::{BacktestConfig, BacktestRunner, MarketScenario, SyntheticSource};
use trendbot::models::{Action, Position};
use trendbot::strategy::moving_average as strategies;
use trendbot::Result;

/// Evaluate moving-average trading strategies against historical prices
/// and recommend an action for the current position.
#[derive(Debug, Parser)]
#[command(name = "trendbot", version)]
struct Cli {
    /// Asset to analyze, e.g. BTC-USD
    #[arg(long, default_value = "BTC-USD")]
    symbol: String,

    /// Bar duration: 1m, 5m, 15m, 1h, 6h or 1d
    #[arg(long, default_value = "1d")]
    timeframe: String,

    /// Number of historical bars to backtest over
    #[arg(long, default_value_t = 90)]
    limit: usize,

    /// Starting capital; falls back to TRENDBOT_INVESTMENT, then 100000
    #[arg(long)]
    investment: Option<f64>,

    /// Window of the faster simple moving average
    #[arg(long, default_value_t = 3)]
    short_window: usize,

    /// Window of the slower simple moving average
    #[arg(long, default_value_t = 21)]
    long_window: usize,

    /// Bars smoothed by the single-EMA recommendation
    #[arg(long, default_value_t = 10)]
    ema_window: usize,

    /// Smoothing parameter of the single-EMA recommendation
    #[arg(long, default_value_t = 0.6)]
    alpha: f64,

    /// Less reactive alpha of the EMA crossover
    #[arg(long, default_value_t = 0.2)]
    small_alpha: f64,

    /// More reactive alpha of the EMA crossover
    #[arg(long, default_value_t = 0.8)]
    big_alpha: f64,

    /// Set when the asset is currently held
    #[arg(long)]
    holding: bool,

    /// Replay a deterministic synthetic market instead of the live API
    #[arg(long)]
    offline: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let investment = cli.investment.unwrap_or_else(investment_from_env);
    let position = if cli.holding {
        Position::In
    } else {
        Position::Out
    };

    let source: Box<dyn PriceSource> = if cli.offline {
        tracing::info!("Using synthetic offline price feed");
        Box::new(SyntheticSource::new(MarketScenario::Uptrend, 42))
    } else {
        Box::new(CoinbaseClient::new()?)
    };

    // Backtest the crossover strategy over the requested history
    let runner = BacktestRunner::new(BacktestConfig {
        symbol: cli.symbol.clone(),
        timeframe: cli.timeframe.clone(),
        limit: cli.limit,
        investment,
    });
    let result = runner
        .moving_average_crossover(&*source, cli.short_window, cli.long_window)
        .await?;

    // Live recommendation from every strategy variant
    let recommendations: Vec<(&str, Action)> = vec![
        (
            "SMA",
            strategies::simple_moving_average(
                &*source,
                &cli.symbol,
                &cli.timeframe,
                cli.short_window,
                position,
            )
            .await?,
        ),
        (
            "EMA",
            strategies::exponential_moving_average(
                &*source,
                &cli.symbol,
                &cli.timeframe,
                cli.ema_window,
                cli.alpha,
                position,
            )
            .await?,
        ),
        (
            "SMA crossover",
            strategies::moving_average_crossover(
                &*source,
                &cli.symbol,
                &cli.timeframe,
                cli.short_window,
                cli.long_window,
                position,
            )
            .await?,
        ),
        (
            "EMA crossover",
            strategies::exponential_moving_average_crossover(
                &*source,
                &cli.symbol,
                &cli.timeframe,
                cli.small_alpha,
                cli.big_alpha,
                position,
            )
            .await?,
        ),
    ];

    if cli.json {
        let actions: std::collections::BTreeMap<&str, String> = recommendations
            .iter()
            .map(|(name, action)| (*name, action.to_string()))
            .collect();
        let payload = serde_json::json!({
            "symbol": cli.symbol,
            "backtest": result,
            "recommendations": actions,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to serialize results")?
        );
    } else {
        println!(
            "Results: {} -> {:.2}",
            investment,
            result.final_value
        );
        result.print_report(investment);

        println!("Recommendations for {}:", cli.symbol);
        for (name, action) in &recommendations {
            println!("  {:<14} {}", name, action);
        }
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendbot=info")),
        )
        .init();
}

fn investment_from_env() -> f64 {
    std::env::var("TRENDBOT_INVESTMENT")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(100_000.0)
}

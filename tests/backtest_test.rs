use trendbot::backtest::{BacktestConfig, BacktestRunner, MarketScenario, SyntheticSource};
use trendbot::models::{Action, Position, TradeSide};
use trendbot::strategy::moving_average as strategies;

fn runner(symbol: &str, investment: f64) -> BacktestRunner {
    BacktestRunner::new(BacktestConfig {
        symbol: symbol.to_string(),
        timeframe: "1d".to_string(),
        limit: 300,
        investment,
    })
}

#[tokio::test]
async fn test_offline_workflow() {
    let _ = tracing_subscriber::fmt::try_init();

    let source = SyntheticSource::new(MarketScenario::Uptrend, 42);
    let runner = runner("SYNTH-USD", 10_000.0);

    let result = runner
        .moving_average_crossover(&source, 3, 21)
        .await
        .expect("crossover backtest failed");

    assert!(result.final_value > 0.0);
    assert_eq!(
        result.buys().len() + result.sells().len(),
        result.trades.len()
    );

    // The simulation moves all capital in and out, so trades alternate
    // starting with a buy, and events stay in chronological order
    for (i, trade) in result.trades.iter().enumerate() {
        let expected_side = if i % 2 == 0 {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        assert_eq!(trade.side, expected_side);
    }
    for pair in result.trades.windows(2) {
        assert!(pair[0].index < pair[1].index);
    }

    // A clean uptrend never recommends selling out of a flat position
    let action =
        strategies::exponential_moving_average(&source, "SYNTH-USD", "1d", 10, 0.6, Position::Out)
            .await
            .expect("EMA recommendation failed");
    assert!(matches!(action, Action::Buy | Action::Wait));
}

#[tokio::test]
async fn test_all_variants_sit_out_flat_markets() {
    let source = SyntheticSource::new(MarketScenario::Flat, 7);
    let runner = runner("SYNTH-USD", 100_000.0);

    let results = [
        runner.simple_moving_average(&source, 5).await.unwrap(),
        runner.exponential_moving_average(&source, 0.6).await.unwrap(),
        runner.moving_average_crossover(&source, 3, 21).await.unwrap(),
        runner
            .exponential_moving_average_crossover(&source, 0.2, 0.8)
            .await
            .unwrap(),
    ];

    for result in results {
        assert!(result.trades.is_empty());
        assert_eq!(result.final_value, 100_000.0);
    }
}

#[tokio::test]
async fn test_downtrend_keeps_capital_out() {
    let source = SyntheticSource::new(MarketScenario::Downtrend, 42);
    let runner = runner("SYNTH-USD", 10_000.0);

    let result = runner
        .moving_average_crossover(&source, 3, 21)
        .await
        .unwrap();

    assert!(result.final_value > 0.0);
    if let Some(first) = result.trades.first() {
        assert_eq!(first.side, TradeSide::Buy);
    }
}

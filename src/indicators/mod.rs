// Smoothing engine
// Implements the SMA and EMA series used by the strategy and backtest engines

pub mod moving_average;

pub use moving_average::{exponential_moving_average, simple_moving_average};

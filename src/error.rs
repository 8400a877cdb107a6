use thiserror::Error;

/// Errors surfaced by the strategy and backtest engines.
///
/// Parameter problems and short price histories are reported as distinct
/// kinds so callers can tell a misconfigured window apart from an exchange
/// that simply returned fewer bars than requested. Failures from the price
/// source itself pass through unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// A window or smoothing parameter fails validation. Raised before any
    /// computation or I/O takes place.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The price source returned fewer bars than the invocation requires.
    #[error("insufficient data: need {needed} bars, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Opaque failure from the price source (network, rate limit,
    /// unsupported symbol). Never retried or transformed here.
    #[error(transparent)]
    PriceSource(#[from] anyhow::Error),
}

use crate::error::Error;
use crate::Result;

/// Calculate a Simple Moving Average (SMA) series
///
/// A simple moving average is the unweighted mean of `window` consecutive
/// data points. The series uses the same indexing as `data`.
///
/// # Arguments
/// * `data` - Numerical data points, oldest to newest
/// * `window` - Number of consecutive data points to average over
/// * `approximate_start` - If true, the first `window` output elements are
///   approximated with growing partial means so the output has the same
///   length as the input. If false, output starts at the first index with a
///   full window of history and has `data.len() - window + 1` elements.
///
/// Fails with `Error::InvalidParameter` if `window` is zero or larger than
/// the dataset.
pub fn simple_moving_average(
    data: &[f64],
    window: usize,
    approximate_start: bool,
) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(Error::InvalidParameter(
            "window must be a positive integer".to_string(),
        ));
    }
    if window > data.len() {
        return Err(Error::InvalidParameter(format!(
            "window ({}) cannot be larger than the dataset ({})",
            window,
            data.len()
        )));
    }

    let mut sma = Vec::with_capacity(data.len());

    if approximate_start {
        // Approximate the first `window` values with growing partial means,
        // then advance with the O(1) sliding update from the last partial.
        sma.push(data[0]);
        let mut average = 0.0;
        for i in 1..window {
            average = data[..i].iter().sum::<f64>() / i as f64;
            sma.push(average);
        }
        for i in window..data.len() {
            average += (data[i] - data[i - window]) / window as f64;
            sma.push(average);
        }
    } else {
        // First output is the exact mean of the first full window; every
        // subsequent element slides by one step, so sma[k] is the exact mean
        // of data[k..k + window].
        let mut average = data[..window].iter().sum::<f64>() / window as f64;
        sma.push(average);
        for i in window..data.len() {
            average += (data[i] - data[i - window]) / window as f64;
            sma.push(average);
        }
    }

    Ok(sma)
}

/// Calculate an Exponential Moving Average (EMA) series
///
/// The EMA weights recent observations more heavily. The first element
/// seeds the estimate with `data[0]`; afterwards
/// `est[i] = alpha * data[i] + (1 - alpha) * est[i - 1]`.
///
/// `alpha` must lie in `[0, 1]`; values outside that range make the
/// recurrence diverge. The bound is a precondition, not checked here.
///
/// Fails with `Error::InvalidParameter` on empty input.
pub fn exponential_moving_average(data: &[f64], alpha: f64) -> Result<Vec<f64>> {
    if data.is_empty() {
        return Err(Error::InvalidParameter(
            "data must not be empty".to_string(),
        ));
    }

    let mut smoothed = Vec::with_capacity(data.len());
    let mut estimate = data[0];
    smoothed.push(estimate);

    for &value in &data[1..] {
        estimate = alpha * value + (1.0 - alpha) * estimate;
        smoothed.push(estimate);
    }

    Ok(smoothed)
}

// src/helpers/indicators.rs
//! Technical indicators over daily closes, oldest first. Every function returns
//! `None` when the series is too short for its window.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Simple moving average of the last `window` values.
pub fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    Some(mean(&closes[closes.len() - window..]))
}

/// Rolling SMA series aligned to `closes`; positions before the first full window are `None`.
pub fn sma_series(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                None
            } else {
                Some(mean(&closes[i + 1 - window..=i]))
            }
        })
        .collect()
}

/// RSI with simple rolling means of gains and losses over `period` changes.
/// A window without losses reads 100 when it has gains, and is undefined when flat.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes[closes.len() - period - 1..]
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect();

    let gain = deltas.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
    let loss = deltas.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;

    if loss == 0.0 {
        return (gain > 0.0).then_some(100.0);
    }
    let rs = gain / loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Annualised volatility in percent: sample std of the last `window` daily
/// returns times sqrt(252), times 100.
pub fn annualized_volatility(closes: &[f64], window: usize) -> Option<f64> {
    if window < 2 || closes.len() < window + 1 {
        return None;
    }
    let returns: Vec<f64> = closes[closes.len() - window - 1..]
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let avg = mean(&returns);
    let variance =
        returns.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

/// Max and min of the last `window` values, provided at least `min_periods` exist.
pub fn rolling_extremes(closes: &[f64], window: usize, min_periods: usize) -> Option<(f64, f64)> {
    if closes.is_empty() || closes.len() < min_periods {
        return None;
    }
    let tail = &closes[closes.len().saturating_sub(window)..];
    let high = tail.iter().copied().fold(f64::MIN, f64::max);
    let low = tail.iter().copied().fold(f64::MAX, f64::min);
    Some((high, low))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Golden,
    Death,
}

/// Fresh SMA crossover between the previous and the latest bar.
pub fn recent_crossover(closes: &[f64], fast: usize, slow: usize) -> Option<Crossover> {
    let fast_series = sma_series(closes, fast);
    let slow_series = sma_series(closes, slow);
    let spread: Vec<f64> = fast_series
        .iter()
        .zip(slow_series.iter())
        .filter_map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    if spread.len() < 3 {
        return None;
    }
    let prev = spread[spread.len() - 2];
    let last = spread[spread.len() - 1];
    if prev < 0.0 && last > 0.0 {
        Some(Crossover::Golden)
    } else if prev > 0.0 && last < 0.0 {
        Some(Crossover::Death)
    } else {
        None
    }
}

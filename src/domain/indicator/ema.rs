//! Exponential Moving Average indicator.
//!
//! alpha = 2/(span+1), seeded with the first value, then
//! EMA[i] = x[i]*alpha + EMA[i-1]*(1-alpha). No warmup: every bar is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{closes, Bar};

/// Smoothing factor for a span-parameterised EMA.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Recursive exponentially weighted mean of `values`, seeded by `values[0]`.
pub fn ema_values(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => x * alpha + p * (1.0 - alpha),
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

pub fn calculate_ema(bars: &[Bar], span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries::empty(IndicatorType::Ema(span));
    }

    let closes = closes(bars);
    let values = ema_values(&closes, span_alpha(span))
        .into_iter()
        .zip(bars)
        .map(|(ema, bar)| IndicatorPoint::simple(bar.date, ema))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

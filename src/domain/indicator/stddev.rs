//! Rolling sample standard deviation over closing prices.
//!
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Warmup: first (n-1) bars are invalid. Periods below 2 produce no values.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_stddev(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period < 2 {
        return IndicatorSeries::empty(IndicatorType::Stddev(period));
    }

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date, IndicatorValue::Simple(0.0)));
            continue;
        }
        let window = &bars[i + 1 - period..=i];
        let (_, stddev) = window_mean_stddev(window);
        values.push(IndicatorPoint::simple(bar.date, stddev));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

/// Mean and sample standard deviation of the closes in `window`.
///
/// `window` must hold at least two bars.
pub(crate) fn window_mean_stddev(window: &[Bar]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().map(|b| b.close).sum::<f64>() / n;
    let sum_sq: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum();
    (mean, (sum_sq / (n - 1.0)).sqrt())
}

//! RSI (Relative Strength Index) indicator implementation.
//!
//! Close-to-close changes are split into up-moves and down-moves, each
//! smoothed with an exponentially weighted mean of centre of mass `com`
//! (alpha = 1 / (1 + com)) seeded by the first change:
//!
//! RSI = 100 - (100 / (1 + avg_up / avg_down))
//!
//! Zero average down-move resolves to a sentinel instead of a division:
//! - avg_down == 0, avg_up > 0: [`RSI_ALL_GAINS`]
//! - avg_down == 0, avg_up == 0: [`RSI_FLAT`]
//!
//! Warmup: bar 0 is invalid (no prior close).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_COM: usize = 13;

/// RSI when every smoothed move so far is upward.
pub const RSI_ALL_GAINS: f64 = 100.0;
/// RSI when price has not moved at all.
pub const RSI_FLAT: f64 = 50.0;

pub fn rsi_from_averages(avg_up: f64, avg_down: f64) -> f64 {
    if avg_down == 0.0 {
        if avg_up == 0.0 { RSI_FLAT } else { RSI_ALL_GAINS }
    } else {
        100.0 - (100.0 / (1.0 + avg_up / avg_down))
    }
}

pub fn calculate_rsi(bars: &[Bar], com: usize) -> IndicatorSeries {
    let alpha = 1.0 / (1.0 + com as f64);
    let mut values = Vec::with_capacity(bars.len());
    let mut averages: Option<(f64, f64)> = None;

    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            values.push(IndicatorPoint::invalid(bar.date, IndicatorValue::Simple(0.0)));
            continue;
        }

        let change = bar.close - bars[i - 1].close;
        let up = change.max(0.0);
        let down = (-change).max(0.0);

        let (avg_up, avg_down) = match averages {
            None => (up, down),
            Some((prev_up, prev_down)) => (
                up * alpha + prev_up * (1.0 - alpha),
                down * alpha + prev_down * (1.0 - alpha),
            ),
        };
        averages = Some((avg_up, avg_down));

        values.push(IndicatorPoint::simple(
            bar.date,
            rsi_from_averages(avg_up, avg_down),
        ));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi { com },
        values,
    }
}

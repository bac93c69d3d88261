//! Daily OHLCV bar representation.

use chrono::NaiveDate;

use crate::domain::error::BandtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Bar with all four prices set to `close`.
    pub fn flat(date: NaiveDate, close: f64, volume: i64) -> Self {
        Bar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn prices_positive(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Checks a fetched series before it reaches the indicator engine.
///
/// Dates must be strictly increasing (which also rules out duplicates) and
/// every price must be finite and positive.
pub fn validate_series(bars: &[Bar]) -> Result<(), BandtraderError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.prices_positive() {
            return Err(BandtraderError::invalid_input(format!(
                "bar {} has a non-positive price",
                bar.date
            )));
        }
        if i > 0 {
            let prev = bars[i - 1].date;
            if bar.date == prev {
                return Err(BandtraderError::invalid_input(format!(
                    "duplicate bar date {}",
                    bar.date
                )));
            }
            if bar.date < prev {
                return Err(BandtraderError::invalid_input(format!(
                    "bar dates out of order: {} after {}",
                    bar.date, prev
                )));
            }
        }
    }
    Ok(())
}

/// Closing prices in series order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

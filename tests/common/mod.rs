#![allow(dead_code)]

use bandtrader::domain::error::BandtraderError;
pub use bandtrader::domain::ohlcv::Bar;
use bandtrader::domain::pipeline::RunConfig;
use bandtrader::ports::data_port::PriceSource;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceSource for MockPriceSource {
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BandtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BandtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date < end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn start() -> NaiveDate {
    date(2024, 1, 1)
}

/// One bar per calendar day from 2024-01-01 with open = high = low = close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::flat(start() + Duration::days(i as i64), c, 1_000))
        .collect()
}

/// Bars with a spread around the close, for CSV round trips.
pub fn make_bar(day: i64, close: f64) -> Bar {
    Bar {
        date: start() + Duration::days(day),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000 + day,
    }
}

/// 20 bars at 100, one at 80, then four at 100.
pub fn drop_then_recover() -> Vec<f64> {
    let mut closes = vec![100.0; 20];
    closes.push(80.0);
    closes.extend([100.0; 4]);
    closes
}

pub fn increasing(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.35).sin() * 12.0 + i as f64 * 0.05)
        .collect()
}

/// Config spanning a full year from 2024-01-01.
pub fn run_config(symbol: &str, capital: f64) -> RunConfig {
    RunConfig::new(symbol, start(), date(2025, 1, 1), capital)
}

pub fn csv_content(bars: &[Bar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}

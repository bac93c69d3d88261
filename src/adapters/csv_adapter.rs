//! CSV file price source.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with header
//! `date,open,high,low,close,volume`.

use crate::domain::error::BandtraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<'a>(record: &'a csv::StringRecord, index: usize, name: &str) -> Result<&'a str, BandtraderError> {
    record.get(index).map(str::trim).ok_or_else(|| BandtraderError::DataSource {
        reason: format!("missing {} column", name),
    })
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, BandtraderError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| BandtraderError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

/// Whole share counts; `60000.0` is accepted, fractional or negative counts are not.
fn parse_volume(record: &csv::StringRecord) -> Result<i64, BandtraderError> {
    let raw = field(record, 5, "volume")?;
    if let Ok(volume) = raw.parse::<i64>() {
        if volume >= 0 {
            return Ok(volume);
        }
    } else if let Ok(volume) = raw.parse::<f64>() {
        if volume.is_finite() && volume >= 0.0 && volume.fract() == 0.0 && volume < i64::MAX as f64 {
            return Ok(volume as i64);
        }
    }
    Err(BandtraderError::DataSource {
        reason: format!("invalid volume value: {}", raw),
    })
}

impl PriceSource for CsvPriceSource {
    fn fetch(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, BandtraderError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no price file for symbol");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(BandtraderError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BandtraderError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BandtraderError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date >= end_date {
                continue;
            }

            bars.push(Bar {
                date,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
                volume: parse_volume(&record)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded price history");
        Ok(bars)
    }
}

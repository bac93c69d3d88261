//! Column-oriented view of a signal series for chart rendering.

use chrono::NaiveDate;

use crate::domain::signal::SignalRow;

/// Every column a chart needs, aligned index-for-index with the filtered
/// series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub sma20: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub lower_band: Vec<f64>,
    pub ma50: Vec<Option<f64>>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl ChartSeries {
    pub fn from_signals(signals: &[SignalRow]) -> Self {
        let mut series = ChartSeries::default();
        for s in signals {
            let r = &s.row;
            series.dates.push(r.bar.date);
            series.open.push(r.bar.open);
            series.high.push(r.bar.high);
            series.low.push(r.bar.low);
            series.close.push(r.bar.close);
            series.sma20.push(r.sma20);
            series.upper_band.push(r.upper_band);
            series.lower_band.push(r.lower_band);
            series.ma50.push(r.ma50);
            series.rsi.push(r.rsi);
            series.macd.push(r.macd);
            series.signal_line.push(r.signal_line);
            series.histogram.push(r.macd_histogram);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Position of `date` on the x axis, if the series contains it.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

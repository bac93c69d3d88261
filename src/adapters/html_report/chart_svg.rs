//! Three-panel SVG chart: candlesticks with bands, RSI, MACD.

use std::fmt::Write;

use crate::domain::chart_series::ChartSeries;
use crate::domain::signal::Marker;

const SMA_COLOR: &str = "#2563eb";
const BAND_COLOR: &str = "#9ca3af";
const MA50_COLOR: &str = "#f59e0b";
const RSI_COLOR: &str = "#7c3aed";
const MACD_COLOR: &str = "#2563eb";
const SIGNAL_COLOR: &str = "#f97316";
const BUY_COLOR: &str = "#16a34a";
const SELL_COLOR: &str = "#dc2626";

/// Vertical mapping for one panel.
struct Panel {
    top: f64,
    height: f64,
    min: f64,
    max: f64,
}

impl Panel {
    fn new(top: f64, height: f64, min: f64, max: f64) -> Self {
        // pad a degenerate range so flat series draw mid-panel
        let (min, max) = if max > min { (min, max) } else { (min - 1.0, max + 1.0) };
        Panel {
            top,
            height,
            min,
            max,
        }
    }

    fn y(&self, value: f64) -> f64 {
        self.top + self.height - (value - self.min) / (self.max - self.min) * self.height
    }
}

pub struct SvgChartRenderer {
    pub width: f64,
    pub price_height: f64,
    pub rsi_height: f64,
    pub macd_height: f64,
    pub padding: f64,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        SvgChartRenderer {
            width: 900.0,
            price_height: 320.0,
            rsi_height: 140.0,
            macd_height: 140.0,
            padding: 40.0,
        }
    }
}

impl SvgChartRenderer {
    fn total_height(&self) -> f64 {
        self.price_height + self.rsi_height + self.macd_height + 4.0 * self.padding
    }

    fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.padding
    }

    fn x(&self, index: usize, len: usize) -> f64 {
        if len > 1 {
            self.padding + index as f64 * self.plot_width() / (len - 1) as f64
        } else {
            self.padding + self.plot_width() / 2.0
        }
    }

    /// Renders the chart, or an empty string when there is nothing to plot.
    pub fn render(&self, series: &ChartSeries, buys: &[Marker], sells: &[Marker]) -> String {
        if series.is_empty() {
            return String::new();
        }

        let n = series.len();
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
            self.width,
            self.total_height(),
            self.width,
            self.total_height()
        );
        svg.push('\n');

        // price panel
        let price_values = series
            .low
            .iter()
            .chain(&series.high)
            .chain(&series.upper_band)
            .chain(&series.lower_band)
            .chain(series.ma50.iter().flatten());
        let (min, max) = bounds(price_values.copied());
        let price = Panel::new(self.padding, self.price_height, min, max);
        self.frame(&mut svg, &price, "Price");

        let upper: Vec<Option<f64>> = series.upper_band.iter().copied().map(Some).collect();
        let lower: Vec<Option<f64>> = series.lower_band.iter().copied().map(Some).collect();
        let sma: Vec<Option<f64>> = series.sma20.iter().copied().map(Some).collect();
        self.polyline(&mut svg, &price, &upper, BAND_COLOR, "4,3");
        self.polyline(&mut svg, &price, &lower, BAND_COLOR, "4,3");
        self.polyline(&mut svg, &price, &sma, SMA_COLOR, "");
        self.polyline(&mut svg, &price, &series.ma50, MA50_COLOR, "");
        self.candles(&mut svg, &price, series);

        for m in buys {
            if let Some(i) = series.index_of(m.date) {
                let (x, y) = (self.x(i, n), price.y(m.price));
                let _ = writeln!(
                    svg,
                    r#"<polygon class="buy-marker" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="{}"/>"#,
                    x,
                    y + 2.0,
                    x - 5.0,
                    y + 10.0,
                    x + 5.0,
                    y + 10.0,
                    BUY_COLOR
                );
            }
        }
        for m in sells {
            if let Some(i) = series.index_of(m.date) {
                let (x, y) = (self.x(i, n), price.y(m.price));
                let _ = writeln!(
                    svg,
                    r#"<polygon class="sell-marker" points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="{}"/>"#,
                    x,
                    y - 2.0,
                    x - 5.0,
                    y - 10.0,
                    x + 5.0,
                    y - 10.0,
                    SELL_COLOR
                );
            }
        }

        // RSI panel, fixed 0..100 with 30/70 guides
        let rsi_top = 2.0 * self.padding + self.price_height;
        let rsi = Panel::new(rsi_top, self.rsi_height, 0.0, 100.0);
        self.frame(&mut svg, &rsi, "RSI");
        self.guide(&mut svg, &rsi, 70.0, SELL_COLOR);
        self.guide(&mut svg, &rsi, 30.0, BUY_COLOR);
        let rsi_values: Vec<Option<f64>> = series.rsi.iter().copied().map(Some).collect();
        self.polyline(&mut svg, &rsi, &rsi_values, RSI_COLOR, "");

        // MACD panel
        let macd_top = rsi_top + self.padding + self.rsi_height;
        let (min, max) = bounds(
            series
                .macd
                .iter()
                .chain(&series.signal_line)
                .chain(&series.histogram)
                .copied()
                .chain(std::iter::once(0.0)),
        );
        let macd = Panel::new(macd_top, self.macd_height, min, max);
        self.frame(&mut svg, &macd, "MACD");
        let zero = macd.y(0.0);
        let bar_width = (self.plot_width() / n as f64 * 0.6).max(1.0);
        for (i, &h) in series.histogram.iter().enumerate() {
            let y = macd.y(h);
            let color = if h >= 0.0 { BUY_COLOR } else { SELL_COLOR };
            let _ = writeln!(
                svg,
                r#"<rect class="histogram" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.5"/>"#,
                self.x(i, n) - bar_width / 2.0,
                y.min(zero),
                bar_width,
                (y - zero).abs(),
                color
            );
        }
        let line: Vec<Option<f64>> = series.macd.iter().copied().map(Some).collect();
        let signal: Vec<Option<f64>> = series.signal_line.iter().copied().map(Some).collect();
        self.polyline(&mut svg, &macd, &line, MACD_COLOR, "");
        self.polyline(&mut svg, &macd, &signal, SIGNAL_COLOR, "");

        let _ = writeln!(
            svg,
            r##"<text x="{:.0}" y="{:.0}" font-size="11" fill="#6b7280">{}</text>"##,
            self.padding,
            self.total_height() - self.padding / 3.0,
            series.dates[0]
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.0}" y="{:.0}" font-size="11" fill="#6b7280" text-anchor="end">{}</text>"##,
            self.width - self.padding,
            self.total_height() - self.padding / 3.0,
            series.dates[n - 1]
        );

        svg.push_str("</svg>");
        svg
    }

    /// One high-low wick and open-close body per row, green when the close
    /// is at or above the open.
    fn candles(&self, svg: &mut String, panel: &Panel, series: &ChartSeries) {
        let n = series.len();
        let body_width = (self.plot_width() / n as f64 * 0.6).max(1.0);
        for i in 0..n {
            let (open, close) = (series.open[i], series.close[i]);
            let color = if close >= open { BUY_COLOR } else { SELL_COLOR };
            let x = self.x(i, n);
            let _ = writeln!(
                svg,
                r#"<line class="wick" x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}"/>"#,
                x,
                panel.y(series.high[i]),
                x,
                panel.y(series.low[i]),
                color
            );
            let (y_open, y_close) = (panel.y(open), panel.y(close));
            let _ = writeln!(
                svg,
                r#"<rect class="candle" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x - body_width / 2.0,
                y_open.min(y_close),
                body_width,
                (y_open - y_close).abs().max(1.0),
                color
            );
        }
    }

    fn frame(&self, svg: &mut String, panel: &Panel, title: &str) {
        let _ = writeln!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#e5e7eb"/>"##,
            self.padding,
            panel.top,
            self.plot_width(),
            panel.height
        );
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" font-size="12" fill="#374151">{} ({:.2} to {:.2})</text>"##,
            self.padding,
            panel.top - 6.0,
            title,
            panel.min,
            panel.max
        );
    }

    fn guide(&self, svg: &mut String, panel: &Panel, level: f64, color: &str) {
        let y = panel.y(level);
        let _ = writeln!(
            svg,
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-dasharray="2,2"/>"#,
            self.padding,
            y,
            self.width - self.padding,
            y,
            color
        );
    }

    /// Draws `values`, breaking the line wherever a value is undefined.
    fn polyline(&self, svg: &mut String, panel: &Panel, values: &[Option<f64>], color: &str, dash: &str) {
        let n = values.len();
        let mut segment: Vec<String> = Vec::new();
        let flush = |segment: &mut Vec<String>, svg: &mut String| {
            if segment.len() > 1 {
                let dash_attr = if dash.is_empty() {
                    String::new()
                } else {
                    format!(r#" stroke-dasharray="{}""#, dash)
                };
                let _ = writeln!(
                    svg,
                    r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
                    color,
                    dash_attr,
                    segment.join(" ")
                );
            }
            segment.clear();
        };

        for (i, v) in values.iter().enumerate() {
            match v {
                Some(v) => segment.push(format!("{:.1},{:.1}", self.x(i, n), panel.y(*v))),
                None => flush(&mut segment, &mut *svg),
            }
        }
        flush(&mut segment, &mut *svg);
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

//! HTML report adapter implementing ReportPort.
//!
//! Renders `templates/report.html` with Askama and an inline SVG chart.

pub mod chart_svg;

use std::fs;
use std::path::Path;

use askama::Template;

use crate::domain::chart_series::ChartSeries;
use crate::domain::error::BandtraderError;
use crate::domain::pipeline::RunOutput;
use crate::ports::report_port::ReportPort;

use chart_svg::SvgChartRenderer;

struct TradeRow {
    date: String,
    action: String,
    trigger: String,
    regime: String,
    price: String,
    shares: String,
    amount: String,
    cash_after: String,
    shares_after: String,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    symbol: &'a str,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    rules: String,
    bar_count: usize,
    row_count: usize,
    initial_capital: String,
    final_value: String,
    profit: String,
    profit_pct: String,
    profit_class: &'static str,
    max_drawdown: String,
    cash: String,
    shares: String,
    latest_close: String,
    holdings_value: String,
    trade_count: usize,
    chart_svg: String,
    trades: Vec<TradeRow>,
}

fn money(v: f64) -> String {
    format!("${:.2}", v)
}

pub struct HtmlReportAdapter {
    renderer: SvgChartRenderer,
}

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self {
            renderer: SvgChartRenderer::default(),
        }
    }

    fn render(&self, output: &RunOutput) -> Result<String, BandtraderError> {
        let summary = &output.summary;
        let series = ChartSeries::from_signals(&output.signals);
        let chart_svg = self
            .renderer
            .render(&series, &output.buy_markers, &output.sell_markers);
        let latest_close = series.close.last().copied().unwrap_or(0.0);

        let trades = output
            .simulation
            .trades
            .iter()
            .map(|t| TradeRow {
                date: t.date.to_string(),
                action: t.action.to_string(),
                trigger: t.trigger.to_string(),
                regime: t.regime.to_string(),
                price: money(t.price),
                shares: format!("{:.4}", t.shares),
                amount: money(t.amount),
                cash_after: money(t.cash_after),
                shares_after: format!("{:.4}", t.shares_after),
            })
            .collect();

        let template = ReportTemplate {
            symbol: &output.config.symbol,
            start_date: output.config.start_date,
            end_date: output.config.end_date,
            rules: output.config.signals.rules.to_string(),
            bar_count: output.bar_count,
            row_count: output.signals.len(),
            initial_capital: money(summary.initial_capital),
            final_value: money(summary.final_value),
            profit: money(summary.profit),
            profit_pct: format!("{:.2}%", summary.profit_pct),
            profit_class: if summary.profit >= 0.0 { "positive" } else { "negative" },
            max_drawdown: format!("{:.2}%", summary.max_drawdown * 100.0),
            cash: money(summary.cash),
            shares: format!("{:.4}", summary.shares),
            latest_close: money(latest_close),
            holdings_value: money(summary.shares * latest_close),
            trade_count: summary.trade_count,
            chart_svg,
            trades,
        };

        template.render().map_err(|e| BandtraderError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, output: &RunOutput, output_path: &Path) -> Result<(), BandtraderError> {
        let html = self.render(output)?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;

        tracing::info!(path = %output_path.display(), "HTML report written");
        Ok(())
    }
}

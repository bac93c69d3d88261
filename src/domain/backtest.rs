//! Day-by-day portfolio simulation over a signal series.

use crate::domain::decision::{decide, Decision, SizingRules};
use crate::domain::portfolio::{EquityPoint, Portfolio, Trade};
use crate::domain::regime::MarketRegime;
use crate::domain::signal::SignalRow;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub initial_capital: f64,
    pub cash: f64,
    pub shares: f64,
    pub trades: Vec<Trade>,
    /// One point per signal row, in order.
    pub equity_curve: Vec<EquityPoint>,
}

impl SimulationResult {
    /// Portfolio value on the last bar, `None` when no bars were simulated.
    pub fn final_value(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.value)
    }
}

impl From<Portfolio> for SimulationResult {
    fn from(portfolio: Portfolio) -> Self {
        SimulationResult {
            initial_capital: portfolio.initial_capital,
            cash: portfolio.cash,
            shares: portfolio.shares,
            trades: portfolio.trades,
            equity_curve: portfolio.equity_curve,
        }
    }
}

/// Replays `signals` against a fresh cash ledger.
///
/// Each bar: classify the regime, execute at most one action, then record
/// cash + shares * close. An empty `signals` slice yields an empty result.
pub fn simulate(signals: &[SignalRow], initial_capital: f64, sizing: &SizingRules) -> SimulationResult {
    let mut portfolio = Portfolio::new(initial_capital);

    for signal in signals {
        let date = signal.date();
        let price = signal.close();
        let regime = MarketRegime::classify(price, signal.row.ma50);

        match decide(&signal.flags, regime, portfolio.cash, portfolio.shares, sizing) {
            Decision::Invest { trigger, fraction } => {
                let trade = portfolio.invest(date, price, fraction, trigger, regime);
                tracing::debug!(
                    %date,
                    %trigger,
                    %regime,
                    amount = trade.amount,
                    shares = trade.shares,
                    "buy executed"
                );
            }
            Decision::Liquidate { trigger, fraction } => {
                let trade = portfolio.liquidate(date, price, fraction, trigger, regime);
                tracing::debug!(
                    %date,
                    %trigger,
                    %regime,
                    amount = trade.amount,
                    shares = trade.shares,
                    "sell executed"
                );
            }
            Decision::Gated(kind) => {
                tracing::trace!(%date, %kind, %regime, "signal held by regime gate");
            }
            Decision::Hold => {}
        }

        portfolio.record_equity(date, price);
    }

    tracing::info!(
        bars = signals.len(),
        trades = portfolio.trades.len(),
        cash = portfolio.cash,
        shares = portfolio.shares,
        "simulation finished"
    );
    portfolio.into()
}

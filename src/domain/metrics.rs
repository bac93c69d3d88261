//! Run summary: final value, profit and holdings.

use super::backtest::SimulationResult;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub initial_capital: f64,
    pub final_value: f64,
    pub profit: f64,
    /// Profit as a percentage of initial capital; 0 when capital is 0.
    pub profit_pct: f64,
    pub cash: f64,
    pub shares: f64,
    pub trade_count: usize,
    /// Largest peak-to-trough fall as a fraction of the peak.
    pub max_drawdown: f64,
}

impl Summary {
    /// `None` when the simulation covered no bars.
    pub fn compute(result: &SimulationResult) -> Option<Self> {
        let final_value = result.final_value()?;
        let initial_capital = result.initial_capital;
        let profit = final_value - initial_capital;
        let profit_pct = if initial_capital > 0.0 {
            profit / initial_capital * 100.0
        } else {
            0.0
        };

        Some(Summary {
            initial_capital,
            final_value,
            profit,
            profit_pct,
            cash: result.cash,
            shares: result.shares,
            trade_count: result.trades.len(),
            max_drawdown: compute_drawdown(&result.equity_curve),
        })
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.value;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.value > peak {
            peak = point.value;
        }
        if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

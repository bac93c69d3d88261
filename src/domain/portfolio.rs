//! Cash/shares ledger, trade records and value trajectory.

use std::fmt;

use chrono::NaiveDate;

use super::regime::MarketRegime;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Ledger label of an executed trade. Both sell paths are recorded as
/// `StrongSell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    StrongSell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("Buy"),
            TradeAction::StrongSell => f.write_str("Strong Sell"),
        }
    }
}

/// The signal that caused a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    StrongBuy,
    Buy,
    StrongSell,
    Sell,
}

impl SignalKind {
    pub fn action(self) -> TradeAction {
        match self {
            SignalKind::StrongBuy | SignalKind::Buy => TradeAction::Buy,
            SignalKind::StrongSell | SignalKind::Sell => TradeAction::StrongSell,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::StrongBuy => "StrongBuy",
            SignalKind::Buy => "Buy",
            SignalKind::StrongSell => "StrongSell",
            SignalKind::Sell => "Sell",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub trigger: SignalKind,
    pub regime: MarketRegime,
    pub price: f64,
    /// Shares bought or sold.
    pub shares: f64,
    /// Cash spent or received.
    pub amount: f64,
    pub cash_after: f64,
    pub shares_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub shares: f64,
    pub initial_capital: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            shares: 0.0,
            initial_capital,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }

    /// Spends `fraction` of current cash on shares at `price`.
    pub fn invest(
        &mut self,
        date: NaiveDate,
        price: f64,
        fraction: f64,
        trigger: SignalKind,
        regime: MarketRegime,
    ) -> &Trade {
        let amount = self.cash * fraction;
        let bought = amount / price;
        self.cash -= amount;
        self.shares += bought;
        self.push_trade(date, price, bought, amount, trigger, regime)
    }

    /// Sells `fraction` of current shares at `price`.
    pub fn liquidate(
        &mut self,
        date: NaiveDate,
        price: f64,
        fraction: f64,
        trigger: SignalKind,
        regime: MarketRegime,
    ) -> &Trade {
        let sold = self.shares * fraction;
        let amount = sold * price;
        self.cash += amount;
        self.shares -= sold;
        self.push_trade(date, price, sold, amount, trigger, regime)
    }

    pub fn record_equity(&mut self, date: NaiveDate, price: f64) {
        let value = self.value(price);
        self.equity_curve.push(EquityPoint { date, value });
    }

    fn push_trade(
        &mut self,
        date: NaiveDate,
        price: f64,
        shares: f64,
        amount: f64,
        trigger: SignalKind,
        regime: MarketRegime,
    ) -> &Trade {
        self.trades.push(Trade {
            date,
            action: trigger.action(),
            trigger,
            regime,
            price,
            shares,
            amount,
            cash_after: self.cash,
            shares_after: self.shares,
        });
        &self.trades[self.trades.len() - 1]
    }
}

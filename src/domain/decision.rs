//! Per-bar action selection.
//!
//! Rules are tried in a fixed order: StrongBuy, Buy, StrongSell, Sell. A
//! rule matches when its flag is set and its balance guard holds (cash for
//! buys, shares for sells). The first match decides the bar; plain Buy and
//! Sell then still need the right regime, and when they don't get it the bar
//! is held without consulting later rules.

use crate::domain::portfolio::SignalKind;
use crate::domain::regime::MarketRegime;
use crate::domain::signal::SignalFlags;

/// Fractions of cash invested or shares sold per rule and regime.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingRules {
    pub strong_buy_bull: f64,
    pub strong_buy_bear: f64,
    pub strong_buy_neutral: f64,
    /// Plain Buy only acts in a bull regime.
    pub buy_bull: f64,
    pub strong_sell_bull: f64,
    pub strong_sell_bear: f64,
    pub strong_sell_neutral: f64,
    /// Plain Sell only acts in a bear regime.
    pub sell_bear: f64,
}

impl Default for SizingRules {
    fn default() -> Self {
        SizingRules {
            strong_buy_bull: 0.6,
            strong_buy_bear: 0.4,
            strong_buy_neutral: 0.5,
            buy_bull: 0.5,
            strong_sell_bull: 0.3,
            strong_sell_bear: 0.6,
            strong_sell_neutral: 0.45,
            sell_bear: 0.5,
        }
    }
}

impl SizingRules {
    pub fn strong_buy_fraction(&self, regime: MarketRegime) -> f64 {
        match regime {
            MarketRegime::Bull => self.strong_buy_bull,
            MarketRegime::Bear => self.strong_buy_bear,
            MarketRegime::Neutral => self.strong_buy_neutral,
        }
    }

    pub fn strong_sell_fraction(&self, regime: MarketRegime) -> f64 {
        match regime {
            MarketRegime::Bull => self.strong_sell_bull,
            MarketRegime::Bear => self.strong_sell_bear,
            MarketRegime::Neutral => self.strong_sell_neutral,
        }
    }

    /// Every fraction with its config key, for validation and display.
    pub fn named_fractions(&self) -> [(&'static str, f64); 8] {
        [
            ("strong_buy_bull", self.strong_buy_bull),
            ("strong_buy_bear", self.strong_buy_bear),
            ("strong_buy_neutral", self.strong_buy_neutral),
            ("buy_bull", self.buy_bull),
            ("strong_sell_bull", self.strong_sell_bull),
            ("strong_sell_bear", self.strong_sell_bear),
            ("strong_sell_neutral", self.strong_sell_neutral),
            ("sell_bear", self.sell_bear),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// No rule matched.
    Hold,
    /// A plain rule matched but the regime gate blocked it.
    Gated(SignalKind),
    /// Spend this fraction of cash.
    Invest { trigger: SignalKind, fraction: f64 },
    /// Sell this fraction of shares.
    Liquidate { trigger: SignalKind, fraction: f64 },
}

const PRIORITY: [SignalKind; 4] = [
    SignalKind::StrongBuy,
    SignalKind::Buy,
    SignalKind::StrongSell,
    SignalKind::Sell,
];

fn matches_rule(kind: SignalKind, flags: &SignalFlags, cash: f64, shares: f64) -> bool {
    match kind {
        SignalKind::StrongBuy => flags.strong_buy && cash > 0.0,
        SignalKind::Buy => flags.buy && cash > 0.0,
        SignalKind::StrongSell => flags.strong_sell && shares > 0.0,
        SignalKind::Sell => flags.sell && shares > 0.0,
    }
}

/// Picks at most one action for a bar.
pub fn decide(
    flags: &SignalFlags,
    regime: MarketRegime,
    cash: f64,
    shares: f64,
    sizing: &SizingRules,
) -> Decision {
    let Some(kind) = PRIORITY
        .into_iter()
        .find(|&kind| matches_rule(kind, flags, cash, shares))
    else {
        return Decision::Hold;
    };

    match (kind, regime) {
        (SignalKind::StrongBuy, _) => Decision::Invest {
            trigger: kind,
            fraction: sizing.strong_buy_fraction(regime),
        },
        (SignalKind::Buy, MarketRegime::Bull) => Decision::Invest {
            trigger: kind,
            fraction: sizing.buy_bull,
        },
        (SignalKind::StrongSell, _) => Decision::Liquidate {
            trigger: kind,
            fraction: sizing.strong_sell_fraction(regime),
        },
        (SignalKind::Sell, MarketRegime::Bear) => Decision::Liquidate {
            trigger: kind,
            fraction: sizing.sell_bear,
        },
        (kind, _) => Decision::Gated(kind),
    }
}

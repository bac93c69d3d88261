//! Market regime classification from price versus the 50-bar average.

use std::fmt;

/// Price must sit 5% above MA50 for a bull regime.
pub const BULL_FACTOR: f64 = 1.05;
/// Price must sit 5% below MA50 for a bear regime.
pub const BEAR_FACTOR: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketRegime {
    Bull,
    Bear,
    Neutral,
}

impl MarketRegime {
    /// An undefined MA50 (fewer than 50 bars so far) classifies as neutral.
    pub fn classify(close: f64, ma50: Option<f64>) -> Self {
        match ma50 {
            Some(ma) if close > ma * BULL_FACTOR => MarketRegime::Bull,
            Some(ma) if close < ma * BEAR_FACTOR => MarketRegime::Bear,
            _ => MarketRegime::Neutral,
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketRegime::Bull => "BULL",
            MarketRegime::Bear => "BEAR",
            MarketRegime::Neutral => "NEUTRAL",
        };
        f.write_str(name)
    }
}

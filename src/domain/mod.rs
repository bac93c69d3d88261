//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_frame;
pub mod signal;
pub mod regime;
pub mod portfolio;
pub mod decision;
pub mod backtest;
pub mod metrics;
pub mod chart_series;
pub mod pipeline;
pub mod config_validation;
pub mod error;

//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for bandtrader.
///
/// `InvalidInput`, `DataUnavailable` and `InsufficientHistory` are the
/// terminal run conditions; the rest come from the surrounding shell
/// (config files, CSV sources, report output).
#[derive(Debug, thiserror::Error)]
pub enum BandtraderError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("no data available for {symbol} between {start} and {end}")]
    DataUnavailable {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BandtraderError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        BandtraderError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BandtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&BandtraderError> for std::process::ExitCode {
    fn from(err: &BandtraderError) -> Self {
        let code: u8 = match err {
            BandtraderError::Io(_) | BandtraderError::Report { .. } => 1,
            BandtraderError::ConfigParse { .. }
            | BandtraderError::ConfigMissing { .. }
            | BandtraderError::ConfigInvalid { .. } => 2,
            BandtraderError::InvalidInput { .. } => 3,
            BandtraderError::DataSource { .. } => 4,
            BandtraderError::DataUnavailable { .. }
            | BandtraderError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_history() {
        let err = BandtraderError::InsufficientHistory {
            symbol: "AAPL".into(),
            bars: 12,
            minimum: 20,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history for AAPL: have 12 bars, need 20"
        );
    }

    #[test]
    fn display_data_unavailable() {
        let err = BandtraderError::DataUnavailable {
            symbol: "MSFT".into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no data available for MSFT between 2024-01-01 and 2024-03-01"
        );
    }

    #[test]
    fn config_invalid_helper() {
        let err = BandtraderError::config_invalid("run", "initial_capital", "must be >= 0");
        assert_eq!(
            err.to_string(),
            "invalid config value [run] initial_capital: must be >= 0"
        );
    }
}

//! Trade ledger export as CSV.

use std::fs;
use std::path::Path;

use crate::domain::error::BandtraderError;
use crate::domain::pipeline::RunOutput;
use crate::ports::report_port::ReportPort;

const HEADER: [&str; 9] = [
    "date",
    "action",
    "signal",
    "regime",
    "price",
    "shares",
    "amount",
    "cash_after",
    "shares_after",
];

pub struct CsvTradeWriter;

fn csv_err(e: csv::Error) -> BandtraderError {
    BandtraderError::Report {
        reason: format!("CSV write error: {}", e),
    }
}

impl ReportPort for CsvTradeWriter {
    fn write(&self, output: &RunOutput, output_path: &Path) -> Result<(), BandtraderError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_err)?;
        wtr.write_record(HEADER).map_err(csv_err)?;
        for t in &output.simulation.trades {
            wtr.write_record([
                t.date.to_string(),
                t.action.to_string(),
                t.trigger.to_string(),
                t.regime.to_string(),
                t.price.to_string(),
                t.shares.to_string(),
                t.amount.to_string(),
                t.cash_after.to_string(),
                t.shares_after.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;

        tracing::info!(
            path = %output_path.display(),
            trades = output.simulation.trades.len(),
            "trade CSV written"
        );
        Ok(())
    }
}

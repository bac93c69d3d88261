//! Report rendering port trait.

use crate::domain::error::BandtraderError;
use crate::domain::pipeline::RunOutput;
use std::path::Path;

/// Port for rendering a finished run.
pub trait ReportPort {
    fn write(&self, output: &RunOutput, output_path: &Path) -> Result<(), BandtraderError>;
}

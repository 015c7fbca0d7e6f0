//! Report output port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::FrontierError;
use std::path::Path;

/// Port for handing analysis results to rendering/display collaborators.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_dir: &Path) -> Result<(), FrontierError>;
}

//! Report generation port trait.

use crate::domain::error::PosttraderError;
use crate::domain::oracle::PricePoint;
use crate::domain::report::{RunStats, Summary};
use crate::domain::simulator::SimulationRun;
use std::path::Path;

/// Everything a report writer may render.
pub struct ReportContext<'a> {
    pub run: &'a SimulationRun,
    pub summary: &'a Summary,
    pub stats: &'a RunStats,
    /// Price history the run was priced against, chronological.
    pub prices: &'a [PricePoint],
    pub position_size_usdt: f64,
    pub hold_duration_minutes: i64,
    pub threshold: u8,
}

/// Port for writing simulation reports.
pub trait ReportPort {
    fn write(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), PosttraderError>;
}

//! CSV price history adapter.
//!
//! Expects a header row followed by `timestamp,price` records; extra columns
//! are ignored. A fetch keeps the rows inside the requested window plus the
//! nearest row on either side of it, so lookups at the window edges still
//! have two samples to interpolate between.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::domain::error::PosttraderError;
use crate::domain::oracle::PricePoint;
use crate::domain::post::parse_timestamp;
use crate::ports::price_port::PricePort;

pub struct CsvPriceAdapter {
    path: PathBuf,
    label: String,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        let label = path.display().to_string();
        Self { path, label }
    }

    fn fetch_error(&self, reason: impl Into<String>) -> PosttraderError {
        PosttraderError::Fetch {
            source_name: self.label.clone(),
            reason: reason.into(),
        }
    }
}

impl PricePort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, PosttraderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.fetch_error(format!("failed to read {}: {}", self.path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| self.fetch_error(format!("CSV parse error: {}", e)))?;

            let ts_str = record
                .get(0)
                .ok_or_else(|| self.fetch_error("missing timestamp column"))?;
            let timestamp = parse_timestamp(ts_str)
                .ok_or_else(|| self.fetch_error(format!("invalid timestamp: {}", ts_str)))?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| self.fetch_error("missing price column"))?
                .trim()
                .parse()
                .map_err(|e| self.fetch_error(format!("invalid price value: {}", e)))?;

            points.push(PricePoint { timestamp, price });
        }

        points.sort_by_key(|p| p.timestamp);
        Ok(bracket_window(points, start, end))
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Rows in `[start, end]` widened to the nearest sample at or before `start`
/// and the nearest at or after `end`. `points` must be sorted.
fn bracket_window(
    mut points: Vec<PricePoint>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<PricePoint> {
    let lower = points
        .iter()
        .rev()
        .find(|p| p.timestamp <= start)
        .map_or(start, |p| p.timestamp);
    let upper = points
        .iter()
        .find(|p| p.timestamp >= end)
        .map_or(end, |p| p.timestamp);
    points.retain(|p| p.timestamp >= lower && p.timestamp <= upper);
    points
}

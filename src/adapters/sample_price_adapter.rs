//! Deterministic synthetic price series, used when no price export is available.
//!
//! The price is a base of 0.60 plus a daily step on a 10-day cycle anchored
//! at 2024-08-10 (±0.02 per day) and a small intraday hour term (±0.005),
//! clamped to [0.30, 1.00].

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

use crate::domain::config_validation::MAX_WINDOW_MINUTES;
use crate::domain::error::PosttraderError;
use crate::domain::oracle::PricePoint;
use crate::ports::price_port::PricePort;

const BASE_PRICE: f64 = 0.60;
const DAILY_STEP: f64 = 0.02;
const HOURLY_SPREAD: f64 = 0.01;
const MIN_PRICE: f64 = 0.30;
const MAX_PRICE: f64 = 1.00;
const SECONDS_PER_DAY: i64 = 86_400;

pub struct SamplePriceAdapter {
    step: Duration,
}

impl SamplePriceAdapter {
    /// Sample every `step_minutes`, clamped to one minute..one day.
    pub fn new(step_minutes: i64) -> Self {
        Self {
            step: Duration::minutes(step_minutes.clamp(1, MAX_WINDOW_MINUTES)),
        }
    }

    pub fn price_at(timestamp: DateTime<Utc>) -> f64 {
        let anchor = Utc
            .with_ymd_and_hms(2024, 8, 10, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let day_offset = (timestamp - anchor).num_seconds().div_euclid(SECONDS_PER_DAY);
        let hour_factor = f64::from(timestamp.hour()) / 24.0;

        let daily = (day_offset.rem_euclid(10) - 5) as f64 * DAILY_STEP;
        let hourly = (hour_factor - 0.5) * HOURLY_SPREAD;

        (BASE_PRICE + daily + hourly).clamp(MIN_PRICE, MAX_PRICE)
    }
}

impl Default for SamplePriceAdapter {
    fn default() -> Self {
        Self::new(5)
    }
}

impl PricePort for SamplePriceAdapter {
    fn fetch_prices(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, PosttraderError> {
        let mut points = Vec::new();
        let mut next = Some(start);
        while let Some(t) = next.filter(|t| *t <= end) {
            points.push(PricePoint::new(t, Self::price_at(t)));
            next = t.checked_add_signed(self.step);
        }
        // Always cover the end of the window.
        if points.last().map(|p| p.timestamp) != Some(end) && start <= end {
            points.push(PricePoint::new(end, Self::price_at(end)));
        }
        Ok(points)
    }

    fn name(&self) -> &str {
        "sample"
    }
}

//! Price history port trait.

use chrono::{DateTime, Utc};

use crate::domain::error::PosttraderError;
use crate::domain::oracle::PricePoint;

pub trait PricePort {
    /// Samples within `[start, end]`, sorted by timestamp.
    fn fetch_prices(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, PosttraderError>;

    fn name(&self) -> &str;
}

//! Interpolating price oracle over an ordered price history.
//!
//! Lookups binary-search the two samples bracketing the requested timestamp
//! and interpolate linearly between them. A timestamp that lands exactly on a
//! sample returns that sample's price unchanged.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::PosttraderError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        PricePoint { timestamp, price }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriceOracle {
    points: Vec<PricePoint>,
}

impl PriceOracle {
    /// Build an oracle from samples in any order.
    ///
    /// Samples sharing a timestamp collapse to the last one seen in input
    /// order. Non-finite or non-positive prices are rejected.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, PosttraderError> {
        if let Some(bad) = points
            .iter()
            .find(|p| !p.price.is_finite() || p.price <= 0.0)
        {
            return Err(PosttraderError::InvalidPrice {
                timestamp: bad.timestamp,
                price: bad.price,
            });
        }

        let mut points = points;
        // Stable: the last sample seen for a timestamp wins below.
        points.sort_by_key(|p| p.timestamp);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(PriceOracle { points: deduped })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Inclusive timestamp range covered by the samples.
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    pub fn price_at(&self, timestamp: DateTime<Utc>) -> Result<f64, PosttraderError> {
        let out_of_range = || PosttraderError::OutOfRange { timestamp };

        let (start, end) = self.range().ok_or_else(out_of_range)?;
        if timestamp < start || timestamp > end {
            return Err(out_of_range());
        }

        match self
            .points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
        {
            Ok(idx) => Ok(self.points[idx].price),
            Err(idx) => {
                // In range and not an exact hit, so 0 < idx < len.
                let p0 = &self.points[idx - 1];
                let p1 = &self.points[idx];
                Ok(interpolate(p0, p1, timestamp))
            }
        }
    }

    /// Latest sample at or before `timestamp`, if any.
    pub fn latest_at_or_before(&self, timestamp: DateTime<Utc>) -> Option<&PricePoint> {
        let idx = self.points.partition_point(|p| p.timestamp <= timestamp);
        idx.checked_sub(1).map(|i| &self.points[i])
    }
}

fn interpolate(p0: &PricePoint, p1: &PricePoint, timestamp: DateTime<Utc>) -> f64 {
    let span = nanos(p1.timestamp - p0.timestamp);
    let offset = nanos(timestamp - p0.timestamp);
    p0.price + (p1.price - p0.price) * offset / span
}

/// Nanosecond length of `delta`; spans past ~292 years fall back to milliseconds.
fn nanos(delta: TimeDelta) -> f64 {
    delta
        .num_nanoseconds()
        .map_or_else(|| delta.num_milliseconds() as f64 * 1e6, |n| n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 10, h, m, 0).unwrap()
    }

    fn sample_oracle() -> PriceOracle {
        PriceOracle::new(vec![
            PricePoint::new(at(10, 0), 0.58),
            PricePoint::new(at(10, 30), 0.595),
            PricePoint::new(at(11, 0), 0.57),
        ])
        .unwrap()
    }

    #[test]
    fn exact_sample_returns_price() {
        let oracle = sample_oracle();
        assert_eq!(oracle.price_at(at(10, 0)).unwrap(), 0.58);
        assert_eq!(oracle.price_at(at(10, 30)).unwrap(), 0.595);
        assert_eq!(oracle.price_at(at(11, 0)).unwrap(), 0.57);
    }

    #[test]
    fn midpoint_interpolates() {
        let oracle = sample_oracle();
        assert_relative_eq!(oracle.price_at(at(10, 15)).unwrap(), 0.5875, epsilon = 1e-12);
        assert_relative_eq!(oracle.price_at(at(10, 45)).unwrap(), 0.5825, epsilon = 1e-12);
    }

    #[test]
    fn outside_range_is_error() {
        let oracle = sample_oracle();
        assert!(matches!(
            oracle.price_at(at(9, 59)),
            Err(PosttraderError::OutOfRange { .. })
        ));
        assert!(matches!(
            oracle.price_at(at(11, 1)),
            Err(PosttraderError::OutOfRange { .. })
        ));
    }

    #[test]
    fn empty_oracle_is_always_out_of_range() {
        let oracle = PriceOracle::new(vec![]).unwrap();
        assert!(oracle.is_empty());
        assert!(oracle.range().is_none());
        assert!(oracle.price_at(at(10, 0)).is_err());
        assert!(oracle.latest_at_or_before(at(10, 0)).is_none());
    }

    #[test]
    fn single_sample_only_resolves_itself() {
        let oracle = PriceOracle::new(vec![PricePoint::new(at(10, 0), 1.0)]).unwrap();
        assert_eq!(oracle.price_at(at(10, 0)).unwrap(), 1.0);
        assert!(oracle.price_at(at(10, 1)).is_err());
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let oracle = PriceOracle::new(vec![
            PricePoint::new(at(11, 0), 3.0),
            PricePoint::new(at(10, 0), 1.0),
            PricePoint::new(at(10, 30), 2.0),
        ])
        .unwrap();
        let prices: Vec<f64> = oracle.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_timestamp_keeps_last_seen() {
        let oracle = PriceOracle::new(vec![
            PricePoint::new(at(10, 0), 1.0),
            PricePoint::new(at(10, 30), 2.0),
            PricePoint::new(at(10, 0), 1.5),
        ])
        .unwrap();
        assert_eq!(oracle.len(), 2);
        assert_eq!(oracle.price_at(at(10, 0)).unwrap(), 1.5);
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = PriceOracle::new(vec![PricePoint::new(at(10, 0), 0.0)]).unwrap_err();
        assert!(matches!(err, PosttraderError::InvalidPrice { .. }));

        let err = PriceOracle::new(vec![PricePoint::new(at(10, 0), f64::NAN)]).unwrap_err();
        assert!(matches!(err, PosttraderError::InvalidPrice { .. }));
    }

    #[test]
    fn latest_at_or_before_finds_floor_sample() {
        let oracle = sample_oracle();
        assert!(oracle.latest_at_or_before(at(9, 0)).is_none());
        assert_eq!(oracle.latest_at_or_before(at(10, 0)).unwrap().price, 0.58);
        assert_eq!(oracle.latest_at_or_before(at(10, 29)).unwrap().price, 0.58);
        assert_eq!(oracle.latest_at_or_before(at(23, 0)).unwrap().price, 0.57);
    }

    #[test]
    fn sub_millisecond_samples_interpolate() {
        let t0 = at(10, 0);
        let oracle = PriceOracle::new(vec![
            PricePoint::new(t0, 1.0),
            PricePoint::new(t0 + Duration::microseconds(500), 2.0),
        ])
        .unwrap();
        let mid = oracle.price_at(t0 + Duration::microseconds(250)).unwrap();
        assert!(mid.is_finite());
        assert_relative_eq!(mid, 1.5, epsilon = 1e-12);
    }

    fn arb_series() -> impl Strategy<Value = Vec<PricePoint>> {
        prop::collection::vec((1i64..600, 0.01f64..100.0), 2..40).prop_map(|steps| {
            let mut t = at(0, 0);
            steps
                .into_iter()
                .map(|(gap, price)| {
                    t += Duration::minutes(gap);
                    PricePoint::new(t, price)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn exact_samples_have_no_drift(series in arb_series()) {
            let oracle = PriceOracle::new(series.clone()).unwrap();
            for point in &series {
                prop_assert_eq!(oracle.price_at(point.timestamp).unwrap(), point.price);
            }
        }

        #[test]
        fn between_samples_is_monotonic(series in arb_series(), frac in 0.05f64..0.95) {
            let oracle = PriceOracle::new(series.clone()).unwrap();
            for w in series.windows(2) {
                let span = (w[1].timestamp - w[0].timestamp).num_seconds();
                if span < 3 || (w[1].price - w[0].price).abs() < 1e-6 {
                    continue;
                }
                let first = ((span as f64 * frac) as i64).clamp(1, span - 2);
                let t1 = w[0].timestamp + Duration::seconds(first);
                let t2 = t1 + Duration::seconds(1);
                let p1 = oracle.price_at(t1).unwrap();
                let p2 = oracle.price_at(t2).unwrap();
                let lo = w[0].price.min(w[1].price);
                let hi = w[0].price.max(w[1].price);
                prop_assert!(p1 >= lo && p1 <= hi);
                if w[1].price > w[0].price {
                    prop_assert!(p2 > p1);
                } else {
                    prop_assert!(p2 < p1);
                }
            }
        }
    }
}

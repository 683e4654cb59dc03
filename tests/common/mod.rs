#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use posttrader::domain::classifier::ClassifierConfig;
use posttrader::domain::error::PosttraderError;
use posttrader::domain::oracle::{PriceOracle, PricePoint};
use posttrader::domain::post::Post;
use posttrader::ports::post_port::PostPort;
use posttrader::ports::price_port::PricePort;
use std::collections::BTreeMap;

pub struct MockPostPort {
    pub posts: Vec<Post>,
    pub error: Option<String>,
}

impl MockPostPort {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            posts: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl PostPort for MockPostPort {
    fn fetch_posts(&self) -> Result<Vec<Post>, PosttraderError> {
        match &self.error {
            Some(reason) => Err(PosttraderError::Fetch {
                source_name: "mock".into(),
                reason: reason.clone(),
            }),
            None => Ok(self.posts.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub struct MockPricePort {
    pub points: Vec<PricePoint>,
}

impl MockPricePort {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, PosttraderError> {
        Ok(self
            .points
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// 2024-08-10 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 10, h, m, 0).unwrap()
}

pub fn oracle(points: &[(DateTime<Utc>, f64)]) -> PriceOracle {
    PriceOracle::new(points.iter().map(|&(t, p)| PricePoint::new(t, p)).collect()).unwrap()
}

/// Three categories, so "Major partnership launch announced" hits all of them.
pub fn three_category_config() -> ClassifierConfig {
    let mut high_impact = BTreeMap::new();
    high_impact.insert("partnership".to_string(), vec!["partnership".to_string()]);
    high_impact.insert("launch".to_string(), vec!["launch".to_string()]);
    high_impact.insert("milestone".to_string(), vec!["announced".to_string()]);
    ClassifierConfig {
        high_impact,
        ..ClassifierConfig::default()
    }
}

pub const SCENARIO_A_TEXT: &str = "Major partnership launch announced";
pub const HOT: &str = "Huge partnership, mainnet launch and airdrop";

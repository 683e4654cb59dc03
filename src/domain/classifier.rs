//! Keyword-based impact classifier.
//!
//! A post's text is case-folded and scanned for keyword matches:
//! each high-impact category that matches adds `category_score`, engagement
//! and excitement add small bonuses, and every low-impact keyword subtracts
//! `low_impact_penalty`. The total is clamped to [1, 10]. Any low-impact match
//! then caps the score below the threshold, so suppressed posts never qualify
//! no matter how many high-impact categories they also hit.

use std::collections::BTreeMap;
use std::fmt;

use super::config_validation::validate_classifier_config;
use super::error::PosttraderError;
use super::post::{Engagement, Post};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;
pub const MAX_ENGAGEMENT_BONUS: u64 = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Category label -> keywords.
    pub high_impact: BTreeMap<String, Vec<String>>,
    pub low_impact: Vec<String>,
    pub excitement_indicators: Vec<String>,
    pub threshold: u8,
    pub category_score: u32,
    pub low_impact_penalty: u32,
    pub engagement_weight: u64,
    pub excitement_bonus: u32,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let mut high_impact = BTreeMap::new();
        high_impact.insert(
            "partnership".to_string(),
            words(&["partnership", "collaboration", "integrate", "alliance"]),
        );
        high_impact.insert(
            "launch".to_string(),
            words(&["launch", "mainnet", "release", "deploy", "live"]),
        );
        high_impact.insert(
            "reward".to_string(),
            words(&["rewards", "airdrop", "incentive", "staking"]),
        );
        high_impact.insert(
            "milestone".to_string(),
            words(&["milestone", "upgrade", "listing", "exchange"]),
        );
        high_impact.insert(
            "strategic-shift".to_string(),
            words(&["strategic", "roadmap", "vision", "future"]),
        );

        ClassifierConfig {
            high_impact,
            low_impact: words(&["ama", "meme", "gm", "gn", "thread", "reminder"]),
            excitement_indicators: words(&["🚀", "🔥", "⚡", "breaking", "major", "huge"]),
            threshold: 7,
            category_score: 3,
            low_impact_penalty: 2,
            engagement_weight: 150,
            excitement_bonus: 1,
        }
    }
}

/// Result of classifying one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactScore {
    pub score: u8,
    pub qualifies: bool,
    /// Matched high-impact category labels, in category order.
    pub categories: Vec<String>,
    /// Matched low-impact keywords; non-empty means the score was suppressed.
    pub suppressed_by: Vec<String>,
    pub engagement_bonus: u32,
    pub excitement_bonus: u32,
    pub engagement: Option<Engagement>,
}

impl ImpactScore {
    pub fn is_suppressed(&self) -> bool {
        !self.suppressed_by.is_empty()
    }

    /// Human-readable breakdown, written to the evaluations CSV.
    pub fn reasoning(&self) -> String {
        let (likes, retweets) = self
            .engagement
            .map(|e| (e.likes, e.retweets))
            .unwrap_or((0, 0));
        let mut out = format!(
            "Categories: [{}], Engagement: {}L/{}RT (+{}), Excitement: +{}",
            self.categories.join(", "),
            likes,
            retweets,
            self.engagement_bonus,
            self.excitement_bonus,
        );
        if self.is_suppressed() {
            out.push_str(&format!(", Suppressed by: [{}]", self.suppressed_by.join(", ")));
        }
        out
    }
}

/// How a normalized keyword is matched against text.
#[derive(Debug, Clone, PartialEq)]
enum Matcher {
    /// Whole-word sequence, for keywords made of letters, digits and spaces.
    Words(Vec<String>),
    /// Raw substring, for emoji, tickers and other punctuation-bearing keywords.
    Substring(String),
}

impl Matcher {
    fn new(keyword: &str) -> Self {
        let keyword = keyword.trim().to_lowercase();
        if keyword.chars().all(|c| c.is_alphanumeric() || c.is_whitespace()) {
            Matcher::Words(keyword.split_whitespace().map(str::to_string).collect())
        } else {
            Matcher::Substring(keyword)
        }
    }

    fn matches(&self, text: &NormalizedText) -> bool {
        match self {
            Matcher::Words(seq) => {
                !seq.is_empty()
                    && text
                        .tokens
                        .windows(seq.len())
                        .any(|w| w.iter().zip(seq).all(|(a, b)| a == b))
            }
            Matcher::Substring(s) => !s.is_empty() && text.folded.contains(s.as_str()),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Words(seq) => write!(f, "{}", seq.join(" ")),
            Matcher::Substring(s) => write!(f, "{}", s),
        }
    }
}

struct NormalizedText {
    folded: String,
    tokens: Vec<String>,
}

impl NormalizedText {
    fn new(text: &str) -> Self {
        let folded = text.to_lowercase();
        let tokens = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        NormalizedText { folded, tokens }
    }
}

#[derive(Debug, Clone)]
pub struct ImpactClassifier {
    config: ClassifierConfig,
    categories: Vec<(String, Vec<Matcher>)>,
    low_impact: Vec<Matcher>,
    excitement: Vec<Matcher>,
}

impl ImpactClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, PosttraderError> {
        validate_classifier_config(&config)?;

        let categories = config
            .high_impact
            .iter()
            .map(|(label, kws)| (label.clone(), kws.iter().map(|k| Matcher::new(k)).collect()))
            .collect();
        let low_impact = config.low_impact.iter().map(|k| Matcher::new(k)).collect();
        let excitement = config
            .excitement_indicators
            .iter()
            .map(|k| Matcher::new(k))
            .collect();

        Ok(ImpactClassifier {
            config,
            categories,
            low_impact,
            excitement,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    pub fn qualifies(&self, score: u8) -> bool {
        score > self.config.threshold
    }

    /// Classify bare text, with no engagement bonus.
    pub fn classify(&self, text: &str) -> ImpactScore {
        self.score(text, None)
    }

    pub fn classify_post(&self, post: &Post) -> ImpactScore {
        self.score(&post.text, post.engagement)
    }

    fn score(&self, text: &str, engagement: Option<Engagement>) -> ImpactScore {
        let normalized = NormalizedText::new(text);

        let categories: Vec<String> = self
            .categories
            .iter()
            .filter(|(_, matchers)| matchers.iter().any(|m| m.matches(&normalized)))
            .map(|(label, _)| label.clone())
            .collect();

        let suppressed_by: Vec<String> = self
            .low_impact
            .iter()
            .filter(|m| m.matches(&normalized))
            .map(|m| m.to_string())
            .collect();

        let excitement_bonus = if self.excitement.iter().any(|m| m.matches(&normalized)) {
            self.config.excitement_bonus
        } else {
            0
        };

        let engagement_bonus = engagement
            .map(|e| self.engagement_bonus(&e))
            .unwrap_or(0);

        let raw = i64::from(self.config.category_score) * categories.len() as i64
            + i64::from(engagement_bonus)
            + i64::from(excitement_bonus)
            - i64::from(self.config.low_impact_penalty) * suppressed_by.len() as i64;
        let mut score = raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u8;

        if !suppressed_by.is_empty() {
            score = score.min(self.config.threshold.saturating_sub(1).max(MIN_SCORE));
        }

        ImpactScore {
            score,
            qualifies: self.qualifies(score),
            categories,
            suppressed_by,
            engagement_bonus,
            excitement_bonus,
            engagement,
        }
    }

    fn engagement_bonus(&self, engagement: &Engagement) -> u32 {
        let weighted = engagement
            .likes
            .saturating_add(engagement.retweets.saturating_mul(3));
        (weighted / self.config.engagement_weight).min(MAX_ENGAGEMENT_BONUS) as u32
    }
}

//! Social-media post representation and timestamp parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub quotes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub engagement: Option<Engagement>,
    /// Number of posts merged into this one; 1 for a standalone post.
    pub thread_count: usize,
}

impl Post {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Post {
            id: id.into(),
            timestamp,
            text: text.into(),
            engagement: None,
            thread_count: 1,
        }
    }

    pub fn with_engagement(mut self, engagement: Engagement) -> Self {
        self.engagement = Some(engagement);
        self
    }

    pub fn is_thread(&self) -> bool {
        self.thread_count > 1
    }
}

/// Parse a timestamp in any of the formats the exporters produce.
///
/// Accepted: RFC 3339 (`2024-08-10T10:30:00Z`), naive `YYYY-MM-DD HH:MM:SS`
/// or `YYYY-MM-DDTHH:MM:SS` (taken as UTC), the Twitter v1 format
/// (`Sat Aug 10 10:30:00 +0000 2024`) and integer epoch seconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(dt) = DateTime::parse_from_str(value, "%a %b %d %H:%M:%S %z %Y") {
        return Some(dt.with_timezone(&Utc));
    }

    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Stable chronological sort; posts sharing a timestamp keep their input order.
pub fn sort_chronologically(posts: &mut [Post]) {
    posts.sort_by_key(|p| p.timestamp);
}

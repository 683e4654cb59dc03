//! Built-in fixture posts, used when no live export is available.

use chrono::{TimeZone, Utc};

use crate::domain::error::PosttraderError;
use crate::domain::post::{Engagement, Post};
use crate::ports::post_port::PostPort;

#[derive(Debug, Default)]
pub struct SamplePostAdapter;

impl SamplePostAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn sample(id: &str, (d, h, m): (u32, u32, u32), text: &str, likes: u64, retweets: u64) -> Post {
    // Fixed calendar dates in August 2024; always valid.
    let timestamp = Utc
        .with_ymd_and_hms(2024, 8, d, h, m, 0)
        .single()
        .unwrap_or_default();
    Post::new(id, timestamp, text).with_engagement(Engagement {
        likes,
        retweets,
        ..Engagement::default()
    })
}

impl PostPort for SamplePostAdapter {
    fn fetch_posts(&self) -> Result<Vec<Post>, PosttraderError> {
        Ok(vec![
            sample(
                "1",
                (10, 10, 30),
                "🚀 Major partnership announcement with leading DeFi protocol! Mantle Network \
                 integration brings new opportunities for yield farming and liquidity provision. \
                 #MantleNetwork #DeFi",
                450,
                120,
            ),
            sample(
                "2",
                (10, 14, 15),
                "GM Mantle fam! 🌅 Another beautiful day in the ecosystem. Remember to check out \
                 our latest blog post!",
                85,
                12,
            ),
            sample(
                "3",
                (11, 9, 45),
                "🎉 MILESTONE ACHIEVED! Mantle Network surpasses $100M in TVL! Thank you to our \
                 amazing community. Major mainnet upgrade coming next week with enhanced security \
                 features.",
                890,
                234,
            ),
            sample(
                "4",
                (11, 16, 20),
                "Join us for an AMA session tomorrow at 3 PM UTC! We'll be discussing recent \
                 developments and answering your questions. 🤔",
                156,
                45,
            ),
            sample(
                "5",
                (12, 12, 0),
                "🔥 BREAKING: Mantle Token ($MNT) now listed on 3 major exchanges! Trading begins \
                 in 1 hour. This marks a significant milestone in our journey toward mass adoption.",
                1240,
                456,
            ),
        ])
    }

    fn name(&self) -> &str {
        "sample"
    }
}

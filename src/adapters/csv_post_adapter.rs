//! CSV post export adapter.
//!
//! Reads the exports produced by the social-media fetchers. Required columns
//! are `created_at` and `text`, plus `id` or `tweet_id`; engagement columns
//! (`like_count`, `retweet_count`, `reply_count`, `quote_count`) are optional.
//! Rows whose timestamp cannot be parsed are skipped with a warning.

use std::fs;
use std::path::PathBuf;

use csv::StringRecord;
use tracing::warn;

use crate::domain::error::PosttraderError;
use crate::domain::post::{parse_timestamp, sort_chronologically, Engagement, Post};
use crate::ports::post_port::PostPort;

pub struct CsvPostAdapter {
    path: PathBuf,
    label: String,
}

struct Columns {
    id: usize,
    created_at: usize,
    text: usize,
    likes: Option<usize>,
    retweets: Option<usize>,
    replies: Option<usize>,
    quotes: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |names: &[&str]| {
            names
                .iter()
                .find_map(|&n| find(n))
                .ok_or_else(|| format!("missing {} column", names.join("/")))
        };

        Ok(Columns {
            id: required(&["id", "tweet_id", "post_id"])?,
            created_at: required(&["created_at", "timestamp"])?,
            text: required(&["text", "content"])?,
            likes: find("like_count"),
            retweets: find("retweet_count"),
            replies: find("reply_count"),
            quotes: find("quote_count"),
        })
    }
}

fn count(record: &StringRecord, column: Option<usize>) -> u64 {
    column
        .and_then(|i| record.get(i))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

impl CsvPostAdapter {
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

impl PostPort for CsvPostAdapter {
    fn fetch_posts(&self) -> Result<Vec<Post>, PosttraderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.fetch_error(format!("failed to read {}: {}", self.path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| self.fetch_error(format!("CSV parse error: {}", e)))?
            .clone();
        let columns = Columns::from_headers(&headers).map_err(|e| self.fetch_error(e))?;

        let mut posts = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.fetch_error(format!("CSV parse error: {}", e)))?;

            let id = record.get(columns.id).unwrap_or_default().trim().to_string();
            let raw_ts = record.get(columns.created_at).unwrap_or_default();
            let Some(timestamp) = parse_timestamp(raw_ts) else {
                warn!(source = %self.label, row = line + 1, post_id = %id, value = raw_ts, "skipping post with unparsable timestamp");
                continue;
            };

            let engagement = if columns.likes.is_some() || columns.retweets.is_some() {
                Some(Engagement {
                    likes: count(&record, columns.likes),
                    retweets: count(&record, columns.retweets),
                    replies: count(&record, columns.replies),
                    quotes: count(&record, columns.quotes),
                })
            } else {
                None
            };

            posts.push(Post {
                id,
                timestamp,
                text: record.get(columns.text).unwrap_or_default().to_string(),
                engagement,
                thread_count: 1,
            });
        }

        sort_chronologically(&mut posts);
        Ok(posts)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_twitter_export() {
        let (_dir, path) = write_csv(
            "tweet_id,created_at,text,like_count,retweet_count,reply_count,quote_count,author_id\n\
             2,Sat Aug 10 14:15:00 +0000 2024,\"GM fam, reminder\",85,12,3,1,99\n\
             1,Sat Aug 10 10:30:00 +0000 2024,Major partnership!,450,120,,,99\n",
        );
        let posts = CsvPostAdapter::new(path).fetch_posts().unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "1");
        assert_eq!(
            posts[0].timestamp,
            Utc.with_ymd_and_hms(2024, 8, 10, 10, 30, 0).unwrap()
        );
        assert_eq!(posts[0].text, "Major partnership!");
        let e = posts[0].engagement.unwrap();
        assert_eq!((e.likes, e.retweets, e.replies, e.quotes), (450, 120, 0, 0));
        assert_eq!(posts[1].text, "GM fam, reminder");
    }

    #[test]
    fn reads_minimal_columns_without_engagement() {
        let (_dir, path) = write_csv("id,created_at,text\na,2024-08-10T10:00:00Z,launch\n");
        let posts = CsvPostAdapter::new(path).fetch_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].engagement.is_none());
    }

    #[test]
    fn skips_unparsable_timestamps() {
        let (_dir, path) = write_csv(
            "id,created_at,text\na,not-a-date,launch\nb,2024-08-10 10:00:00,launch\n",
        );
        let posts = CsvPostAdapter::new(path).fetch_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "b");
    }

    #[test]
    fn missing_text_column_is_fetch_error() {
        let (_dir, path) = write_csv("id,created_at\na,2024-08-10T10:00:00Z\n");
        let err = CsvPostAdapter::new(path).fetch_posts().unwrap_err();
        assert!(matches!(err, PosttraderError::Fetch { reason, .. } if reason.contains("text")));
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let err = CsvPostAdapter::new(PathBuf::from("/nonexistent/posts.csv"))
            .fetch_posts()
            .unwrap_err();
        assert!(matches!(err, PosttraderError::Fetch { .. }));
    }
}

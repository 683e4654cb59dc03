//! Domain error types.

use chrono::{DateTime, Utc};

/// Top-level error type for posttrader.
#[derive(Debug, thiserror::Error)]
pub enum PosttraderError {
    #[error("fetch error from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("timestamp {timestamp} outside price range")]
    OutOfRange { timestamp: DateTime<Utc> },

    #[error("invalid price {price} at {timestamp}")]
    InvalidPrice {
        timestamp: DateTime<Utc>,
        price: f64,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("position {id} for post {post_id} is already closed")]
    AlreadyClosed { id: u64, post_id: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PosttraderError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        PosttraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PosttraderError::ConfigParse { .. }
                | PosttraderError::ConfigMissing { .. }
                | PosttraderError::ConfigInvalid { .. }
        )
    }
}

impl From<&PosttraderError> for std::process::ExitCode {
    fn from(err: &PosttraderError) -> Self {
        let code: u8 = match err {
            PosttraderError::Io(_) | PosttraderError::Csv(_) => 1,
            PosttraderError::ConfigParse { .. }
            | PosttraderError::ConfigMissing { .. }
            | PosttraderError::ConfigInvalid { .. } => 2,
            PosttraderError::Fetch { .. } => 3,
            PosttraderError::OutOfRange { .. }
            | PosttraderError::InvalidPrice { .. }
            | PosttraderError::AlreadyClosed { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn config_invalid_display() {
        let err = PosttraderError::config_invalid("classifier", "threshold", "must be in [1, 10]");
        assert_eq!(
            err.to_string(),
            "invalid config value [classifier] threshold: must be in [1, 10]"
        );
        assert!(err.is_config());
    }

    #[test]
    fn out_of_range_is_not_config() {
        let err = PosttraderError::OutOfRange {
            timestamp: Utc.with_ymd_and_hms(2024, 8, 10, 10, 0, 0).unwrap(),
        };
        assert!(!err.is_config());
        assert!(err.to_string().contains("2024-08-10"));
    }
}

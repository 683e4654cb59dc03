//! Configuration validation.
//!
//! Two layers: `validate_config` checks the raw INI values (so a typo such as
//! `threshold = seven` fails instead of silently falling back to a default),
//! and the typed validators check the records the simulator is built from.

use std::collections::HashSet;

use crate::domain::classifier::{ClassifierConfig, MAX_SCORE, MIN_SCORE};
use crate::domain::error::PosttraderError;
use crate::domain::ledger::TradingParams;
use crate::ports::config_port::ConfigPort;

/// Longest accepted hold: one year.
pub const MAX_HOLD_DURATION_MINUTES: i64 = 525_600;
/// Upper bound for the sampling step and the thread window: one day.
pub const MAX_WINDOW_MINUTES: i64 = 1_440;

const NUMERIC_KEYS: &[(&str, &str)] = &[
    ("trading", "position_size_usdt"),
    ("trading", "hold_duration_minutes"),
    ("classifier", "threshold"),
    ("classifier", "category_score"),
    ("classifier", "low_impact_penalty"),
    ("classifier", "engagement_weight"),
    ("classifier", "excitement_bonus"),
    ("data", "sample_step_minutes"),
    ("data", "thread_window_minutes"),
];

const MINUTE_RANGES: &[(&str, &str, i64, i64)] = &[
    ("data", "sample_step_minutes", 1, MAX_WINDOW_MINUTES),
    ("data", "thread_window_minutes", 0, MAX_WINDOW_MINUTES),
];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PosttraderError> {
    for &(section, key) in NUMERIC_KEYS {
        validate_numeric(config, section, key)?;
    }
    for &(section, key, min, max) in MINUTE_RANGES {
        validate_minutes(config, section, key, min, max)?;
    }
    validate_keyword_sections(config)?;
    Ok(())
}

fn validate_numeric(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), PosttraderError> {
    match config.get_string(section, key) {
        Some(raw) if raw.trim().parse::<f64>().is_err() => Err(PosttraderError::config_invalid(
            section,
            key,
            format!("expected a number, got {:?}", raw.trim()),
        )),
        _ => Ok(()),
    }
}

fn validate_minutes(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
) -> Result<(), PosttraderError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(minutes) if (min..=max).contains(&minutes) => Ok(()),
        _ => Err(PosttraderError::config_invalid(
            section,
            key,
            format!("expected whole minutes in {min}..={max}, got {:?}", raw.trim()),
        )),
    }
}

fn validate_keyword_sections(config: &dyn ConfigPort) -> Result<(), PosttraderError> {
    for category in config.section_keys("keywords") {
        let list = config.get_list("keywords", &category);
        if list.is_empty() {
            return Err(PosttraderError::config_invalid(
                "keywords",
                &category,
                "category has no keywords",
            ));
        }
    }
    Ok(())
}

pub fn validate_trading_params(params: &TradingParams) -> Result<(), PosttraderError> {
    if !params.position_size_usdt.is_finite() || params.position_size_usdt <= 0.0 {
        return Err(PosttraderError::config_invalid(
            "trading",
            "position_size_usdt",
            "position_size_usdt must be positive",
        ));
    }
    if !(1..=MAX_HOLD_DURATION_MINUTES).contains(&params.hold_duration_minutes) {
        return Err(PosttraderError::config_invalid(
            "trading",
            "hold_duration_minutes",
            format!(
                "hold_duration_minutes must be between 1 and {}",
                MAX_HOLD_DURATION_MINUTES
            ),
        ));
    }
    Ok(())
}

pub fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), PosttraderError> {
    validate_threshold(config)?;
    validate_weights(config)?;
    validate_high_impact(config)?;
    validate_low_impact(config)?;
    Ok(())
}

fn validate_threshold(config: &ClassifierConfig) -> Result<(), PosttraderError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&config.threshold) {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "threshold",
            format!("threshold must be between {} and {}", MIN_SCORE, MAX_SCORE),
        ));
    }
    Ok(())
}

fn validate_weights(config: &ClassifierConfig) -> Result<(), PosttraderError> {
    if config.category_score < 1 || config.category_score > u32::from(MAX_SCORE) {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "category_score",
            format!("category_score must be between 1 and {}", MAX_SCORE),
        ));
    }
    if config.engagement_weight == 0 {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "engagement_weight",
            "engagement_weight must be at least 1",
        ));
    }
    if config.low_impact_penalty > u32::from(MAX_SCORE) {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "low_impact_penalty",
            format!("low_impact_penalty must not exceed {}", MAX_SCORE),
        ));
    }
    if config.excitement_bonus > u32::from(MAX_SCORE) {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "excitement_bonus",
            format!("excitement_bonus must not exceed {}", MAX_SCORE),
        ));
    }
    Ok(())
}

fn validate_high_impact(config: &ClassifierConfig) -> Result<(), PosttraderError> {
    if config.high_impact.is_empty() {
        return Err(PosttraderError::ConfigMissing {
            section: "keywords".to_string(),
            key: "<category>".to_string(),
        });
    }
    for (category, keywords) in &config.high_impact {
        if category.trim().is_empty() {
            return Err(PosttraderError::config_invalid(
                "keywords",
                category,
                "category label must not be blank",
            ));
        }
        if keywords.is_empty() || keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(PosttraderError::config_invalid(
                "keywords",
                category,
                "keywords must be non-empty",
            ));
        }
    }
    Ok(())
}

fn validate_low_impact(config: &ClassifierConfig) -> Result<(), PosttraderError> {
    if config.low_impact.iter().any(|k| k.trim().is_empty()) {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "low_impact_keywords",
            "keywords must be non-empty",
        ));
    }

    let high: HashSet<String> = config
        .high_impact
        .values()
        .flatten()
        .map(|k| k.trim().to_lowercase())
        .collect();
    if let Some(overlap) = config
        .low_impact
        .iter()
        .map(|k| k.trim().to_lowercase())
        .find(|k| high.contains(k))
    {
        return Err(PosttraderError::config_invalid(
            "classifier",
            "low_impact_keywords",
            format!("{:?} is also a high-impact keyword", overlap),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_ini_passes() {
        let config = make_config(
            r#"
[trading]
position_size_usdt = 1000
hold_duration_minutes = 30

[classifier]
threshold = 7
low_impact_keywords = gm, gn, ama

[keywords]
partnership = partnership, alliance
launch = mainnet, launch
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_numeric_threshold_fails() {
        let config = make_config("[classifier]\nthreshold = seven\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "threshold"));
    }

    #[test]
    fn non_numeric_hold_duration_fails() {
        let config = make_config("[trading]\nhold_duration_minutes = half an hour\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "hold_duration_minutes")
        );
    }

    #[test]
    fn empty_keyword_category_fails() {
        let config = make_config("[keywords]\nlaunch = , ,\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "launch"));
    }

    #[test]
    fn default_classifier_config_is_valid() {
        assert!(validate_classifier_config(&ClassifierConfig::default()).is_ok());
    }

    #[test]
    fn threshold_zero_fails() {
        let config = ClassifierConfig {
            threshold: 0,
            ..ClassifierConfig::default()
        };
        let err = validate_classifier_config(&config).unwrap_err();
        assert!(matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "threshold"));
    }

    #[test]
    fn threshold_bounds_pass() {
        for threshold in [1, 10] {
            let config = ClassifierConfig {
                threshold,
                ..ClassifierConfig::default()
            };
            assert!(validate_classifier_config(&config).is_ok());
        }
    }

    #[test]
    fn overlapping_keyword_sets_fail() {
        let mut config = ClassifierConfig::default();
        config.low_impact.push("Mainnet".into());
        let err = validate_classifier_config(&config).unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "low_impact_keywords")
        );
    }

    #[test]
    fn no_categories_fails() {
        let mut config = ClassifierConfig::default();
        config.high_impact.clear();
        let err = validate_classifier_config(&config).unwrap_err();
        assert!(matches!(err, PosttraderError::ConfigMissing { .. }));
    }

    #[test]
    fn zero_engagement_weight_fails() {
        let config = ClassifierConfig {
            engagement_weight: 0,
            ..ClassifierConfig::default()
        };
        let err = validate_classifier_config(&config).unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "engagement_weight")
        );
    }

    #[test]
    fn trading_params_must_be_positive() {
        let err = validate_trading_params(&TradingParams {
            position_size_usdt: -5.0,
            ..TradingParams::default()
        })
        .unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "position_size_usdt")
        );
        assert!(validate_trading_params(&TradingParams::default()).is_ok());
    }

    #[test]
    fn oversized_hold_duration_fails() {
        let err = validate_trading_params(&TradingParams {
            hold_duration_minutes: 9_000_000_000_000_000,
            ..TradingParams::default()
        })
        .unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "hold_duration_minutes")
        );
        assert!(
            validate_trading_params(&TradingParams {
                hold_duration_minutes: MAX_HOLD_DURATION_MINUTES,
                ..TradingParams::default()
            })
            .is_ok()
        );
    }

    #[test]
    fn sample_step_out_of_range_fails() {
        for step in ["0", "9000000000000000", "2.5"] {
            let config = make_config(&format!("[data]\nsample_step_minutes = {step}\n"));
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "sample_step_minutes"),
                "step {step} accepted"
            );
        }
    }

    #[test]
    fn thread_window_zero_disables_and_passes() {
        assert!(validate_config(&make_config("[data]\nthread_window_minutes = 0\n")).is_ok());
        let err = validate_config(&make_config("[data]\nthread_window_minutes = -1\n")).unwrap_err();
        assert!(
            matches!(err, PosttraderError::ConfigInvalid { key, .. } if key == "thread_window_minutes")
        );
    }
}

//! Event-driven trade simulator.
//!
//! Each post moves through pending -> qualified/rejected -> open ->
//! closed/abandoned. Posts are processed in timestamp order; before a post
//! is classified, every position whose hold has elapsed by the post's
//! timestamp is closed, so trades are finalized in real elapsed-time order.
//! Positions still open after the last post are closed by a final drain.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::classifier::{ClassifierConfig, ImpactClassifier, ImpactScore};
use super::config_validation::validate_trading_params;
use super::error::PosttraderError;
use super::ledger::{PositionLedger, TradingParams};
use super::oracle::PriceOracle;
use super::position::{ClosedTrade, ExitPricing, Position};
use super::post::Post;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationConfig {
    pub trading: TradingParams,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Score did not exceed the threshold.
    Rejected,
    /// Position opened and not yet closed. Never present in a finished run.
    Open { position_id: u64 },
    /// Index into [`SimulationRun::trades`].
    Closed { trade_index: usize },
    /// A required price could not be resolved.
    Abandoned { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub post_id: String,
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub score: ImpactScore,
    pub outcome: EventOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationRun {
    /// One record per input post, in chronological order.
    pub events: Vec<EventRecord>,
    /// Closed trades, in close order.
    pub trades: Vec<ClosedTrade>,
}

impl SimulationRun {
    pub fn trade_for(&self, event: &EventRecord) -> Option<&ClosedTrade> {
        match event.outcome {
            EventOutcome::Closed { trade_index } => self.trades.get(trade_index),
            _ => None,
        }
    }

    pub fn abandoned_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.outcome, EventOutcome::Abandoned { .. }))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct TradeSimulator {
    classifier: ImpactClassifier,
    trading: TradingParams,
}

impl TradeSimulator {
    /// Fails fast on invalid thresholds, keyword sets or trading parameters.
    pub fn new(config: SimulationConfig) -> Result<Self, PosttraderError> {
        validate_trading_params(&config.trading)?;
        Ok(TradeSimulator {
            classifier: ImpactClassifier::new(config.classifier)?,
            trading: config.trading,
        })
    }

    pub fn classifier(&self) -> &ImpactClassifier {
        &self.classifier
    }

    pub fn trading(&self) -> &TradingParams {
        &self.trading
    }

    pub fn run(&self, posts: &[Post], oracle: &PriceOracle) -> Result<SimulationRun, PosttraderError> {
        let mut ordered: Vec<&Post> = posts.iter().collect();
        ordered.sort_by_key(|p| p.timestamp);

        let mut ledger = PositionLedger::new(self.trading.clone())?;
        let mut run = SimulationRun::default();
        let mut event_by_position: HashMap<u64, usize> = HashMap::new();

        for post in ordered {
            for position in ledger.closable_positions(post.timestamp) {
                ledger.mark_closed(&position)?;
                finalize(&mut run, &event_by_position, position, oracle);
            }

            let score = self.classifier.classify_post(post);
            debug!(post_id = %post.id, score = score.score, qualifies = score.qualifies, "classified post");

            let outcome = if !score.qualifies {
                EventOutcome::Rejected
            } else {
                match oracle.price_at(post.timestamp) {
                    Ok(entry_price) => {
                        let position = ledger.open(post, &score, entry_price)?;
                        event_by_position.insert(position.id, run.events.len());
                        EventOutcome::Open {
                            position_id: position.id,
                        }
                    }
                    Err(e) => {
                        warn!(post_id = %post.id, error = %e, "abandoning event: no entry price");
                        EventOutcome::Abandoned {
                            reason: format!("entry price unavailable: {e}"),
                        }
                    }
                }
            };

            run.events.push(EventRecord {
                post_id: post.id.clone(),
                timestamp: post.timestamp,
                text: post.text.clone(),
                score,
                outcome,
            });
        }

        for position in ledger.drain_all() {
            finalize(&mut run, &event_by_position, position, oracle);
        }

        info!(
            posts = run.events.len(),
            trades = run.trades.len(),
            abandoned = run.abandoned_count(),
            "simulation complete"
        );
        Ok(run)
    }
}

/// Price the exit of `position` at its target close time.
///
/// Falls back to the latest sample at or before the target when the oracle
/// cannot bracket it.
pub fn exit_price(position: &Position, oracle: &PriceOracle) -> Option<(f64, ExitPricing)> {
    match oracle.price_at(position.target_close_time) {
        Ok(price) => Some((price, ExitPricing::Interpolated)),
        Err(_) => oracle
            .latest_at_or_before(position.target_close_time)
            .map(|p| (p.price, ExitPricing::LastKnown)),
    }
}

fn finalize(
    run: &mut SimulationRun,
    event_by_position: &HashMap<u64, usize>,
    position: Position,
    oracle: &PriceOracle,
) {
    let event_index = event_by_position.get(&position.id).copied();

    let outcome = match exit_price(&position, oracle) {
        Some((price, pricing)) => {
            if pricing == ExitPricing::LastKnown {
                warn!(
                    post_id = %position.post_id,
                    close_time = %position.target_close_time,
                    price,
                    "exit beyond price history, using last known price"
                );
            }
            run.trades.push(position.close(price, pricing));
            EventOutcome::Closed {
                trade_index: run.trades.len() - 1,
            }
        }
        None => {
            warn!(post_id = %position.post_id, "abandoning event: no exit price");
            EventOutcome::Abandoned {
                reason: "exit price unavailable".to_string(),
            }
        }
    };

    if let Some(event) = event_index.and_then(|i| run.events.get_mut(i)) {
        event.outcome = outcome;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::oracle::PricePoint;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 10, h, m, 0).unwrap()
    }

    fn simulator() -> TradeSimulator {
        TradeSimulator::new(SimulationConfig::default()).unwrap()
    }

    fn flat_oracle(from: DateTime<Utc>, minutes: i64, price: f64) -> PriceOracle {
        PriceOracle::new(
            (0..=minutes)
                .map(|m| PricePoint::new(from + Duration::minutes(m), price + m as f64 * 0.001))
                .collect(),
        )
        .unwrap()
    }

    const HOT: &str = "Huge partnership, mainnet launch and airdrop";

    #[test]
    fn rejected_post_opens_nothing() {
        let run = simulator()
            .run(&[Post::new("1", at(10, 0), "gm fam")], &flat_oracle(at(10, 0), 60, 1.0))
            .unwrap();
        assert_eq!(run.events.len(), 1);
        assert_eq!(run.events[0].outcome, EventOutcome::Rejected);
        assert!(run.trades.is_empty());
    }

    #[test]
    fn qualifying_post_closes_after_hold() {
        let run = simulator()
            .run(&[Post::new("1", at(10, 0), HOT)], &flat_oracle(at(10, 0), 60, 1.0))
            .unwrap();
        assert_eq!(run.trades.len(), 1);
        let trade = &run.trades[0];
        assert_relative_eq!(trade.entry_price, 1.0);
        assert_relative_eq!(trade.exit_price, 1.03, epsilon = 1e-12);
        assert_eq!(trade.close_time, at(10, 30));
        assert_eq!(trade.exit_pricing, ExitPricing::Interpolated);
        assert_eq!(run.trade_for(&run.events[0]), Some(trade));
    }

    #[test]
    fn entry_out_of_range_abandons_only_that_event() {
        let posts = vec![
            Post::new("early", at(9, 0), HOT),
            Post::new("ok", at(10, 0), HOT),
        ];
        let run = simulator().run(&posts, &flat_oracle(at(10, 0), 60, 1.0)).unwrap();
        assert!(matches!(run.events[0].outcome, EventOutcome::Abandoned { .. }));
        assert!(matches!(run.events[1].outcome, EventOutcome::Closed { .. }));
        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.abandoned_count(), 1);
    }

    #[test]
    fn drain_happens_before_next_open() {
        let posts = vec![
            Post::new("a", at(10, 0), HOT),
            Post::new("b", at(10, 40), HOT),
            Post::new("c", at(10, 45), HOT),
        ];
        let run = simulator().run(&posts, &flat_oracle(at(10, 0), 120, 1.0)).unwrap();
        let order: Vec<_> = run.trades.iter().map(|t| t.post_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(run
            .events
            .iter()
            .all(|e| matches!(e.outcome, EventOutcome::Closed { .. })));
    }

    #[test]
    fn unsorted_posts_are_processed_chronologically() {
        let posts = vec![
            Post::new("second", at(10, 10), HOT),
            Post::new("first", at(10, 0), HOT),
        ];
        let run = simulator().run(&posts, &flat_oracle(at(10, 0), 60, 1.0)).unwrap();
        assert_eq!(run.events[0].post_id, "first");
        assert_eq!(run.trades[0].post_id, "first");
        assert_eq!(run.trades[1].post_id, "second");
    }

    #[test]
    fn exit_price_falls_back_to_last_known() {
        let oracle = PriceOracle::new(vec![
            PricePoint::new(at(10, 0), 1.0),
            PricePoint::new(at(10, 10), 1.2),
        ])
        .unwrap();
        let run = simulator().run(&[Post::new("1", at(10, 0), HOT)], &oracle).unwrap();
        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.trades[0].exit_price, 1.2);
        assert_eq!(run.trades[0].exit_pricing, ExitPricing::LastKnown);
        assert_eq!(run.trades[0].close_time, at(10, 30));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = SimulationConfig {
            classifier: ClassifierConfig {
                threshold: 0,
                ..ClassifierConfig::default()
            },
            ..SimulationConfig::default()
        };
        assert!(TradeSimulator::new(config).unwrap_err().is_config());
    }

    #[test]
    fn empty_posts_empty_run() {
        let run = simulator().run(&[], &PriceOracle::default()).unwrap();
        assert!(run.events.is_empty());
        assert!(run.trades.is_empty());
    }
}

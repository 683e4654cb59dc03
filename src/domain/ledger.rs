//! Ledger of open positions, ordered by target close time.
//!
//! Positions are keyed by `(target_close_time, id)`, so due positions come
//! out of a range scan in close order without touching the ones still open.
//! There is no capacity limit: any number of positions may overlap.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::classifier::ImpactScore;
use super::config_validation::validate_trading_params;
use super::error::PosttraderError;
use super::position::Position;
use super::post::Post;

/// Sizing and holding rules applied to every position.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingParams {
    pub position_size_usdt: f64,
    pub hold_duration_minutes: i64,
}

impl TradingParams {
    pub fn hold_duration(&self) -> Result<Duration, PosttraderError> {
        Duration::try_minutes(self.hold_duration_minutes).ok_or_else(|| {
            PosttraderError::config_invalid(
                "trading",
                "hold_duration_minutes",
                format!("{} minutes is not a representable duration", self.hold_duration_minutes),
            )
        })
    }
}

impl Default for TradingParams {
    fn default() -> Self {
        TradingParams {
            position_size_usdt: 1000.0,
            hold_duration_minutes: 30,
        }
    }
}

type LedgerKey = (DateTime<Utc>, u64);

#[derive(Debug, Clone)]
pub struct PositionLedger {
    params: TradingParams,
    open: BTreeMap<LedgerKey, Position>,
    next_id: u64,
    closed_count: usize,
}

impl PositionLedger {
    pub fn new(params: TradingParams) -> Result<Self, PosttraderError> {
        validate_trading_params(&params)?;
        Ok(PositionLedger {
            params,
            open: BTreeMap::new(),
            next_id: 0,
            closed_count: 0,
        })
    }

    pub fn params(&self) -> &TradingParams {
        &self.params
    }

    /// Open a position for `post` at `entry_price`, timed from the post's timestamp.
    pub fn open(
        &mut self,
        post: &Post,
        score: &ImpactScore,
        entry_price: f64,
    ) -> Result<Position, PosttraderError> {
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Err(PosttraderError::InvalidPrice {
                timestamp: post.timestamp,
                price: entry_price,
            });
        }

        let target_close_time = post
            .timestamp
            .checked_add_signed(self.params.hold_duration()?)
            .ok_or(PosttraderError::OutOfRange {
                timestamp: post.timestamp,
            })?;

        let id = self.next_id;
        self.next_id += 1;

        let position = Position {
            id,
            post_id: post.id.clone(),
            score: score.score,
            open_time: post.timestamp,
            entry_price,
            size_usdt: self.params.position_size_usdt,
            qty: self.params.position_size_usdt / entry_price,
            target_close_time,
        };

        self.open
            .insert((position.target_close_time, id), position.clone());
        Ok(position)
    }

    /// Open positions with `target_close_time <= now`, in close order.
    pub fn closable_positions(&self, now: DateTime<Utc>) -> Vec<Position> {
        self.open
            .range(..=(now, u64::MAX))
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Remove `position` from the open set. Closing twice is an error.
    pub fn mark_closed(&mut self, position: &Position) -> Result<(), PosttraderError> {
        match self.open.remove(&(position.target_close_time, position.id)) {
            Some(_) => {
                self.closed_count += 1;
                Ok(())
            }
            None => Err(PosttraderError::AlreadyClosed {
                id: position.id,
                post_id: position.post_id.clone(),
            }),
        }
    }

    /// Remove and return every open position, in close order.
    pub fn drain_all(&mut self) -> Vec<Position> {
        let all = std::mem::take(&mut self.open);
        self.closed_count += all.len();
        all.into_values().collect()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed_count
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

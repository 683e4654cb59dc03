//! Trade summary statistics.

use super::position::ClosedTrade;
use super::simulator::{EventOutcome, EventRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub total_pnl: f64,
    pub avg_return_pct: f64,
    /// Fraction of trades with positive PnL, in [0, 1]. Zero when there are no trades.
    pub win_rate: f64,
    pub best_trade_pnl: f64,
    pub worst_trade_pnl: f64,
}

/// Reduce closed trades to summary statistics.
///
/// Sums run in chronological order (close time, then open time, then id)
/// regardless of input order, so repeated runs produce identical floats.
pub fn summarize(trades: &[ClosedTrade]) -> Summary {
    if trades.is_empty() {
        return Summary::default();
    }

    let mut ordered: Vec<&ClosedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| (t.close_time, t.open_time, t.id));

    let mut total_pnl = 0.0_f64;
    let mut total_return = 0.0_f64;
    let mut wins = 0usize;
    let mut best = f64::NEG_INFINITY;
    let mut worst = f64::INFINITY;

    for trade in &ordered {
        total_pnl += trade.pnl_usdt;
        total_return += trade.return_pct;
        if trade.is_win() {
            wins += 1;
        }
        best = best.max(trade.pnl_usdt);
        worst = worst.min(trade.pnl_usdt);
    }

    let n = ordered.len() as f64;
    Summary {
        total_trades: ordered.len(),
        total_pnl,
        avg_return_pct: total_return / n,
        win_rate: wins as f64 / n,
        best_trade_pnl: best,
        worst_trade_pnl: worst,
    }
}

/// Post-level statistics for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub total_posts: usize,
    pub qualified_posts: usize,
    pub abandoned_posts: usize,
    /// Percentage of posts that qualified, in [0, 100].
    pub qualification_rate: f64,
    pub average_score: f64,
}

impl RunStats {
    pub fn compute(events: &[EventRecord]) -> Self {
        let total_posts = events.len();
        if total_posts == 0 {
            return RunStats::default();
        }

        let qualified_posts = events.iter().filter(|e| e.score.qualifies).count();
        let abandoned_posts = events
            .iter()
            .filter(|e| matches!(e.outcome, EventOutcome::Abandoned { .. }))
            .count();
        let score_sum: u64 = events.iter().map(|e| u64::from(e.score.score)).sum();

        RunStats {
            total_posts,
            qualified_posts,
            abandoned_posts,
            qualification_rate: qualified_posts as f64 / total_posts as f64 * 100.0,
            average_score: score_sum as f64 / total_posts as f64,
        }
    }
}

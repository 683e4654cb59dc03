//! Open positions and closed trades.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Ledger-assigned sequence number, unique within a run.
    pub id: u64,
    pub post_id: String,
    pub score: u8,
    pub open_time: DateTime<Utc>,
    pub entry_price: f64,
    pub size_usdt: f64,
    pub qty: f64,
    pub target_close_time: DateTime<Utc>,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.qty * (price - self.entry_price)
    }

    /// Finalize this position at `exit_price`.
    pub fn close(self, exit_price: f64, pricing: ExitPricing) -> ClosedTrade {
        let pnl_usdt = self.unrealized_pnl(exit_price);
        let return_pct = pnl_usdt / self.size_usdt * 100.0;
        ClosedTrade {
            close_time: self.target_close_time,
            id: self.id,
            post_id: self.post_id,
            score: self.score,
            open_time: self.open_time,
            entry_price: self.entry_price,
            size_usdt: self.size_usdt,
            qty: self.qty,
            target_close_time: self.target_close_time,
            exit_price,
            pnl_usdt,
            return_pct,
            exit_pricing: pricing,
        }
    }
}

/// How the exit price of a trade was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPricing {
    /// Resolved by the oracle at the target close time.
    Interpolated,
    /// Target close time had no bracketing samples; the latest earlier sample was used.
    LastKnown,
}

impl ExitPricing {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitPricing::Interpolated => "interpolated",
            ExitPricing::LastKnown => "last_known",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub id: u64,
    pub post_id: String,
    pub score: u8,
    pub open_time: DateTime<Utc>,
    pub entry_price: f64,
    pub size_usdt: f64,
    pub qty: f64,
    pub target_close_time: DateTime<Utc>,
    pub exit_price: f64,
    pub close_time: DateTime<Utc>,
    pub pnl_usdt: f64,
    pub return_pct: f64,
    pub exit_pricing: ExitPricing,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl_usdt > 0.0
    }
}

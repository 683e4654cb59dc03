//! CSV report writers: one row per closed trade, and one row per evaluated post.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::error::PosttraderError;
use crate::domain::simulator::EventOutcome;
use crate::ports::report_port::{ReportContext, ReportPort};

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    id: u64,
    post_id: &'a str,
    score: u8,
    open_time: String,
    entry_price: f64,
    size_usdt: f64,
    qty: f64,
    target_close_time: String,
    exit_price: f64,
    close_time: String,
    pnl_usdt: f64,
    return_pct: f64,
    exit_pricing: &'static str,
}

#[derive(Debug, Serialize)]
struct EvaluationRow<'a> {
    timestamp: String,
    post_id: &'a str,
    content: &'a str,
    engagement_likes: u64,
    engagement_retweets: u64,
    evaluation_reasoning: String,
    impact_score: u8,
    trade_executed: bool,
    buy_price: Option<f64>,
    sell_price: Option<f64>,
    pnl: Option<f64>,
    outcome: String,
}

/// Writes the closed-trade log, in close order.
#[derive(Debug, Default)]
pub struct TradesCsvReport;

impl ReportPort for TradesCsvReport {
    fn write(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), PosttraderError> {
        let mut wtr = csv::Writer::from_path(output_path)?;
        for t in &ctx.run.trades {
            wtr.serialize(TradeRow {
                id: t.id,
                post_id: &t.post_id,
                score: t.score,
                open_time: iso(t.open_time),
                entry_price: t.entry_price,
                size_usdt: t.size_usdt,
                qty: t.qty,
                target_close_time: iso(t.target_close_time),
                exit_price: t.exit_price,
                close_time: iso(t.close_time),
                pnl_usdt: t.pnl_usdt,
                return_pct: t.return_pct,
                exit_pricing: t.exit_pricing.as_str(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Writes every evaluated post with its score breakdown and trade result.
#[derive(Debug, Default)]
pub struct EvaluationsCsvReport;

fn outcome_label(outcome: &EventOutcome) -> String {
    match outcome {
        EventOutcome::Rejected => "rejected".to_string(),
        EventOutcome::Open { .. } => "open".to_string(),
        EventOutcome::Closed { .. } => "closed".to_string(),
        EventOutcome::Abandoned { reason } => format!("abandoned: {reason}"),
    }
}

impl ReportPort for EvaluationsCsvReport {
    fn write(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), PosttraderError> {
        let mut wtr = csv::Writer::from_path(output_path)?;
        for event in &ctx.run.events {
            let engagement = event.score.engagement.unwrap_or_default();
            let trade = ctx.run.trade_for(event);
            wtr.serialize(EvaluationRow {
                timestamp: iso(event.timestamp),
                post_id: &event.post_id,
                content: &event.text,
                engagement_likes: engagement.likes,
                engagement_retweets: engagement.retweets,
                evaluation_reasoning: event.score.reasoning(),
                impact_score: event.score.score,
                trade_executed: trade.is_some(),
                buy_price: trade.map(|t| t.entry_price),
                sell_price: trade.map(|t| t.exit_price),
                pnl: trade.map(|t| t.pnl_usdt),
                outcome: outcome_label(&event.outcome),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

//! HTML table fragments for the report: run parameters, summary statistics,
//! trade log and per-post evaluation log.

use chrono::{DateTime, Utc};

use crate::domain::position::{ClosedTrade, ExitPricing};
use crate::domain::report::{RunStats, Summary};
use crate::domain::simulator::{EventOutcome, SimulationRun};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn fmt_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn pnl_class(pnl: f64) -> &'static str {
    if pnl > 0.0 {
        "pos"
    } else if pnl < 0.0 {
        "neg"
    } else {
        "flat"
    }
}

fn row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("<tr><th>{}</th><td>{}</td></tr>\n", label, value));
}

pub fn render_parameters(position_size_usdt: f64, hold_duration_minutes: i64, threshold: u8) -> String {
    let mut out = String::from("<table class=\"kv\">\n");
    row(&mut out, "Position Size", &format!("{:.2} USDT", position_size_usdt));
    row(&mut out, "Hold Duration", &format!("{} min", hold_duration_minutes));
    row(&mut out, "Score Threshold", &format!("&gt; {}", threshold));
    out.push_str("</table>\n");
    out
}

pub fn render_summary_table(summary: &Summary, stats: &RunStats) -> String {
    let mut out = String::from("<table class=\"kv\">\n");
    row(&mut out, "Posts Evaluated", &stats.total_posts.to_string());
    row(
        &mut out,
        "Qualified Posts",
        &format!("{} ({:.1}%)", stats.qualified_posts, stats.qualification_rate),
    );
    row(&mut out, "Average Score", &format!("{:.2}", stats.average_score));
    row(&mut out, "Abandoned", &stats.abandoned_posts.to_string());
    row(&mut out, "Total Trades", &summary.total_trades.to_string());
    row(
        &mut out,
        "Total PnL",
        &format!(
            "<span class=\"{}\">{:+.2} USDT</span>",
            pnl_class(summary.total_pnl),
            summary.total_pnl
        ),
    );
    row(&mut out, "Average Return", &format!("{:+.3}%", summary.avg_return_pct));
    row(&mut out, "Win Rate", &format!("{:.1}%", summary.win_rate * 100.0));
    if summary.total_trades > 0 {
        row(&mut out, "Best Trade", &format!("{:+.2} USDT", summary.best_trade_pnl));
        row(&mut out, "Worst Trade", &format!("{:+.2} USDT", summary.worst_trade_pnl));
    }
    out.push_str("</table>\n");
    out
}

pub fn render_trade_log(trades: &[ClosedTrade]) -> String {
    if trades.is_empty() {
        return "<p class=\"empty\">No trades executed.</p>\n".to_string();
    }

    let mut out = String::from("<table class=\"log\">\n<thead><tr>");
    for h in ["#", "Post", "Score", "Open", "Entry", "Close", "Exit", "Qty", "PnL", "Return"] {
        out.push_str(&format!("<th>{}</th>", h));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for (i, t) in trades.iter().enumerate() {
        let exit_note = if t.exit_pricing == ExitPricing::LastKnown {
            " <abbr title=\"last known price\">*</abbr>"
        } else {
            ""
        };
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.6}</td><td>{}</td><td>{:.6}{}</td><td>{:.2}</td><td class=\"{}\">{:+.2}</td><td>{:+.3}%</td></tr>\n",
            i + 1,
            escape(&t.post_id),
            t.score,
            fmt_time(t.open_time),
            t.entry_price,
            fmt_time(t.close_time),
            t.exit_price,
            exit_note,
            t.qty,
            pnl_class(t.pnl_usdt),
            t.pnl_usdt,
            t.return_pct,
        ));
    }

    out.push_str("</tbody>\n</table>\n");
    out
}

pub fn render_evaluation_log(run: &SimulationRun) -> String {
    if run.events.is_empty() {
        return "<p class=\"empty\">No posts evaluated.</p>\n".to_string();
    }

    let mut out = String::from(
        "<table class=\"log\">\n<thead><tr><th>Time</th><th>Post</th><th>Score</th><th>Outcome</th><th>Text</th><th>Reasoning</th></tr></thead>\n<tbody>\n",
    );
    for event in &run.events {
        let outcome = match (&event.outcome, run.trade_for(event)) {
            (_, Some(trade)) => format!(
                "<span class=\"{}\">traded {:+.2}</span>",
                pnl_class(trade.pnl_usdt),
                trade.pnl_usdt
            ),
            (EventOutcome::Abandoned { reason }, None) => {
                format!("abandoned ({})", escape(reason))
            }
            (EventOutcome::Open { .. }, None) => "open".to_string(),
            _ => "skipped".to_string(),
        };
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            fmt_time(event.timestamp),
            escape(&event.post_id),
            event.score.score,
            outcome,
            escape(&event.text),
            escape(&event.score.reasoning()),
        ));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

//! TradingView Pine Script v5 overlay marking each simulated entry and exit.
//!
//! Labels are placed with `xloc.bar_time` at millisecond UNIX timestamps, so
//! the script works on any chart timeframe.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::error::PosttraderError;
use crate::domain::position::ClosedTrade;
use crate::ports::report_port::{ReportContext, ReportPort};

fn pine_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn render(trades: &[ClosedTrade], hold_duration_minutes: i64, threshold: u8) -> String {
    let mut out = String::from("//@version=5\n");
    out.push_str("indicator(\"Post Impact Trades\", overlay=true, max_labels_count=500)\n");
    out.push_str(&format!(
        "// {} trades, score > {}, hold {} min\n",
        trades.len(),
        threshold,
        hold_duration_minutes
    ));

    if trades.is_empty() {
        out.push_str("// no trades to mark\n");
        return out;
    }

    out.push_str("if barstate.islast\n");
    for t in trades {
        let post = pine_string(&t.post_id);
        out.push_str(&format!(
            "    label.new({}, {:.6}, \"BUY #{} ({})\", xloc=xloc.bar_time, style=label.style_label_up, color=color.green, textcolor=color.white)\n",
            t.open_time.timestamp_millis(),
            t.entry_price,
            post,
            t.score,
        ));
        out.push_str(&format!(
            "    label.new({}, {:.6}, \"SELL #{} {:+.2}\", xloc=xloc.bar_time, style=label.style_label_down, color={}, textcolor=color.white)\n",
            t.close_time.timestamp_millis(),
            t.exit_price,
            post,
            t.pnl_usdt,
            if t.is_win() { "color.teal" } else { "color.red" },
        ));
    }
    out
}

#[derive(Debug, Default)]
pub struct PineScriptReport;

impl ReportPort for PineScriptReport {
    fn write(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), PosttraderError> {
        let script = render(&ctx.run.trades, ctx.hold_duration_minutes, ctx.threshold);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, script)?;
        info!(path = %output_path.display(), "wrote Pine Script markers");
        Ok(())
    }
}

//! Inline SVG charts for the HTML report.

use chrono::{DateTime, Utc};

use crate::domain::oracle::PricePoint;
use crate::domain::position::ClosedTrade;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 300.0;
const PADDING: f64 = 40.0;
const MARKER: f64 = 6.0;

/// Maps timestamps and values onto the plot area.
struct Frame {
    t0: DateTime<Utc>,
    span_ms: f64,
    min: f64,
    range: f64,
}

impl Frame {
    fn new(t0: DateTime<Utc>, t1: DateTime<Utc>, min: f64, max: f64) -> Self {
        Frame {
            t0,
            span_ms: (t1 - t0).num_milliseconds() as f64,
            min,
            range: max - min,
        }
    }

    fn x(&self, t: DateTime<Utc>) -> f64 {
        let plot_width = WIDTH - 2.0 * PADDING;
        if self.span_ms > 0.0 {
            PADDING + (t - self.t0).num_milliseconds() as f64 / self.span_ms * plot_width
        } else {
            PADDING + plot_width / 2.0
        }
    }

    fn y(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - 2.0 * PADDING;
        if self.range > 0.0 {
            HEIGHT - PADDING - (value - self.min) / self.range * plot_height
        } else {
            HEIGHT / 2.0
        }
    }
}

fn open_svg(out: &mut String, label: &str) {
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"100%\" role=\"img\" aria-label=\"{label}\">\n",
        w = WIDTH,
        h = HEIGHT,
    ));
    out.push_str(&format!(
        "<line x1=\"{p}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#999\"/>\n<line x1=\"{p}\" y1=\"{p}\" x2=\"{p}\" y2=\"{b}\" stroke=\"#999\"/>\n",
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING,
    ));
}

fn axis_labels(out: &mut String, frame: &Frame, max: f64, t1: DateTime<Utc>, decimals: usize) {
    out.push_str(&format!(
        "<text x=\"4\" y=\"{:.1}\" font-size=\"10\">{:.*}</text>\n<text x=\"4\" y=\"{:.1}\" font-size=\"10\">{:.*}</text>\n",
        frame.y(max) + 4.0,
        decimals,
        max,
        frame.y(frame.min) + 4.0,
        decimals,
        frame.min,
    ));
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\">{}</text>\n<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{}</text>\n",
        PADDING,
        HEIGHT - PADDING + 16.0,
        frame.t0.format("%Y-%m-%d %H:%M"),
        WIDTH - PADDING,
        HEIGHT - PADDING + 16.0,
        t1.format("%Y-%m-%d %H:%M"),
    ));
}

/// Price line with a green up-triangle at each entry and a red down-triangle
/// at each exit. Returns an empty string when there are no prices.
pub fn generate_price_svg(prices: &[PricePoint], trades: &[ClosedTrade]) -> String {
    let (Some(first), Some(last)) = (prices.first(), prices.last()) else {
        return String::new();
    };

    let t0 = trades.iter().map(|t| t.open_time).fold(first.timestamp, |a, b| a.min(b));
    let t1 = trades.iter().map(|t| t.close_time).fold(last.timestamp, |a, b| a.max(b));
    let values = prices
        .iter()
        .map(|p| p.price)
        .chain(trades.iter().flat_map(|t| [t.entry_price, t.exit_price]));
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let frame = Frame::new(t0, t1, min, max);

    let mut out = String::new();
    open_svg(&mut out, "Price with trade markers");

    let points: Vec<String> = prices
        .iter()
        .map(|p| format!("{:.1},{:.1}", frame.x(p.timestamp), frame.y(p.price)))
        .collect();
    out.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"steelblue\" stroke-width=\"1.5\" points=\"{}\"/>\n",
        points.join(" ")
    ));

    for trade in trades {
        let (bx, by) = (frame.x(trade.open_time), frame.y(trade.entry_price));
        out.push_str(&format!(
            "<polygon class=\"buy\" fill=\"green\" points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\"><title>BUY {} @ {:.6}</title></polygon>\n",
            bx,
            by - MARKER,
            bx - MARKER,
            by + MARKER,
            bx + MARKER,
            by + MARKER,
            trade.post_id,
            trade.entry_price,
        ));
        let (sx, sy) = (frame.x(trade.close_time), frame.y(trade.exit_price));
        out.push_str(&format!(
            "<polygon class=\"sell\" fill=\"red\" points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\"><title>SELL {} @ {:.6}</title></polygon>\n",
            sx,
            sy + MARKER,
            sx - MARKER,
            sy - MARKER,
            sx + MARKER,
            sy - MARKER,
            trade.post_id,
            trade.exit_price,
        ));
    }

    axis_labels(&mut out, &frame, max, t1, 4);
    out.push_str("</svg>\n");
    out
}

/// Step line of cumulative PnL over close times. Empty when there are no trades.
pub fn generate_pnl_svg(trades: &[ClosedTrade]) -> String {
    if trades.is_empty() {
        return String::new();
    }

    let mut ordered: Vec<&ClosedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| (t.close_time, t.open_time, t.id));

    let mut cumulative = Vec::with_capacity(ordered.len());
    let mut total = 0.0;
    for t in &ordered {
        total += t.pnl_usdt;
        cumulative.push((t.close_time, total));
    }

    let min = cumulative.iter().map(|&(_, v)| v).fold(0.0, f64::min);
    let max = cumulative.iter().map(|&(_, v)| v).fold(0.0, f64::max);
    let t0 = ordered[0].open_time;
    let t1 = cumulative[cumulative.len() - 1].0;
    let frame = Frame::new(t0, t1, min, max);

    let mut out = String::new();
    open_svg(&mut out, "Cumulative PnL");

    out.push_str(&format!(
        "<line x1=\"{p}\" y1=\"{z:.1}\" x2=\"{r}\" y2=\"{z:.1}\" stroke=\"#ccc\" stroke-dasharray=\"4\"/>\n",
        p = PADDING,
        r = WIDTH - PADDING,
        z = frame.y(0.0),
    ));

    let mut points = vec![format!("{:.1},{:.1}", frame.x(t0), frame.y(0.0))];
    let mut prev = 0.0;
    for &(t, v) in &cumulative {
        points.push(format!("{:.1},{:.1}", frame.x(t), frame.y(prev)));
        points.push(format!("{:.1},{:.1}", frame.x(t), frame.y(v)));
        prev = v;
    }
    let stroke = if total >= 0.0 { "green" } else { "red" };
    out.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
        stroke,
        points.join(" ")
    ));

    axis_labels(&mut out, &frame, max, t1, 2);
    out.push_str("</svg>\n");
    out
}

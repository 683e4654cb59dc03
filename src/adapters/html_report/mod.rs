//! Self-contained HTML report.
//!
//! Reads a template (the built-in default or a custom file), resolves every
//! `{{PLACEHOLDER}}` using the `tables` and `chart_svg` helpers, and writes
//! the final page with charts inlined as SVG.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::error::PosttraderError;
use crate::ports::report_port::{ReportContext, ReportPort};

const TITLE: &str = "Post Impact Trading Simulation";

fn period(ctx: &ReportContext) -> String {
    match (ctx.run.events.first(), ctx.run.events.last()) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            first.timestamp.format("%Y-%m-%d %H:%M UTC"),
            last.timestamp.format("%Y-%m-%d %H:%M UTC")
        ),
        _ => "no posts".to_string(),
    }
}

fn or_placeholder(svg: String, empty: &str) -> String {
    if svg.is_empty() {
        format!("<p class=\"empty\">{}</p>", empty)
    } else {
        svg
    }
}

/// Resolve all `{{PLACEHOLDER}}`s in `template` and return the final HTML.
pub fn resolve(template: &str, ctx: &ReportContext, generated_at: DateTime<Utc>) -> String {
    let mut output = template.to_string();

    output = output.replace("{{TITLE}}", TITLE);
    output = output.replace(
        "{{GENERATED_AT}}",
        &generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    output = output.replace("{{PERIOD}}", &period(ctx));

    let parameters = tables::render_parameters(
        ctx.position_size_usdt,
        ctx.hold_duration_minutes,
        ctx.threshold,
    );
    output = output.replace("{{PARAMETERS}}", &parameters);
    output = output.replace(
        "{{SUMMARY_TABLE}}",
        &tables::render_summary_table(ctx.summary, ctx.stats),
    );

    let price_chart = or_placeholder(
        chart_svg::generate_price_svg(ctx.prices, &ctx.run.trades),
        "No price data.",
    );
    output = output.replace("{{PRICE_CHART}}", &price_chart);

    let pnl_chart = or_placeholder(chart_svg::generate_pnl_svg(&ctx.run.trades), "No trades.");
    output = output.replace("{{PNL_CHART}}", &pnl_chart);

    output = output.replace("{{TRADE_LOG}}", &tables::render_trade_log(&ctx.run.trades));
    output = output.replace("{{EVALUATION_LOG}}", &tables::render_evaluation_log(ctx.run));

    output
}

#[derive(Debug, Default)]
pub struct HtmlReportAdapter {
    template_path: Option<PathBuf>,
}

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(path: PathBuf) -> Self {
        Self {
            template_path: Some(path),
        }
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), PosttraderError> {
        let template = match &self.template_path {
            Some(path) => fs::read_to_string(path)?,
            None => default_template::template().to_string(),
        };

        let html = resolve(&template, ctx, Utc::now());

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        info!(path = %output_path.display(), "wrote HTML report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{at, Fixture};
    use tempfile::TempDir;

    #[test]
    fn default_template_fully_resolved() {
        let fx = Fixture::new();
        let html = resolve(default_template::template(), &fx.ctx(), at(12, 0));
        assert!(!html.contains("{{"), "unresolved placeholder in output");
        assert!(html.contains("<title>Post Impact Trading Simulation</title>"));
        assert!(html.contains("Generated 2024-08-10 12:00:00 UTC"));
        assert!(html.contains("2024-08-10 10:00 UTC to 2024-08-10 10:10 UTC"));
        assert!(html.contains("<svg"));
        assert!(html.contains("1000.00 USDT"));
    }

    #[test]
    fn custom_template_only_some_placeholders() {
        let fx = Fixture::new();
        let html = resolve("<h1>{{TITLE}}</h1>{{SUMMARY_TABLE}}", &fx.ctx(), at(12, 0));
        assert!(html.starts_with("<h1>Post Impact"));
        assert!(html.contains("Total Trades"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let fx = Fixture::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.html");
        HtmlReportAdapter::new().write(&fx.ctx(), &path).unwrap();
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn custom_template_file() {
        let fx = Fixture::new();
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("t.html");
        fs::write(&template, "trades: {{TRADE_LOG}}").unwrap();
        let out = dir.path().join("report.html");
        HtmlReportAdapter::with_template(template)
            .write(&fx.ctx(), &out)
            .unwrap();
        assert!(fs::read_to_string(&out).unwrap().starts_with("trades: <table"));
    }

    #[test]
    fn missing_template_file_is_io_error() {
        let fx = Fixture::new();
        let dir = TempDir::new().unwrap();
        let err = HtmlReportAdapter::with_template(dir.path().join("missing.html"))
            .write(&fx.ctx(), &dir.path().join("r.html"))
            .unwrap_err();
        assert!(matches!(err, PosttraderError::Io(_)));
    }
}

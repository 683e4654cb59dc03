//! Built-in HTML report template with `{{PLACEHOLDER}}` markers.

pub const PLACEHOLDERS: &[&str] = &[
    "{{TITLE}}",
    "{{GENERATED_AT}}",
    "{{PERIOD}}",
    "{{PARAMETERS}}",
    "{{SUMMARY_TABLE}}",
    "{{PRICE_CHART}}",
    "{{PNL_CHART}}",
    "{{TRADE_LOG}}",
    "{{EVALUATION_LOG}}",
];

pub fn template() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem auto; max-width: 1100px; color: #222; }
h1 { margin-bottom: 0.2rem; }
.meta { color: #666; margin-top: 0; }
section { margin-top: 2rem; }
table { border-collapse: collapse; }
table.kv th { text-align: left; padding: 0.2rem 1rem 0.2rem 0; font-weight: 600; }
table.log { width: 100%; font-size: 0.85rem; }
table.log th, table.log td { border-bottom: 1px solid #eee; padding: 0.3rem 0.5rem; text-align: left; vertical-align: top; }
.pos { color: #1a7f37; }
.neg { color: #cf222e; }
.flat { color: #666; }
.empty { color: #666; font-style: italic; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; }
</style>
</head>
<body>
<h1>{{TITLE}}</h1>
<p class="meta">Generated {{GENERATED_AT}} &middot; {{PERIOD}}</p>

<div class="grid">
<section>
<h2>Parameters</h2>
{{PARAMETERS}}
</section>
<section>
<h2>Summary</h2>
{{SUMMARY_TABLE}}
</section>
</div>

<section>
<h2>Price &amp; Trades</h2>
{{PRICE_CHART}}
</section>

<section>
<h2>Cumulative PnL</h2>
{{PNL_CHART}}
</section>

<section>
<h2>Trade Log</h2>
{{TRADE_LOG}}
</section>

<section>
<h2>Post Evaluations</h2>
{{EVALUATION_LOG}}
</section>
</body>
</html>
"#
}

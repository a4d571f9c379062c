//! Printable HTML report of the current dashboard view.
//!
//! One self-contained document built with `format!`: KPI cards, the
//! active filter line, segment and region tables, the insight panel,
//! and a region revenue chart. Model-sourced text is escaped before
//! it reaches the markup.

use crate::{
    error::DashResult,
    state::{DashboardState, DerivedView},
    summary::InsightReport,
};
use chrono::{DateTime, Utc};
use std::path::Path;

pub fn render_report(
    state: &DashboardState,
    view: &DerivedView,
    insights: &InsightReport,
    generated_at: DateTime<Utc>,
) -> String {
    let m = &view.metrics;
    let session_id = html_escape(&state.session_id);
    let segment_filter = state.segment_filter.label();
    let region_filter = state.region_filter.label();
    let timestamp = generated_at.format("%Y-%m-%d %H:%M:%S UTC");

    let segment_section = if m.is_empty() {
        "<p class=\"empty-note\">No records match the current view.</p>".to_string()
    } else {
        format!(
            "<table>\n<tr><th>Segment</th><th>Records</th><th>Total Balance</th>\
             <th>Avg Risk</th><th>Default Rate</th><th>Revenue</th></tr>\n{}\n</table>",
            segment_rows(view)
        )
    };

    let region_section = if m.is_empty() {
        "<p class=\"empty-note\">No records match the current view.</p>".to_string()
    } else {
        format!(
            "<table>\n<tr><th>Region</th><th>Records</th><th>Total Balance</th>\
             <th>Revenue</th><th>Avg Risk</th></tr>\n{}\n</table>",
            region_rows(view)
        )
    };

    let insight_items: String = insights
        .insights
        .iter()
        .map(|i| format!(" <li>{}</li>", html_escape(i)))
        .collect::<Vec<_>>()
        .join("\n");

    let region_labels = js_array_str(view.regions.iter().map(|r| r.region.label()));
    let region_revenue = js_array_u64(view.regions.iter().map(|r| r.total_revenue));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Portfolio Report — {session_id}</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<style>
*{{margin:0;padding:0;box-sizing:border-box}}
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#f5f5f5;color:#333}}
header{{background:#1a1a2e;color:#fff;padding:24px 32px;display:flex;align-items:center;gap:20px}}
header h1{{font-size:1.4em;font-weight:500}}
header h2{{font-size:1.1em;font-weight:300;opacity:0.8}}
.badge{{padding:6px 16px;border-radius:4px;font-weight:700;font-size:0.9em;letter-spacing:0.5px}}
.badge.model{{background:#34a853;color:#fff}}
.badge.fallback{{background:#ea8c00;color:#fff}}
main{{max-width:1100px;margin:0 auto;padding:24px}}
section{{background:#fff;border-radius:8px;box-shadow:0 1px 3px rgba(0,0,0,0.1);padding:24px;margin-bottom:20px}}
section h3{{font-size:1.1em;margin-bottom:16px;color:#1a1a2e;border-bottom:2px solid #e0e0e0;padding-bottom:8px}}
.filters{{color:#666;font-size:0.9em;margin-bottom:20px}}
.metrics-grid{{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:12px}}
.metric{{background:#f8f9fa;border-radius:6px;padding:12px;text-align:center}}
.metric .label{{display:block;font-size:0.75em;color:#666;text-transform:uppercase;letter-spacing:0.5px}}
.metric .value{{display:block;font-size:1.3em;font-weight:600;margin-top:4px}}
table{{width:100%;border-collapse:collapse;font-size:0.9em}}
th,td{{padding:8px 12px;text-align:left;border-bottom:1px solid #e0e0e0}}
th{{background:#f8f9fa;font-weight:600}}
.empty-note{{color:#999;font-style:italic}}
.chart-box{{background:#fff;border-radius:8px;box-shadow:0 1px 3px rgba(0,0,0,0.1);padding:16px;margin-bottom:20px}}
.chart-box h4{{font-size:0.95em;margin-bottom:8px;color:#555}}
canvas{{width:100%!important;height:260px!important}}
.recommendation{{background:#f8f9fa;border-left:4px solid #1a1a2e;padding:12px 16px;margin-top:16px}}
footer{{text-align:center;padding:16px;color:#999;font-size:0.8em}}
@media print{{
body{{background:#fff}}
section{{box-shadow:none;border:1px solid #ddd;page-break-inside:avoid}}
.chart-box{{display:none}}
footer{{display:none}}
}}
</style>
</head>
<body>
<header>
 <div>
  <h1>Portfolio Analytics Report</h1>
  <h2>Session {session_id}</h2>
 </div>
 <span class="badge {source_class}">{source_label}</span>
</header>
<main>

<p class="filters">Filters — Segment: {segment_filter} · Region: {region_filter} · Refreshes: {refresh_count}</p>

<section>
<h3>Executive Summary</h3>
<div class="metrics-grid">
 <div class="metric"><span class="label">Records</span><span class="value">{record_count}</span></div>
 <div class="metric"><span class="label">Total Balance</span><span class="value">{total_balance}</span></div>
 <div class="metric"><span class="label">Total Revenue</span><span class="value">{total_revenue}</span></div>
 <div class="metric"><span class="label">Avg Balance</span><span class="value">{avg_balance:.0}</span></div>
 <div class="metric"><span class="label">Avg Risk Score</span><span class="value">{avg_risk:.3}</span></div>
 <div class="metric"><span class="label">Avg Utilization</span><span class="value">{avg_utilization:.2}</span></div>
 <div class="metric"><span class="label">Default Rate</span><span class="value">{default_rate:.2}%</span></div>
 <div class="metric"><span class="label">High Risk</span><span class="value">{high_risk_count}</span></div>
</div>
</section>

<section>
<h3>Segments</h3>
{segment_section}
</section>

<section>
<h3>Regions by Revenue</h3>
{region_section}
</section>

<div class="chart-box"><h4>Region Revenue</h4><canvas id="regionChart"></canvas></div>

<section>
<h3>Insights <span style="font-weight:400;color:#999;font-size:0.8em">(source: {source_label})</span></h3>
<ul style="margin-left:20px;line-height:1.7">
{insight_items}
</ul>
<div class="recommendation"><strong>Recommendation:</strong> {recommendation}</div>
</section>

</main>
<footer>Generated {timestamp} · session {session_id}</footer>
<script>
new Chart(document.getElementById('regionChart'),{{
 type:'bar',
 data:{{labels:{region_labels},datasets:[{{label:'Annual Revenue',data:{region_revenue},backgroundColor:'#1a1a2e'}}]}},
 options:{{responsive:true,plugins:{{legend:{{display:false}}}}}}
}});
</script>
</body>
</html>
"#,
        source_class = match insights.source {
            crate::summary::InsightSource::Model => "model",
            crate::summary::InsightSource::Fallback => "fallback",
        },
        source_label = insights.source.label(),
        refresh_count = state.refresh_count,
        record_count = m.record_count,
        total_balance = fmt_thousands(m.total_balance),
        total_revenue = fmt_thousands(m.total_revenue),
        avg_balance = m.avg_balance,
        avg_risk = m.avg_risk_score,
        avg_utilization = m.avg_utilization,
        default_rate = m.default_rate,
        high_risk_count = m.high_risk_count,
        recommendation = html_escape(&insights.recommendation),
    )
}

fn segment_rows(view: &DerivedView) -> String {
    view.segments
        .iter()
        .map(|s| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td>{:.2}%</td><td>{}</td></tr>",
                s.segment,
                s.metrics.record_count,
                fmt_thousands(s.metrics.total_balance),
                s.metrics.avg_risk_score,
                s.metrics.default_rate,
                fmt_thousands(s.metrics.total_revenue),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn region_rows(view: &DerivedView) -> String {
    view.regions
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td></tr>",
                r.region,
                r.record_count,
                fmt_thousands(r.total_balance),
                fmt_thousands(r.total_revenue),
                r.avg_risk_score,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn js_array_str<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(","))
}

fn js_array_u64(items: impl Iterator<Item = u64>) -> String {
    let rendered: Vec<String> = items.map(|v| v.to_string()).collect();
    format!("[{}]", rendered.join(","))
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn save_report(html: &str, path: &Path) -> DashResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separation() {
        assert_eq!(fmt_thousands(0), "0");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(1_000), "1,000");
        assert_eq!(fmt_thousands(125_000), "125,000");
        assert_eq!(fmt_thousands(5_000_000), "5,000,000");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            html_escape("<b>bold</b> & \"quoted\""),
            "&lt;b&gt;bold&lt;/b&gt; &amp; &quot;quoted&quot;"
        );
    }
}

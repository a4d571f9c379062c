//! dash-runner: headless session driver for the portfolio dashboard.
//!
//! Usage:
//!   dash-runner --seed 12345 --count 200 --out report.html
//!   dash-runner --seed 12345 --segment affluent --region emea --summarize
//!   dash-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use foliodash_core::{
    aggregate::{AggregateMetrics, RegionFilter, RegionSummary, SegmentFilter, SegmentSummary},
    report::save_report,
    session::DashboardSession,
    summary::{InsightReport, SummaryConfig},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Refresh {
        count: usize,
    },
    SetFilter {
        segment: Option<String>,
        region: Option<String>,
    },
    Summarize,
    Export {
        path: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    session_id: String,
    refresh_count: u64,
    record_count: usize,
    segment_filter: String,
    region_filter: String,
    summary_phase: String,
    metrics: AggregateMetrics,
    segments: Vec<SegmentSummary>,
    regions: Vec<RegionSummary>,
    insights: InsightReport,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let count = parse_arg(&args, "--count", 200usize);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let summarize = args.iter().any(|a| a == "--summarize");
    let out = args
        .windows(2)
        .find(|w| w[0] == "--out")
        .map(|w| w[1].as_str())
        .unwrap_or("report.html");
    let segment = args
        .windows(2)
        .find(|w| w[0] == "--segment")
        .map(|w| w[1].as_str())
        .unwrap_or("all");
    let region = args
        .windows(2)
        .find(|w| w[0] == "--region")
        .map(|w| w[1].as_str())
        .unwrap_or("all");

    if !ipc_mode {
        println!("foliodash dash-runner");
        println!("  seed:     {seed}");
        println!("  count:    {count}");
        println!("  segment:  {segment}");
        println!("  region:   {region}");
        println!("  out:      {out}");
        println!();
    }

    let mut session = DashboardSession::new(seed, summary_config_from_env());
    session.refresh(count);

    let segment_filter = segment
        .parse::<SegmentFilter>()
        .map_err(anyhow::Error::msg)?;
    let region_filter = region.parse::<RegionFilter>().map_err(anyhow::Error::msg)?;
    session.set_segment_filter(segment_filter);
    session.set_region_filter(region_filter);

    if ipc_mode {
        run_ipc_loop(&mut session, io::stdin().lock(), &mut io::stdout())?;
    } else {
        if summarize {
            match session.request_summary() {
                Ok(phase) => log::info!("summary finished in phase '{}'", phase.name()),
                Err(e) => log::warn!("summary skipped, using local fallback: {e}"),
            }
        }

        print_summary(&session);

        let html = session.render_report();
        save_report(&html, Path::new(out)).with_context(|| format!("writing report to {out}"))?;
        println!();
        println!("Report written to {out}");
    }

    Ok(())
}

/// Core never reads the environment; credentials and overrides are
/// assembled here and handed in.
fn summary_config_from_env() -> SummaryConfig {
    let mut config = SummaryConfig::default();
    if let Ok(key) = env::var("FOLIODASH_API_KEY") {
        if !key.is_empty() {
            config.api_key = Some(key);
        }
    }
    if let Ok(endpoint) = env::var("FOLIODASH_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(model) = env::var("FOLIODASH_MODEL") {
        config.model = model;
    }
    config
}

fn run_ipc_loop<R: BufRead, W: Write>(
    session: &mut DashboardSession,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = input.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(out, "{}", err_json)?;
                out.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Refresh { count } => session.refresh(count),
            IpcCommand::SetFilter { segment, region } => {
                if let Some(s) = segment {
                    match s.parse() {
                        Ok(f) => session.set_segment_filter(f),
                        Err(e) => log::warn!("ignoring segment filter: {e}"),
                    }
                }
                if let Some(r) = region {
                    match r.parse() {
                        Ok(f) => session.set_region_filter(f),
                        Err(e) => log::warn!("ignoring region filter: {e}"),
                    }
                }
            }
            IpcCommand::Summarize => {
                if let Err(e) = session.request_summary() {
                    log::warn!("summary unavailable, staying on fallback: {e}");
                }
            }
            IpcCommand::Export { path } => {
                // An unwritable path is reported on the wire, never fatal.
                let html = session.render_report();
                if let Err(e) = save_report(&html, Path::new(&path)) {
                    log::warn!("export to {path} failed: {e}");
                    let err_json = serde_json::json!({ "error": e.to_string() });
                    writeln!(out, "{}", err_json)?;
                }
            }
        }

        let state = build_ui_state(session);
        writeln!(out, "{}", serde_json::to_string(&state)?)?;
        out.flush()?;
    }
    Ok(())
}

fn build_ui_state(session: &DashboardSession) -> UiState {
    let state = session.state();
    let view = session.derived();
    let insights = session.insights_for(&view.metrics);

    UiState {
        session_id: state.session_id.clone(),
        refresh_count: state.refresh_count,
        record_count: state.records.len(),
        segment_filter: state.segment_filter.label(),
        region_filter: state.region_filter.label(),
        summary_phase: state.summary_phase.name().to_string(),
        metrics: view.metrics,
        segments: view.segments,
        regions: view.regions,
        insights,
    }
}

fn print_summary(session: &DashboardSession) {
    let state = session.state();
    let view = session.derived();
    let insights = session.insights_for(&view.metrics);
    let m = &view.metrics;

    println!("=== PORTFOLIO SUMMARY ===");
    println!("  session:        {}", state.session_id);
    println!(
        "  filters:        segment={} region={}",
        state.segment_filter.label(),
        state.region_filter.label()
    );
    println!("  records:        {}", m.record_count);
    println!("  total balance:  {}", m.total_balance);
    println!("  total revenue:  {}", m.total_revenue);
    println!("  avg risk:       {:.3}", m.avg_risk_score);
    println!("  avg util:       {:.2}", m.avg_utilization);
    println!("  default rate:   {:.2}%", m.default_rate);
    println!("  high risk:      {}", m.high_risk_count);

    println!();
    println!("=== SEGMENTS ===");
    if view.segments.is_empty() {
        println!("  (no records in view)");
    } else {
        for s in &view.segments {
            println!(
                "  {:<15} | {:>5} records | avg risk {:.3} | revenue {}",
                s.segment.label(),
                s.metrics.record_count,
                s.metrics.avg_risk_score,
                s.metrics.total_revenue
            );
        }
    }

    println!();
    println!("=== REGIONS BY REVENUE ===");
    if view.regions.is_empty() {
        println!("  (no records in view)");
    } else {
        for r in &view.regions {
            println!(
                "  {:<15} | {:>5} records | avg risk {:.3} | revenue {}",
                r.region.label(),
                r.record_count,
                r.avg_risk_score,
                r.total_revenue
            );
        }
    }

    println!();
    println!("=== INSIGHTS ({}) ===", insights.source.label());
    for insight in &insights.insights {
        println!("  - {insight}");
    }
    println!("  => {}", insights.recommendation);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

//! The dashboard session owns the snapshot and drives it.
//!
//! RULES:
//!   - The snapshot changes only through `reduce`; the session never
//!     mutates state fields directly.
//!   - All randomness flows through the RngBank, one stream per
//!     refresh.
//!   - The summary client is called here and nowhere else, and its
//!     outcome re-enters the state as an event like everything else.

use crate::{
    aggregate::{AggregateMetrics, RegionFilter, SegmentFilter},
    error::{DashError, DashResult},
    generator::generate_portfolio,
    report,
    rng::RngBank,
    state::{reduce, DashboardEvent, DashboardState, DerivedView, SummaryOutcome, SummaryPhase},
    summary::{InsightReport, SummaryClient, SummaryConfig},
};
use chrono::Utc;

pub struct DashboardSession {
    state:    DashboardState,
    rng_bank: RngBank,
    summary:  SummaryClient,
}

impl DashboardSession {
    pub fn new(seed: u64, summary_config: SummaryConfig) -> Self {
        let session_id = format!("s-{seed:016x}");
        log::info!("session={session_id} opened (seed {seed})");
        Self {
            state:    DashboardState::new(session_id),
            rng_bank: RngBank::new(seed),
            summary:  SummaryClient::new(summary_config),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn master_seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    /// Recompute the filtered metrics and groupings for the snapshot.
    pub fn derived(&self) -> DerivedView {
        self.state.derived()
    }

    fn apply(&mut self, event: DashboardEvent) {
        self.state = reduce(self.state.clone(), event);
    }

    /// Generate a fresh portfolio and swap it into the snapshot. The
    /// refresh ordinal picks the RNG stream, so replaying a session
    /// seed reproduces every portfolio in order.
    pub fn refresh(&mut self, count: usize) {
        let mut rng = self.rng_bank.for_refresh(self.state.refresh_count);
        let records = generate_portfolio(count, &mut rng);
        self.apply(DashboardEvent::PortfolioRefreshed { records });
    }

    pub fn set_segment_filter(&mut self, filter: SegmentFilter) {
        self.apply(DashboardEvent::SegmentFilterSet { filter });
    }

    pub fn set_region_filter(&mut self, filter: RegionFilter) {
        self.apply(DashboardEvent::RegionFilterSet { filter });
    }

    /// Dispatch one summary request for the current view.
    ///
    /// Fails fast with `CredentialMissing` before any state transition
    /// when no key is configured; the caller falls back locally and
    /// the phase stays where it was. Transport and parse failures are
    /// recovered into the `Failed` phase instead of surfacing.
    pub fn request_summary(&mut self) -> DashResult<&SummaryPhase> {
        if !self.summary.has_credentials() {
            return Err(DashError::CredentialMissing);
        }
        if self.state.summary_phase.is_pending() {
            log::warn!(
                "session={} summary request ignored: one already in flight",
                self.state.session_id
            );
            return Ok(&self.state.summary_phase);
        }

        let view = self.derived();
        self.apply(DashboardEvent::SummaryRequested);
        let generation = self.state.summary_generation;

        let outcome = match self.summary.fetch_insights(&view.metrics, &view.segments) {
            Ok(report) => SummaryOutcome::Delivered { report },
            Err(e) => {
                log::warn!(
                    "session={} summary generation {generation} failed, falling back: {e}",
                    self.state.session_id
                );
                SummaryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        self.apply(DashboardEvent::SummaryResolved {
            generation,
            outcome,
        });
        log::info!(
            "session={} summary generation {generation} -> {}",
            self.state.session_id,
            self.state.summary_phase.name()
        );
        Ok(&self.state.summary_phase)
    }

    /// The insight panel contents for the given metrics: the delivered
    /// report when one is on screen, the local fallback otherwise.
    pub fn insights_for(&self, metrics: &AggregateMetrics) -> InsightReport {
        match &self.state.summary_phase {
            SummaryPhase::Succeeded { report, .. } => report.clone(),
            _ => InsightReport::fallback(metrics),
        }
    }

    pub fn render_report(&self) -> String {
        let view = self.derived();
        let insights = self.insights_for(&view.metrics);
        report::render_report(&self.state, &view, &insights, Utc::now())
    }
}

//! Dashboard state: one immutable snapshot advanced by a pure reducer.
//!
//! RULE: `reduce` is the only way state changes. It reads no clock,
//! calls no RNG, and touches no I/O; everything it needs arrives on
//! the event. Replaying the same events over the same initial
//! snapshot always lands on the same state.

use crate::{
    aggregate::{
        compute_metrics, filter_records, summarize_regions, summarize_segments, AggregateMetrics,
        RegionFilter, RegionSummary, SegmentFilter, SegmentSummary,
    },
    generator::PortfolioRecord,
    summary::InsightReport,
    types::{Generation, SessionId},
};
use serde::{Deserialize, Serialize};

/// Everything the dashboard knows at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub session_id: SessionId,
    /// Number of refreshes applied so far; also the ordinal of the
    /// next refresh.
    pub refresh_count: u64,
    pub records: Vec<PortfolioRecord>,
    pub segment_filter: SegmentFilter,
    pub region_filter: RegionFilter,
    pub summary_phase: SummaryPhase,
    /// Stamp of the most recently issued summary request.
    pub summary_generation: Generation,
}

/// Where the one allowed summary request currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SummaryPhase {
    Idle,
    Pending {
        generation: Generation,
    },
    Succeeded {
        generation: Generation,
        report: InsightReport,
    },
    Failed {
        generation: Generation,
        error: String,
    },
}

impl SummaryPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// How a dispatched summary request ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Delivered { report: InsightReport },
    Failed { error: String },
}

/// Every event the reducer understands.
/// Variants are never removed or reordered; only appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    PortfolioRefreshed {
        records: Vec<PortfolioRecord>,
    },
    SegmentFilterSet {
        filter: SegmentFilter,
    },
    RegionFilterSet {
        filter: RegionFilter,
    },
    SummaryRequested,
    SummaryResolved {
        generation: Generation,
        outcome: SummaryOutcome,
    },
}

/// View computed from a snapshot on demand, never stored on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedView {
    pub metrics: AggregateMetrics,
    pub segments: Vec<SegmentSummary>,
    pub regions: Vec<RegionSummary>,
}

impl DashboardState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            refresh_count: 0,
            records: Vec::new(),
            segment_filter: SegmentFilter::All,
            region_filter: RegionFilter::All,
            summary_phase: SummaryPhase::Idle,
            summary_generation: 0,
        }
    }

    /// Records admitted by the active filters, in portfolio order.
    pub fn visible_records(&self) -> Vec<PortfolioRecord> {
        filter_records(&self.records, self.segment_filter, self.region_filter)
    }

    pub fn derived(&self) -> DerivedView {
        let visible = self.visible_records();
        DerivedView {
            metrics: compute_metrics(&visible),
            segments: summarize_segments(&visible),
            regions: summarize_regions(&visible),
        }
    }
}

/// Advance the snapshot by one event.
pub fn reduce(state: DashboardState, event: DashboardEvent) -> DashboardState {
    match event {
        DashboardEvent::PortfolioRefreshed { records } => {
            // New data invalidates whatever summary was on screen. An
            // in-flight request keeps its stamp and its eventual
            // resolution falls out as stale below.
            DashboardState {
                refresh_count: state.refresh_count + 1,
                records,
                summary_phase: SummaryPhase::Idle,
                ..state
            }
        }

        DashboardEvent::SegmentFilterSet { filter } => DashboardState {
            segment_filter: filter,
            ..state
        },

        DashboardEvent::RegionFilterSet { filter } => DashboardState {
            region_filter: filter,
            ..state
        },

        DashboardEvent::SummaryRequested => {
            if state.summary_phase.is_pending() {
                log::warn!(
                    "session={} summary request ignored: one already pending",
                    state.session_id
                );
                return state;
            }
            let generation = state.summary_generation + 1;
            DashboardState {
                summary_generation: generation,
                summary_phase: SummaryPhase::Pending { generation },
                ..state
            }
        }

        DashboardEvent::SummaryResolved {
            generation,
            outcome,
        } => match state.summary_phase {
            SummaryPhase::Pending {
                generation: pending,
            } if pending == generation => {
                let phase = match outcome {
                    SummaryOutcome::Delivered { report } => SummaryPhase::Succeeded {
                        generation,
                        report,
                    },
                    SummaryOutcome::Failed { error } => SummaryPhase::Failed { generation, error },
                };
                DashboardState {
                    summary_phase: phase,
                    ..state
                }
            }
            _ => {
                log::debug!(
                    "session={} dropping stale summary resolution (generation {generation})",
                    state.session_id
                );
                state
            }
        },
    }
}

//! Pure aggregation pipeline: filter the snapshot, then reduce it
//! into portfolio metrics and grouped summaries.
//!
//! Nothing in this module touches the RNG, the clock, or any I/O.
//! Every function is a total function of its inputs so the same
//! snapshot always yields the same derived view.

use crate::{
    generator::PortfolioRecord,
    types::{Region, Segment},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Records above this risk score count toward `high_risk_count`.
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentFilter {
    #[default]
    All,
    One(Segment),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionFilter {
    #[default]
    All,
    One(Region),
}

impl SegmentFilter {
    pub fn admits(&self, segment: Segment) -> bool {
        match self {
            Self::All => true,
            Self::One(s) => *s == segment,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All".into(),
            Self::One(s) => s.label().into(),
        }
    }
}

impl RegionFilter {
    pub fn admits(&self, region: Region) -> bool {
        match self {
            Self::All => true,
            Self::One(r) => *r == region,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All".into(),
            Self::One(r) => r.label().into(),
        }
    }
}

impl FromStr for SegmentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::One(s.parse()?))
        }
    }
}

impl FromStr for RegionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::One(s.parse()?))
        }
    }
}

/// Portfolio-wide KPIs for one set of records.
///
/// `default_rate` is a percentage in [0, 100]. An empty input yields
/// the zero sentinel rather than an error: every ratio is defined as
/// 0.0 so no NaN can reach a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub record_count: usize,
    pub total_balance: u64,
    pub total_revenue: u64,
    pub avg_balance: f64,
    pub avg_risk_score: f64,
    pub avg_utilization: f64,
    pub default_rate: f64,
    pub high_risk_count: usize,
}

impl AggregateMetrics {
    pub fn zero() -> Self {
        Self {
            record_count: 0,
            total_balance: 0,
            total_revenue: 0,
            avg_balance: 0.0,
            avg_risk_score: 0.0,
            avg_utilization: 0.0,
            default_rate: 0.0,
            high_risk_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: Region,
    pub record_count: usize,
    pub total_balance: u64,
    pub total_revenue: u64,
    pub avg_risk_score: f64,
}

/// Keep the records both filters admit, preserving input order.
/// Applying the same filters twice is a no-op.
pub fn filter_records(
    records: &[PortfolioRecord],
    segment: SegmentFilter,
    region: RegionFilter,
) -> Vec<PortfolioRecord> {
    records
        .iter()
        .filter(|r| segment.admits(r.segment) && region.admits(r.region))
        .cloned()
        .collect()
}

pub fn compute_metrics(records: &[PortfolioRecord]) -> AggregateMetrics {
    if records.is_empty() {
        return AggregateMetrics::zero();
    }

    let n = records.len() as f64;
    let mut total_balance = 0u64;
    let mut total_revenue = 0u64;
    let mut risk_sum = 0.0;
    let mut utilization_sum = 0.0;
    let mut defaults = 0usize;
    let mut high_risk = 0usize;

    for r in records {
        total_balance += r.account_balance;
        total_revenue += r.annual_revenue;
        risk_sum += r.risk_score;
        utilization_sum += r.utilization;
        if r.default_flag {
            defaults += 1;
        }
        if r.risk_score > HIGH_RISK_THRESHOLD {
            high_risk += 1;
        }
    }

    AggregateMetrics {
        record_count: records.len(),
        total_balance,
        total_revenue,
        avg_balance: total_balance as f64 / n,
        avg_risk_score: risk_sum / n,
        avg_utilization: utilization_sum / n,
        default_rate: defaults as f64 / n * 100.0,
        high_risk_count: high_risk,
    }
}

/// One summary per segment present in the input, in segment order.
/// The per-segment record counts always sum to the input length.
pub fn summarize_segments(records: &[PortfolioRecord]) -> Vec<SegmentSummary> {
    let mut buckets: BTreeMap<Segment, Vec<PortfolioRecord>> = BTreeMap::new();
    for r in records {
        buckets.entry(r.segment).or_default().push(r.clone());
    }
    buckets
        .into_iter()
        .map(|(segment, rs)| SegmentSummary {
            segment,
            metrics: compute_metrics(&rs),
        })
        .collect()
}

/// One summary per region present in the input, sorted by descending
/// total revenue. Ties break on region declaration order so equal
/// fixtures render the same way every time.
pub fn summarize_regions(records: &[PortfolioRecord]) -> Vec<RegionSummary> {
    let mut buckets: BTreeMap<Region, Vec<PortfolioRecord>> = BTreeMap::new();
    for r in records {
        buckets.entry(r.region).or_default().push(r.clone());
    }

    let mut summaries: Vec<RegionSummary> = buckets
        .into_iter()
        .map(|(region, rs)| {
            let metrics = compute_metrics(&rs);
            RegionSummary {
                region,
                record_count: metrics.record_count,
                total_balance: metrics.total_balance,
                total_revenue: metrics.total_revenue,
                avg_risk_score: metrics.avg_risk_score,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total_revenue
            .cmp(&a.total_revenue)
            .then(a.region.cmp(&b.region))
    });
    summaries
}

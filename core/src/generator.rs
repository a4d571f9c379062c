//! Synthetic portfolio generation.
//!
//! Every field of a record is drawn from the segment-conditioned
//! tables below through one explicit DashRng handle. The per-record
//! draw order (segment, region, balance, risk, default, revenue noise)
//! is append-only: reordering it changes every seeded portfolio.

use crate::{
    rng::DashRng,
    types::{Region, Segment},
};
use serde::{Deserialize, Serialize};

pub const UTILIZATION_CAP: f64 = 1.2;
pub const RISK_FLOOR: f64 = 0.01;
pub const RISK_CEIL: f64 = 0.99;
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.75;
pub const HIGH_RISK_DEFAULT_P: f64 = 0.40;
pub const BASE_DEFAULT_P: f64 = 0.02;
pub const REVENUE_BALANCE_RATE: f64 = 0.04;
pub const REVENUE_NOISE_MAX: f64 = 500.0;
pub const MASS_MARKET_RISK_NUDGE: f64 = 0.10;

/// Distribution parameters for one wealth band. Balance bands are
/// half-open before rounding: draws land in [min, max).
#[derive(Debug, Clone, Copy)]
pub struct SegmentProfile {
    pub segment: Segment,
    pub balance_min: u64,
    pub balance_max: u64,
    pub credit_limit: u64,
    pub risk_bias: f64,
}

/// Indexed in `Segment::ALL` order. MassMarket carries its bias as
/// the flat add-on below instead of a table entry.
pub const SEGMENT_PROFILES: [SegmentProfile; 3] = [
    SegmentProfile {
        segment: Segment::MassMarket,
        balance_min: 1_000,
        balance_max: 11_000,
        credit_limit: 15_000,
        risk_bias: 0.00,
    },
    SegmentProfile {
        segment: Segment::Affluent,
        balance_min: 15_000,
        balance_max: 65_000,
        credit_limit: 40_000,
        risk_bias: 0.30,
    },
    SegmentProfile {
        segment: Segment::HighNetWorth,
        balance_min: 50_000,
        balance_max: 200_000,
        credit_limit: 100_000,
        risk_bias: 0.10,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub customer_id: String,
    pub segment: Segment,
    pub region: Region,
    pub account_balance: u64,
    pub credit_limit: u64,
    pub utilization: f64,
    pub risk_score: f64,
    pub annual_revenue: u64,
    pub default_flag: bool,
}

impl SegmentProfile {
    pub fn for_segment(segment: Segment) -> &'static SegmentProfile {
        match segment {
            Segment::MassMarket => &SEGMENT_PROFILES[0],
            Segment::Affluent => &SEGMENT_PROFILES[1],
            Segment::HighNetWorth => &SEGMENT_PROFILES[2],
        }
    }
}

/// Generate a fresh portfolio of `count` records from `rng`.
/// `count == 0` yields an empty portfolio, not an error.
pub fn generate_portfolio(count: usize, rng: &mut DashRng) -> Vec<PortfolioRecord> {
    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        records.push(generate_record(i, rng));
    }
    log::info!(
        "refresh={} generator: produced {} records",
        rng.refresh,
        records.len()
    );
    records
}

fn generate_record(ordinal: usize, rng: &mut DashRng) -> PortfolioRecord {
    let segment = Segment::ALL[rng.next_u64_below(Segment::ALL.len() as u64) as usize];
    let profile = SegmentProfile::for_segment(segment);
    let region = Region::ALL[rng.next_u64_below(Region::ALL.len() as u64) as usize];

    let balance = rng
        .uniform(profile.balance_min as f64, profile.balance_max as f64)
        .round() as u64;

    // Utilization derives from the stored integer balance so the
    // published record always satisfies min(balance / limit, cap).
    let utilization = round2((balance as f64 / profile.credit_limit as f64).min(UTILIZATION_CAP));

    let mut risk = rng.next_f64() * 0.4 + utilization * 0.5 + profile.risk_bias;
    if profile.segment == Segment::MassMarket {
        risk += MASS_MARKET_RISK_NUDGE;
    }
    let risk = risk.clamp(RISK_FLOOR, RISK_CEIL);

    let default_p = if risk > DEFAULT_RISK_THRESHOLD {
        HIGH_RISK_DEFAULT_P
    } else {
        BASE_DEFAULT_P
    };
    let default_flag = rng.chance(default_p);

    let annual_revenue =
        (balance as f64 * REVENUE_BALANCE_RATE + rng.uniform(0.0, REVENUE_NOISE_MAX)).round() as u64;

    PortfolioRecord {
        customer_id: format!("c-{ordinal:06}"),
        segment: profile.segment,
        region,
        account_balance: balance,
        credit_limit: profile.credit_limit,
        utilization,
        risk_score: round3(risk),
        annual_revenue,
        default_flag,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

//! Generator tests: counts, field bounds, and derivation formulas.

use foliodash_core::{
    generator::{
        generate_portfolio, PortfolioRecord, SegmentProfile, DEFAULT_RISK_THRESHOLD, RISK_CEIL,
        RISK_FLOOR, UTILIZATION_CAP,
    },
    rng::DashRng,
    types::{Region, Segment},
};
use std::collections::{HashMap, HashSet};

fn sample_portfolio(seed: u64, count: usize) -> Vec<PortfolioRecord> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = DashRng::new(seed, 0);
    generate_portfolio(count, &mut rng)
}

#[test]
fn generates_exactly_the_requested_count() {
    for count in [1, 7, 200] {
        let records = sample_portfolio(42, count);
        assert_eq!(
            records.len(),
            count,
            "Requested {count} records, got {}",
            records.len()
        );
    }
}

#[test]
fn zero_count_yields_an_empty_portfolio() {
    let records = sample_portfolio(42, 0);
    assert!(
        records.is_empty(),
        "generate_portfolio(0) must be an empty portfolio, got {} records",
        records.len()
    );
}

#[test]
fn customer_ids_are_unique_and_zero_padded() {
    let records = sample_portfolio(7, 500);

    let ids: HashSet<&str> = records.iter().map(|r| r.customer_id.as_str()).collect();
    assert_eq!(ids.len(), records.len(), "Customer ids must be unique");

    assert_eq!(records[0].customer_id, "c-000000");
    assert_eq!(records[499].customer_id, "c-000499");
    for r in &records {
        assert_eq!(
            r.customer_id.len(),
            8,
            "Id '{}' is not c- plus six digits",
            r.customer_id
        );
        assert!(r.customer_id.starts_with("c-"));
    }
}

#[test]
fn every_field_respects_its_bounds() {
    let records = sample_portfolio(123, 2_000);

    for r in &records {
        let profile = SegmentProfile::for_segment(r.segment);
        assert_eq!(
            r.credit_limit, profile.credit_limit,
            "Credit limit is fixed per segment"
        );
        assert!(
            r.account_balance >= profile.balance_min && r.account_balance <= profile.balance_max,
            "Balance {} outside the {:?} band [{}, {}]",
            r.account_balance,
            r.segment,
            profile.balance_min,
            profile.balance_max
        );
        assert!(
            (0.0..=UTILIZATION_CAP).contains(&r.utilization),
            "Utilization {} outside [0, {UTILIZATION_CAP}]",
            r.utilization
        );
        assert!(
            (RISK_FLOOR..=RISK_CEIL).contains(&r.risk_score),
            "Risk score {} outside [{RISK_FLOOR}, {RISK_CEIL}]",
            r.risk_score
        );
    }
}

#[test]
fn utilization_derives_from_the_stored_balance() {
    let records = sample_portfolio(99, 1_000);

    for r in &records {
        let expected =
            ((r.account_balance as f64 / r.credit_limit as f64).min(UTILIZATION_CAP) * 100.0)
                .round()
                / 100.0;
        assert!(
            (r.utilization - expected).abs() < 1e-9,
            "Utilization {} does not derive from balance {} / limit {}",
            r.utilization,
            r.account_balance,
            r.credit_limit
        );
    }
}

#[test]
fn risk_and_utilization_are_rounded_to_published_precision() {
    let records = sample_portfolio(55, 1_000);

    for r in &records {
        let util_cents = r.utilization * 100.0;
        assert!(
            (util_cents - util_cents.round()).abs() < 1e-6,
            "Utilization {} carries more than 2 decimals",
            r.utilization
        );
        let risk_mills = r.risk_score * 1000.0;
        assert!(
            (risk_mills - risk_mills.round()).abs() < 1e-6,
            "Risk score {} carries more than 3 decimals",
            r.risk_score
        );
    }
}

#[test]
fn revenue_tracks_the_balance_rate_plus_bounded_noise() {
    let records = sample_portfolio(11, 1_000);

    for r in &records {
        let base = r.account_balance as f64 * 0.04;
        let revenue = r.annual_revenue as f64;
        assert!(
            revenue >= base - 0.5 && revenue <= base + 500.5,
            "Revenue {} outside [{:.1}, {:.1}] for balance {}",
            r.annual_revenue,
            base - 0.5,
            base + 500.5,
            r.account_balance
        );
    }
}

#[test]
fn segments_and_regions_cover_their_enumerations() {
    let records = sample_portfolio(2024, 3_000);

    let mut by_segment: HashMap<Segment, usize> = HashMap::new();
    let mut by_region: HashMap<Region, usize> = HashMap::new();
    for r in &records {
        *by_segment.entry(r.segment).or_default() += 1;
        *by_region.entry(r.region).or_default() += 1;
    }

    // Uniform draws: each segment near a third, each region near a
    // quarter. Bounds are several standard deviations wide.
    for segment in Segment::ALL {
        let share = *by_segment.get(&segment).unwrap_or(&0) as f64 / records.len() as f64;
        assert!(
            (0.27..0.40).contains(&share),
            "{segment:?} share {share:.3} far from uniform third"
        );
    }
    for region in Region::ALL {
        let share = *by_region.get(&region).unwrap_or(&0) as f64 / records.len() as f64;
        assert!(
            (0.19..0.31).contains(&share),
            "{region:?} share {share:.3} far from uniform quarter"
        );
    }
}

#[test]
fn default_flags_concentrate_above_the_risk_threshold() {
    let records = sample_portfolio(31, 5_000);

    let (mut high_n, mut high_defaults) = (0usize, 0usize);
    let (mut low_n, mut low_defaults) = (0usize, 0usize);
    for r in &records {
        if r.risk_score > DEFAULT_RISK_THRESHOLD {
            high_n += 1;
            if r.default_flag {
                high_defaults += 1;
            }
        } else {
            low_n += 1;
            if r.default_flag {
                low_defaults += 1;
            }
        }
    }

    assert!(
        high_n > 100 && low_n > 100,
        "Need both risk buckets populated, got high={high_n} low={low_n}"
    );
    let high_rate = high_defaults as f64 / high_n as f64;
    let low_rate = low_defaults as f64 / low_n as f64;
    assert!(
        high_rate > 0.25,
        "High-risk default rate {high_rate:.3} should sit near 0.40"
    );
    assert!(
        low_rate < 0.08,
        "Low-risk default rate {low_rate:.3} should sit near 0.02"
    );
    assert!(
        high_rate > low_rate,
        "Defaults must concentrate above the threshold ({high_rate:.3} vs {low_rate:.3})"
    );
}

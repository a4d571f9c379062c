//! Session driver tests: refresh, filters, and derived views.

use foliodash_core::{
    aggregate::SegmentFilter,
    session::DashboardSession,
    summary::SummaryConfig,
    types::Segment,
};

fn build_session(seed: u64) -> DashboardSession {
    let _ = env_logger::builder().is_test(true).try_init();
    DashboardSession::new(seed, SummaryConfig::default())
}

#[test]
fn refresh_populates_the_snapshot() {
    let mut session = build_session(21);
    assert_eq!(session.state().records.len(), 0);
    assert_eq!(session.master_seed(), 21);

    session.refresh(80);
    assert_eq!(session.state().records.len(), 80);
    assert_eq!(session.state().refresh_count, 1);

    session.refresh(80);
    assert_eq!(session.state().refresh_count, 2);
}

#[test]
fn segment_filter_narrows_the_visible_view() {
    let mut session = build_session(21);
    session.refresh(80);
    session.set_segment_filter(SegmentFilter::One(Segment::MassMarket));

    let visible = session.state().visible_records();
    assert!(
        !visible.is_empty(),
        "80 uniform draws should include Mass Market records"
    );
    for r in &visible {
        assert_eq!(r.segment, Segment::MassMarket);
    }

    let view = session.state().derived();
    assert_eq!(view.metrics.record_count, visible.len());
    for summary in &view.segments {
        assert_eq!(
            summary.segment,
            Segment::MassMarket,
            "Only the filtered segment may be summarized"
        );
    }
}

#[test]
fn derived_views_are_stable_for_one_snapshot() {
    let mut session = build_session(63);
    session.refresh(120);

    let first = serde_json::to_string(&session.derived()).expect("view serializes");
    let second = serde_json::to_string(&session.derived()).expect("view serializes");
    assert_eq!(first, second, "Deriving twice must not change anything");
}

#[test]
fn rendered_report_carries_the_session_identity() {
    let mut session = build_session(5);
    session.refresh(30);

    let html = session.render_report();
    assert!(html.contains(&session.state().session_id));
    assert!(
        html.contains("local fallback"),
        "Without credentials the report runs on the fallback"
    );
}

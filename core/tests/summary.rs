//! Summary guard rails that must hold without any network in play.

use foliodash_core::{
    aggregate::{compute_metrics, summarize_segments},
    error::DashError,
    generator::generate_portfolio,
    rng::DashRng,
    session::DashboardSession,
    state::SummaryPhase,
    summary::{build_summary_prompt, InsightSource, SummaryConfig, REQUIRED_INSIGHTS},
};

#[test]
fn missing_credentials_fail_before_any_state_transition() {
    let mut session = DashboardSession::new(3, SummaryConfig::default());
    session.refresh(25);
    assert_eq!(session.state().summary_phase, SummaryPhase::Idle);

    match session.request_summary() {
        Err(DashError::CredentialMissing) => {}
        other => panic!("Expected CredentialMissing, got {other:?}"),
    }

    assert_eq!(
        session.state().summary_phase,
        SummaryPhase::Idle,
        "A guarded request must not move the phase machine"
    );
    assert_eq!(
        session.state().summary_generation,
        0,
        "A guarded request must not spend a generation"
    );
}

#[test]
fn insight_panel_falls_back_when_nothing_succeeded() {
    let mut session = DashboardSession::new(8, SummaryConfig::default());
    session.refresh(40);

    let view = session.state().derived();
    let insights = session.insights_for(&view.metrics);
    assert_eq!(insights.source, InsightSource::Fallback);
    assert_eq!(insights.insights.len(), REQUIRED_INSIGHTS);
    assert!(!insights.recommendation.is_empty());
}

#[test]
fn prompt_embeds_metrics_and_every_present_segment() {
    let mut rng = DashRng::new(11, 0);
    let records = generate_portfolio(120, &mut rng);
    let metrics = compute_metrics(&records);
    let segments = summarize_segments(&records);

    let prompt = build_summary_prompt(&metrics, &segments);
    assert!(prompt.contains("Records in view: 120"));
    assert!(prompt.contains("Per segment:"));
    for s in &segments {
        assert!(
            prompt.contains(s.segment.label()),
            "Prompt is missing the {} line",
            s.segment.label()
        );
    }
    assert!(prompt.contains("ONLY with valid JSON"));
}

#[test]
fn prompt_for_an_empty_view_skips_the_segment_block() {
    let prompt = build_summary_prompt(&compute_metrics(&[]), &[]);
    assert!(prompt.contains("Records in view: 0"));
    assert!(
        !prompt.contains("Per segment:"),
        "No segment block without segments"
    );
}

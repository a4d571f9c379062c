//! Portfolio insight summarization through an LLM endpoint.
//!
//! The client speaks the chat-completions wire shape and demands a
//! strict JSON payload back: exactly three insight strings and one
//! recommendation. Anything else is a malformed response. Callers
//! substitute `InsightReport::fallback` when the call is not
//! configured or fails; the dashboard never goes blank over a model.

use crate::{
    aggregate::{AggregateMetrics, SegmentSummary},
    error::{DashError, DashResult},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// The response contract: this many insights, no more, no fewer.
pub const REQUIRED_INSIGHTS: usize = 3;

const SYSTEM_PROMPT: &str =
    "You are a concise portfolio analytics assistant. Respond with strict JSON only.";

/// Connection settings for the summary endpoint. The key is optional
/// on purpose: a session without one still runs, it just never leaves
/// the fallback path.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
        }
    }
}

/// Where an insight report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Model,
    Fallback,
}

impl InsightSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "local fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub insights: Vec<String>,
    pub recommendation: String,
    pub source: InsightSource,
}

impl InsightReport {
    /// Deterministic local substitute. Same arity contract as the
    /// model path so downstream rendering never branches on origin.
    pub fn fallback(metrics: &AggregateMetrics) -> Self {
        if metrics.is_empty() {
            return Self {
                insights: vec![
                    "No records match the current view.".into(),
                    "All aggregate figures read zero by definition on an empty selection.".into(),
                    "Broaden the filters or refresh the portfolio to see activity.".into(),
                ],
                recommendation: "Widen the active filters before drawing conclusions.".into(),
                source: InsightSource::Fallback,
            };
        }

        let recommendation = if metrics.avg_risk_score > 0.5 {
            "Risk concentration warrants a review of underwriting thresholds.".to_string()
        } else {
            "Risk posture is within tolerance; maintain the current allocation.".to_string()
        };

        Self {
            insights: vec![
                format!(
                    "Portfolio holds {} accounts with a combined balance of {} USD.",
                    metrics.record_count, metrics.total_balance
                ),
                format!(
                    "Average risk score is {:.3} and {} accounts sit in the high-risk band.",
                    metrics.avg_risk_score, metrics.high_risk_count
                ),
                format!(
                    "Defaults run at {:.2}% against {} USD of annual revenue.",
                    metrics.default_rate, metrics.total_revenue
                ),
            ],
            recommendation,
            source: InsightSource::Fallback,
        }
    }
}

// ── Chat-completions wire types ─────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The payload the model must answer with, before local stamping.
#[derive(Debug, Deserialize)]
struct InsightPayload {
    insights: Vec<String>,
    recommendation: String,
}

/// Build the user prompt for one summary request. The metrics are
/// embedded as plain labelled lines; the closing instruction pins the
/// response shape.
pub fn build_summary_prompt(metrics: &AggregateMetrics, segments: &[SegmentSummary]) -> String {
    let mut lines = vec![
        "Review the portfolio aggregates below and produce an executive summary.".to_string(),
        String::new(),
        format!("Records in view: {}", metrics.record_count),
        format!("Total balance: {} USD", metrics.total_balance),
        format!("Total annual revenue: {} USD", metrics.total_revenue),
        format!("Average risk score: {:.3}", metrics.avg_risk_score),
        format!("Average utilization: {:.2}", metrics.avg_utilization),
        format!("Default rate: {:.2}%", metrics.default_rate),
        format!("High-risk accounts: {}", metrics.high_risk_count),
    ];

    if !segments.is_empty() {
        lines.push(String::new());
        lines.push("Per segment:".to_string());
        for s in segments {
            lines.push(format!(
                "- {}: {} records, avg risk {:.3}, default rate {:.2}%, revenue {} USD",
                s.segment,
                s.metrics.record_count,
                s.metrics.avg_risk_score,
                s.metrics.default_rate,
                s.metrics.total_revenue
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Answer ONLY with valid JSON, no prose around it, shaped as \
         {{\"insights\": [exactly {REQUIRED_INSIGHTS} strings], \"recommendation\": \"string\"}}."
    ));
    lines.join("\n")
}

/// Blocking HTTP client for the summary endpoint. One request at a
/// time per session; no retry, no timeout beyond the transport default.
pub struct SummaryClient {
    config: SummaryConfig,
    http: reqwest::blocking::Client,
}

impl SummaryClient {
    pub fn new(config: SummaryConfig) -> Self {
        Self {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Call the endpoint and parse the strict insight payload.
    ///
    /// Fails with `CredentialMissing` before any network activity when
    /// no key is configured.
    pub fn fetch_insights(
        &self,
        metrics: &AggregateMetrics,
        segments: &[SegmentSummary],
    ) -> DashResult<InsightReport> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) => key,
            None => return Err(DashError::CredentialMissing),
        };

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: build_summary_prompt(metrics, segments),
                },
            ],
            temperature: 0.2,
        };

        log::info!(
            "summary: dispatching request to {} (model {})",
            self.config.endpoint,
            self.config.model
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| DashError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashError::Transport(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .map_err(|e| DashError::Transport(format!("unreadable response body: {e}")))?;

        let body: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| DashError::MalformedResponse(format!("chat envelope: {e}")))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| DashError::MalformedResponse("response carried no choices".into()))?;

        parse_insight_content(content)
    }
}

/// Parse model output into an `InsightReport`, enforcing the arity
/// contract. Tolerates a surrounding ```json fence, nothing else.
pub fn parse_insight_content(content: &str) -> DashResult<InsightReport> {
    let cleaned = strip_code_fence(content);

    let payload: InsightPayload = serde_json::from_str(cleaned)
        .map_err(|e| DashError::MalformedResponse(format!("insight payload: {e}")))?;

    if payload.insights.len() != REQUIRED_INSIGHTS {
        return Err(DashError::MalformedResponse(format!(
            "expected exactly {REQUIRED_INSIGHTS} insights, got {}",
            payload.insights.len()
        )));
    }

    Ok(InsightReport {
        insights: payload.insights,
        recommendation: payload.recommendation,
        source: InsightSource::Model,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

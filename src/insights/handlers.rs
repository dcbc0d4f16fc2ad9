use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::{
    classifier::classify,
    dto::{AdviceRequest, AdviceResponse, SuggestionsQuery, SuggestionsResponse},
    prompts::build_prompt,
    sections,
};
use crate::{errors::AppError, state::AppState};

pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Suggested questions per topic tab on the insights page.
const SUGGESTIONS: [(&str, &[&str]); 4] = [
    (
        "all",
        &[
            "What are the most in-demand tech skills for 2024?",
            "How to create a strong tech portfolio?",
        ],
    ),
    (
        "skills",
        &[
            "What learning path should I follow to become a full-stack developer?",
            "Which cloud certifications are most valuable?",
        ],
    ),
    (
        "career",
        &[
            "How to transition from development to tech leadership?",
            "Tips for negotiating a tech salary?",
        ],
    ),
    (
        "interview",
        &[
            "Common system design interview questions",
            "How to prepare for tech behavioral interviews?",
        ],
    ),
];

pub fn insights_routes() -> Router<AppState> {
    Router::new()
        .route("/api/insights", post(ask))
        .route("/api/insights/suggestions", get(suggestions))
}

#[instrument(skip(state, payload))]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, AppError> {
    let question = payload.prompt.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Prompt is required".into()));
    }

    let classification = classify(question);
    let prompt = build_prompt(classification.category, question);
    info!(category = ?classification.category, confidence = classification.confidence, "advice requested");

    let (content, fallback) = match state.advisor.generate(&prompt).await {
        Ok(text) => (text, false),
        Err(e) => {
            error!(error = %e, "advice generation failed");
            (APOLOGY.to_string(), true)
        }
    };

    let sections = if fallback {
        Vec::new()
    } else {
        sections::split(&content)
    };

    Ok(Json(AdviceResponse {
        category: classification.category,
        confidence: classification.confidence,
        content,
        sections,
        fallback,
    }))
}

pub async fn suggestions(Query(query): Query<SuggestionsQuery>) -> Json<SuggestionsResponse> {
    let wanted = query
        .category
        .map(|c| c.trim().to_lowercase())
        .unwrap_or_else(|| "all".to_string());
    let (category, prompts) = SUGGESTIONS
        .iter()
        .find(|(name, _)| *name == wanted)
        .copied()
        .unwrap_or(SUGGESTIONS[0]);
    Json(SuggestionsResponse { category, prompts })
}

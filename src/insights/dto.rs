use serde::{Deserialize, Serialize};

use super::{classifier::Category, sections::Section};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdviceRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub category: Category,
    pub confidence: f32,
    /// Raw model text, or the apology when the service failed.
    pub content: String,
    pub sections: Vec<Section>,
    pub fallback: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub category: &'static str,
    pub prompts: &'static [&'static str],
}

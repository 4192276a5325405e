//! Search API wire types (spec section 6, "External Interfaces").
//!
//! Field names here are the external contract and are pinned with
//! `#[serde(rename)]` where Rust's `snake_case` convention would otherwise
//! diverge from the required wire format.

use equisearch_core::{Metrics, Sources};
use serde::{Deserialize, Serialize};

/// A search request, pre-validation.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub min_score: f32,
}

fn default_top_k() -> usize {
    10
}

/// One result row.
#[derive(Debug, Clone, Serialize)]
pub struct ResultItem {
    pub grupo: String,
    pub descricao: String,
    pub score: f32,
    pub score_normalized: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    #[serde(rename = "rankScoreFinal")]
    pub rank_score_final: f32,
    #[serde(rename = "confidenceItem")]
    pub confidence_item: f32,
    pub metrics: Metrics,
    pub sources: Sources,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    pub link_detalhes: String,
}

/// Optional per-candidate score components, reserved for a debug view.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub model_boost: f32,
    pub category_boost: f32,
    pub accessory_bonus: f32,
    pub accessory_penalty: f32,
    pub missing_model_penalty: f32,
}

/// Confidence bucket reported alongside the raw top-1 confidence.
#[derive(Debug, Clone, Serialize)]
pub struct Confidence {
    pub score: f32,
    pub nivel: String,
}

/// Per-response diagnostic metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub engine: String,
    pub version: String,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub features: Vec<String>,
    pub request_id: String,
}

/// Full search response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query_original: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_corrected: Option<String>,
    pub resultados: Vec<ResultItem>,
    pub total: usize,
    pub confianca: Confidence,
    pub metadata: ResponseMetadata,
}

/// The `{error: {code, message}, request_id}` shape for 4xx/5xx bodies.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

//! Confidence Engine: a per-item confidence in `[0, 1]`, monotonic with
//! rank order and sensitive to how specific the query was.

use crate::parsed_query::ParsedQuery;

/// Confidence-scoring tunables (a subset of [`equisearch_core::EngineConfig`]).
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceParams {
    pub temperature: f32,
    pub use_specificity: bool,
}

/// A token is a "technical attribute" when it is digits immediately
/// followed by one of a fixed unit suffix set.
fn has_technical_attribute_pattern(tokens: &[String]) -> bool {
    const SUFFIXES: &[&str] = &["mm", "cm", "w", "v", "kg", "l", "hp", "rpm"];
    tokens.iter().any(|token| {
        let digits_end = token.chars().take_while(|c| c.is_ascii_digit()).count();
        digits_end > 0 && SUFFIXES.iter().any(|suffix| &token[digits_end..] == *suffix)
    })
}

/// Query specificity in `[0.3, 1.0]` (spec "Confidence Engine" step 2).
pub fn query_specificity(parsed: &ParsedQuery) -> f32 {
    let mut score = 0.3;
    if !parsed.model_numbers.is_empty() {
        score += 0.4;
    }
    if parsed.tokens.len() >= 2 {
        score += 0.2;
    }
    if has_technical_attribute_pattern(&parsed.tokens) {
        score += 0.1;
    }
    score.min(1.0)
}

/// Compute per-item confidence for an ordered list of `rankScoreFinal`
/// values. `scores` must already be sorted descending (the reranked,
/// possibly diversified, final order).
pub fn compute_confidence(scores: &[f32], parsed: &ParsedQuery, params: ConfidenceParams) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max_score = scores[0];
    let specificity_multiplier = if params.use_specificity {
        0.7 + 0.3 * query_specificity(parsed)
    } else {
        1.0
    };

    let mut confidences: Vec<f32> = scores
        .iter()
        .map(|&score| {
            let weight = ((score - max_score) / params.temperature).exp();
            weight.min(1.0) * specificity_multiplier
        })
        .collect();

    for i in 1..confidences.len() {
        if confidences[i] > confidences[i - 1] {
            confidences[i] = confidences[i - 1];
        }
    }
    confidences
}

/// Confidence level bucket used in the search response (spec section 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Alta,
    Media,
    Baixa,
}

pub fn confidence_level(top1_confidence: f32) -> ConfidenceLevel {
    if top1_confidence >= 0.80 {
        ConfidenceLevel::Alta
    } else if top1_confidence >= 0.60 {
        ConfidenceLevel::Media
    } else {
        ConfidenceLevel::Baixa
    }
}

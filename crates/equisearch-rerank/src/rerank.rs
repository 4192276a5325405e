//! Intent-aware rerank scoring: repairs lexical-only rankings that confuse
//! accessories with equipment and rewards model-number matches.

use equisearch_core::{taxonomy, DocType, EngineConfig};

use crate::classify::{classify_doc, ClassifiedDoc};
use crate::parsed_query::{Intent, ParsedQuery};
use equisearch_core::Document;

/// One reranked result: the original BM25-normalized score plus the
/// computed final score and classification debug fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankedItem {
    pub doc_id: String,
    pub bm25_norm: f32,
    pub rank_score_final: f32,
    pub classification: ClassifiedDoc,
}

/// Outcome of reranking a candidate list, including whether the hard
/// top-1 equipment guard fired.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankOutcome {
    pub items: Vec<RerankedItem>,
    pub top1_swapped: bool,
}

/// Rerank scoring weights, read from [`EngineConfig`] once per call so
/// `score_one` doesn't have to re-derive them per candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RerankWeights {
    pub bm25: f32,
    pub model_boost: f32,
    pub category_boost: f32,
    pub accessory_penalty: f32,
    pub missing_model_penalty: f32,
    /// Subtraction applied when accessory terms co-occur with an
    /// EQUIPAMENTO-intent query. `None` disables the term entirely
    /// (spec: "optional, behind a feature flag").
    pub mixed_query_penalty: Option<f32>,
}

impl RerankWeights {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            bm25: config.rerank_bm25_weight,
            model_boost: config.rerank_model_boost,
            category_boost: config.rerank_category_boost,
            accessory_penalty: config.rerank_accessory_penalty,
            missing_model_penalty: config.rerank_missing_model_penalty,
            mixed_query_penalty: config.rerank_mixed_query_penalty,
        }
    }
}

fn accessory_hits_in_doc(parsed: &ParsedQuery, doc_text: &str) -> usize {
    let doc_tokens: Vec<&str> = doc_text.split_whitespace().collect();
    parsed
        .accessory_terms
        .iter()
        .filter(|term| {
            doc_tokens
                .iter()
                .any(|t| taxonomy::canonical_accessory(t) == Some(term.as_str()))
        })
        .count()
}

fn score_one(
    bm25_norm: f32,
    parsed: &ParsedQuery,
    classification: &ClassifiedDoc,
    doc_text: &str,
    config: &EngineConfig,
) -> f32 {
    let weights = RerankWeights::from_config(config);
    let model_boost = if classification.has_model_number_match { 1.0 } else { 0.0 };
    let category_boost = match parsed.main_category {
        Some(category) if category == classification.category => 1.0,
        _ => 0.0,
    };
    let accessory_penalty = if parsed.intent == Intent::Equipamento
        && classification.doc_type == DocType::Acessorio
    {
        1.0
    } else {
        0.0
    };
    let missing_model_penalty = if !parsed.model_numbers.is_empty() && !classification.has_model_number_match
    {
        1.0
    } else {
        0.0
    };
    let accessory_bonus = if config.accessory_bonus_enabled
        && parsed.intent == Intent::Equipamento
        && classification.doc_type == DocType::Equipamento
    {
        let hits = accessory_hits_in_doc(parsed, doc_text);
        (0.04 * hits as f32).min(0.12)
    } else {
        0.0
    };
    let mixed_query_penalty = match weights.mixed_query_penalty {
        Some(weight) if parsed.intent == Intent::Equipamento && !parsed.accessory_terms.is_empty() => weight,
        _ => 0.0,
    };

    let raw = weights.bm25 * bm25_norm
        + weights.model_boost * model_boost
        + weights.category_boost * category_boost
        + accessory_bonus
        - weights.accessory_penalty * accessory_penalty
        - weights.missing_model_penalty * missing_model_penalty
        - mixed_query_penalty;

    raw.max(0.0)
}

/// Rerank BM25 candidates (`docId`, normalized score) against a document
/// lookup. `lookup` must return a document for every candidate id.
pub fn rerank<'a>(
    candidates: &[(String, f32)],
    lookup: impl Fn(&str) -> Option<&'a Document>,
    parsed: &ParsedQuery,
    config: &EngineConfig,
) -> RerankOutcome {
    let mut items: Vec<RerankedItem> = Vec::with_capacity(candidates.len());
    for (doc_id, bm25_norm) in candidates {
        let Some(doc) = lookup(doc_id) else { continue };
        let classification = classify_doc(doc, &parsed.model_numbers);
        let rank_score_final = score_one(*bm25_norm, parsed, &classification, &doc.text, config);
        items.push(RerankedItem {
            doc_id: doc_id.clone(),
            bm25_norm: *bm25_norm,
            rank_score_final,
            classification,
        });
    }

    items.sort_by(|a, b| {
        b.rank_score_final
            .partial_cmp(&a.rank_score_final)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.bm25_norm.partial_cmp(&a.bm25_norm).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut top1_swapped = false;
    if config.rerank_hard_top1_equipment && parsed.intent == Intent::Equipamento {
        if let Some(first) = items.first() {
            if first.classification.doc_type == DocType::Acessorio {
                if let Some(equip_pos) = items
                    .iter()
                    .position(|item| item.classification.doc_type == DocType::Equipamento)
                {
                    let promoted = items.remove(equip_pos);
                    items.insert(0, promoted);
                    top1_swapped = true;
                }
            }
        }
    }

    RerankOutcome { items, top1_swapped }
}

/// Build the query used for BM25 retrieval: with accessory terms and
/// connectors stripped when the query is equipment-intent but also
/// carries accessory tokens. The original query is still used for intent
/// parsing.
pub fn build_core_query(parsed: &ParsedQuery) -> String {
    if parsed.intent != Intent::Equipamento || parsed.accessory_terms.is_empty() {
        return parsed.normalized.clone();
    }

    let stripped: Vec<&str> = parsed
        .tokens
        .iter()
        .map(String::as_str)
        .filter(|token| {
            taxonomy::canonical_accessory(token).is_none() && !taxonomy::is_connector(token)
        })
        .collect();

    if !stripped.is_empty() {
        return stripped.join(" ");
    }

    if let Some(category) = parsed.main_category {
        let mut fallback_tokens: Vec<String> = Vec::new();
        if let Some(token) = category.token() {
            fallback_tokens.push(token.to_string());
        }
        fallback_tokens.extend(parsed.model_numbers.iter().cloned());
        if !fallback_tokens.is_empty() {
            return fallback_tokens.join(" ");
        }
    }

    parsed.normalized.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_query::parse_query;
    use equisearch_core::{DocCategory, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources};

    fn doc(id: &str, text: &str, category: DocCategory, doc_type: DocType) -> Document {
        let metric = NumericMetrics { display: 1.0, mean: 1.0, median: 1.0, min: 1.0, max: 1.0, n: 1 };
        Document {
            id: id.to_string(),
            equipment_id: text.to_string(),
            title: text.to_string(),
            text: text.to_string(),
            raw_text: text.to_string(),
            semantic_text: text.to_string(),
            doc_category: category,
            doc_type,
            metrics: Metrics {
                valor_unitario: metric,
                vida_util_meses: metric,
                manutencao: MaintenanceMetrics { metrics: metric, unit: MaintenanceUnit::Fraction },
            },
            sources: Sources::default(),
        }
    }

    #[test]
    fn hard_top1_guard_promotes_equipment_over_accessory() {
        let docs = vec![
            doc("DOC_ACC", "disco para enceradeira", DocCategory::Unknown, DocType::Acessorio),
            doc("DOC_EQUIP", "enceradeira industrial 510mm", DocCategory::Enceradeira, DocType::Equipamento),
        ];
        let parsed = parse_query("enceradeira");
        let config = EngineConfig::default();
        let candidates = vec![("DOC_ACC".to_string(), 1.0), ("DOC_EQUIP".to_string(), 0.5)];
        let outcome = rerank(
            &candidates,
            |id| docs.iter().find(|d| d.id == id),
            &parsed,
            &config,
        );
        assert!(outcome.top1_swapped);
        assert_eq!(outcome.items[0].doc_id, "DOC_EQUIP");
    }

    #[test]
    fn core_query_strips_accessory_terms_and_connectors() {
        let parsed = parse_query("enceradeira com disco");
        assert_eq!(build_core_query(&parsed), "enceradeira");
    }

    #[test]
    fn core_query_falls_back_to_category_when_stripping_empties_query() {
        let parsed = parse_query("disco enceradeira");
        let core = build_core_query(&parsed);
        assert!(!core.is_empty());
    }

    #[test]
    fn mixed_query_penalty_is_a_noop_by_default() {
        let d = doc("DOC_X", "enceradeira industrial 510mm", DocCategory::Enceradeira, DocType::Equipamento);
        let parsed = parse_query("enceradeira com disco");
        assert!(!parsed.accessory_terms.is_empty());
        let config = EngineConfig::default();
        let classification = classify_doc(&d, &parsed.model_numbers);
        let with_default = score_one(0.8, &parsed, &classification, &d.text, &config);

        let mut no_accessories = parsed.clone();
        no_accessories.accessory_terms.clear();
        let without_mixed_terms = score_one(0.8, &no_accessories, &classification, &d.text, &config);
        assert_eq!(with_default, without_mixed_terms, "default config has no mixed-query penalty weight");
    }

    #[test]
    fn mixed_query_penalty_applies_once_configured() {
        let d = doc("DOC_X", "enceradeira industrial 510mm", DocCategory::Enceradeira, DocType::Equipamento);
        let parsed = parse_query("enceradeira com disco");
        assert!(!parsed.accessory_terms.is_empty());
        let mut config = EngineConfig::default();
        config.rerank_mixed_query_penalty = Some(0.2);
        let classification = classify_doc(&d, &parsed.model_numbers);

        let penalized = score_one(0.8, &parsed, &classification, &d.text, &config);
        config.rerank_mixed_query_penalty = None;
        let unpenalized = score_one(0.8, &parsed, &classification, &d.text, &config);
        assert!(penalized < unpenalized);
        assert!((unpenalized - penalized - 0.2).abs() < 1e-6);
    }

    #[test]
    fn final_score_never_goes_negative() {
        let d = doc("DOC_X", "disco avulso", DocCategory::Unknown, DocType::Acessorio);
        let parsed = parse_query("enceradeira 510 modelo");
        let config = EngineConfig::default();
        let classification = classify_doc(&d, &parsed.model_numbers);
        let score = score_one(0.0, &parsed, &classification, &d.text, &config);
        assert!(score >= 0.0);
    }
}

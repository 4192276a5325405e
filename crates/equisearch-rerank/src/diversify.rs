//! Navigation-Intent Diversifier: when a query is a bare category name,
//! return a subtype-diverse top-K instead of near-duplicates.

use equisearch_core::{taxonomy, DocCategory, Document, EngineConfig};

use crate::parsed_query::ParsedQuery;
use crate::rerank::RerankedItem;

/// A query counts as navigation intent iff it names a category, carries
/// no model numbers, and is exactly one token long.
pub fn is_navigation_intent(parsed: &ParsedQuery) -> bool {
    parsed.main_category.is_some() && parsed.model_numbers.is_empty() && parsed.tokens.len() == 1
}

fn subtype_key(doc: &Document, category: DocCategory) -> String {
    let category_token = category.token();
    doc.text
        .split_whitespace()
        .filter(|token| Some(*token) != category_token && !taxonomy::is_diversifier_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Diversify `items` (already in rerank order) to at most `top_k` results,
/// capping each subtype key at `max_per_subtype` occurrences and ensuring
/// a minimum share of the detected category survives.
pub fn diversify(
    items: &[RerankedItem],
    lookup: impl Fn(&str) -> Option<Document>,
    category: DocCategory,
    top_k: usize,
    config: &EngineConfig,
) -> Vec<RerankedItem> {
    let candidate_pool_size = (top_k * config.nav_max_candidate_mult).clamp(60, 220);
    let pool: Vec<&RerankedItem> = items.iter().take(candidate_pool_size).collect();

    let mut selected: Vec<RerankedItem> = Vec::with_capacity(top_k);
    let mut subtype_counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut selected_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

    for item in &pool {
        if selected.len() >= top_k {
            break;
        }
        let Some(doc) = lookup(&item.doc_id) else { continue };
        let key = subtype_key(&doc, category);
        let count = subtype_counts.entry(key).or_insert(0);
        if *count >= config.nav_max_per_subtype {
            continue;
        }
        *count += 1;
        selected_ids.insert(item.doc_id.clone());
        selected.push((*item).clone());
    }

    let floor = 5.min(top_k);
    let coverage = selected
        .iter()
        .filter(|item| {
            lookup(&item.doc_id)
                .map(|d| d.doc_category == category)
                .unwrap_or(false)
        })
        .count();

    if coverage < floor {
        let mut need = floor - coverage;
        let replacements: Vec<&RerankedItem> = pool
            .iter()
            .copied()
            .filter(|item| {
                !selected_ids.contains(&item.doc_id)
                    && lookup(&item.doc_id).map(|d| d.doc_category == category).unwrap_or(false)
            })
            .collect();

        for replacement in replacements {
            if need == 0 {
                break;
            }
            if let Some(pos) = selected.iter().rposition(|item| {
                lookup(&item.doc_id).map(|d| d.doc_category != category).unwrap_or(true)
            }) {
                selected[pos] = replacement.clone();
                need -= 1;
            } else {
                break;
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifiedDoc;
    use equisearch_core::{DocType, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources};

    fn doc(id: &str, text: &str, category: DocCategory) -> Document {
        let metric = NumericMetrics { display: 1.0, mean: 1.0, median: 1.0, min: 1.0, max: 1.0, n: 1 };
        Document {
            id: id.to_string(),
            equipment_id: text.to_string(),
            title: text.to_string(),
            text: text.to_string(),
            raw_text: text.to_string(),
            semantic_text: text.to_string(),
            doc_category: category,
            doc_type: DocType::Equipamento,
            metrics: Metrics {
                valor_unitario: metric,
                vida_util_meses: metric,
                manutencao: MaintenanceMetrics { metrics: metric, unit: MaintenanceUnit::Fraction },
            },
            sources: Sources::default(),
        }
    }

    fn item(doc_id: &str, score: f32) -> RerankedItem {
        RerankedItem {
            doc_id: doc_id.to_string(),
            bm25_norm: score,
            rank_score_final: score,
            classification: ClassifiedDoc {
                doc_type: DocType::Equipamento,
                category: DocCategory::Vassoura,
                has_accessory_terms: false,
                has_category_terms: true,
                has_model_number_match: false,
            },
        }
    }

    #[test]
    fn caps_each_subtype_at_configured_max() {
        let docs = vec![
            doc("D1", "vassoura de piso fina", DocCategory::Vassoura),
            doc("D2", "vassoura de piso fina", DocCategory::Vassoura),
            doc("D3", "vassoura gari", DocCategory::Vassoura),
        ];
        let items = vec![item("D1", 0.9), item("D2", 0.8), item("D3", 0.7)];
        let config = EngineConfig::default();
        let result = diversify(
            &items,
            |id| docs.iter().find(|d| d.id == id).cloned(),
            DocCategory::Vassoura,
            3,
            &config,
        );
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].doc_id, "D1");
        assert_eq!(result[1].doc_id, "D3");
    }

    #[test]
    fn navigation_intent_requires_single_token_bare_category() {
        let parsed = crate::parsed_query::parse_query("vassoura");
        assert!(is_navigation_intent(&parsed));
        let parsed_with_modifier = crate::parsed_query::parse_query("vassoura gari");
        assert!(!is_navigation_intent(&parsed_with_modifier));
    }
}

//! Document-side classification against the same closed taxonomy used by
//! query parsing.

use equisearch_core::{taxonomy, DocCategory, DocType, Document};

use crate::parsed_query::extract_model_numbers;

/// Per-document classification result used by the rerank scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedDoc {
    pub doc_type: DocType,
    pub category: DocCategory,
    pub has_accessory_terms: bool,
    pub has_category_terms: bool,
    pub has_model_number_match: bool,
}

/// Classify `doc` against `query_model_numbers`. A document's persisted
/// `doc_type` (set by the aggregator) is used verbatim; it is never
/// re-derived at query time.
pub fn classify_doc(doc: &Document, query_model_numbers: &[String]) -> ClassifiedDoc {
    let tokens: Vec<&str> = doc.text.split_whitespace().collect();
    let has_accessory_terms = tokens.iter().any(|t| taxonomy::canonical_accessory(t).is_some());
    let has_category_terms = doc.doc_category != DocCategory::Unknown;

    let doc_type = doc.doc_type;

    let doc_model_numbers = extract_model_numbers(&doc.text);
    let has_model_number_match = query_model_numbers
        .iter()
        .any(|qm| doc_model_numbers.iter().any(|dm| dm == qm));

    ClassifiedDoc {
        doc_type,
        category: doc.doc_category,
        has_accessory_terms,
        has_category_terms,
        has_model_number_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equisearch_core::{MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources};

    fn doc(text: &str, category: DocCategory, doc_type: DocType) -> Document {
        let metric = NumericMetrics {
            display: 1.0,
            mean: 1.0,
            median: 1.0,
            min: 1.0,
            max: 1.0,
            n: 1,
        };
        Document {
            id: "DOC_00001".to_string(),
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
    fn model_number_match_detected_via_digit_run_intersection() {
        let d = doc("enceradeira modelo x510", DocCategory::Enceradeira, DocType::Equipamento);
        let result = classify_doc(&d, &["510".to_string()]);
        assert!(result.has_model_number_match);
    }

    #[test]
    fn no_model_numbers_in_query_means_no_match() {
        let d = doc("enceradeira modelo x510", DocCategory::Enceradeira, DocType::Equipamento);
        let result = classify_doc(&d, &[]);
        assert!(!result.has_model_number_match);
    }

    #[test]
    fn persisted_doc_type_used_verbatim() {
        let d = doc("disco de polimento", DocCategory::Unknown, DocType::Acessorio);
        let result = classify_doc(&d, &[]);
        assert_eq!(result.doc_type, DocType::Acessorio);
        assert!(result.has_accessory_terms);
    }
}

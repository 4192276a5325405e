//! The persisted aggregation output: metadata plus the document corpus.

use equisearch_core::Document;
use serde::{Deserialize, Serialize};

/// Provenance and summary statistics recorded alongside the corpus, so a
/// consumer of the JSON file doesn't need to recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub version: String,
    pub aggregation_method: String,
    pub display_value_method: String,
    pub original_rows: usize,
    pub unique_equipments: usize,
    pub exported_at: u64,
}

/// The full output of `build-dataset`: one document per canonical
/// equipment, plus the metadata a consumer needs to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub metadata: DatasetMetadata,
    pub corpus: Vec<Document>,
}

impl Dataset {
    pub fn new(corpus: Vec<Document>, original_rows: usize) -> Self {
        let exported_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Dataset {
            metadata: DatasetMetadata {
                version: "1".to_string(),
                aggregation_method: "group-by-normalized-description".to_string(),
                display_value_method: "median".to_string(),
                original_rows,
                unique_equipments: corpus.len(),
                exported_at,
            },
            corpus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equisearch_core::{
        DocCategory, DocType, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources,
    };

    fn doc(id: &str) -> Document {
        let metric = NumericMetrics { display: 1.0, mean: 1.0, median: 1.0, min: 1.0, max: 1.0, n: 1 };
        Document {
            id: id.to_string(),
            equipment_id: "mop industrial".to_string(),
            title: "Mop Industrial".to_string(),
            text: "mop industrial".to_string(),
            raw_text: "Mop Industrial".to_string(),
            semantic_text: "Mop Industrial".to_string(),
            doc_category: DocCategory::Mop,
            doc_type: DocType::Equipamento,
            metrics: Metrics {
                valor_unitario: metric,
                vida_util_meses: metric,
                manutencao: MaintenanceMetrics { metrics: metric, unit: MaintenanceUnit::Fraction },
            },
            sources: Sources::default(),
        }
    }

    #[test]
    fn new_dataset_summarizes_corpus_size() {
        let dataset = Dataset::new(vec![doc("DOC_00001")], 3);
        assert_eq!(dataset.metadata.unique_equipments, 1);
        assert_eq!(dataset.metadata.original_rows, 3);
        assert_eq!(dataset.metadata.display_value_method, "median");
    }
}

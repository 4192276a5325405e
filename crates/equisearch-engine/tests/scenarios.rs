//! End-to-end pipeline scenarios run against a full `IntegratedEngine`.

use equisearch_core::{
    DocCategory, DocType, EngineConfig, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics, Sources,
};
use equisearch_engine::IntegratedEngine;

fn metric(value: f64) -> NumericMetrics {
    NumericMetrics { display: value, mean: value, median: value, min: value * 0.8, max: value * 1.2, n: 4 }
}

fn doc(id: &str, title: &str, category: DocCategory, doc_type: DocType) -> equisearch_core::Document {
    let text = equisearch_normalize::normalize_equip(title);
    equisearch_core::Document {
        id: id.to_string(),
        equipment_id: text.clone(),
        title: title.to_string(),
        text,
        raw_text: title.to_string(),
        semantic_text: title.to_string(),
        doc_category: category,
        doc_type,
        metrics: Metrics {
            valor_unitario: metric(100.0),
            vida_util_meses: metric(24.0),
            manutencao: MaintenanceMetrics { metrics: metric(0.05), unit: MaintenanceUnit::Fraction },
        },
        sources: Sources::default(),
    }
}

fn vassoura_corpus() -> Vec<equisearch_core::Document> {
    let variants = [
        "vassoura de piacava",
        "vassoura de nylon",
        "vassoura sanitaria",
        "vassoura gari",
        "vassoura de piso fina",
        "vassoura de teto",
        "vassoura industrial",
        "vassoura capim",
        "vassoura multiuso",
        "vassoura de pelo",
    ];
    variants
        .iter()
        .enumerate()
        .map(|(i, title)| doc(&format!("DOC_{:05}", i + 1), title, DocCategory::Vassoura, DocType::Equipamento))
        .collect()
}

#[test]
fn navigation_intent_returns_diverse_subtypes() {
    let engine = IntegratedEngine::build(vassoura_corpus(), EngineConfig::default()).unwrap();
    let response = engine.search("vassoura", 5).unwrap();

    assert_eq!(response.resultados.len(), 5);
    for item in &response.resultados {
        assert!(item.grupo.contains("vassoura"));
    }

    let subtype_count = response
        .resultados
        .iter()
        .map(|item| item.grupo.replace("vassoura", "").trim().to_string())
        .collect::<std::collections::HashSet<_>>()
        .len();
    assert!(subtype_count >= 3, "expected at least 3 distinct subtypes, got {subtype_count}");
}

fn confidence_corpus() -> Vec<equisearch_core::Document> {
    vec![
        doc("DOC_00001", "Enceradeira Industrial 510mm Motor Potente", DocCategory::Enceradeira, DocType::Equipamento),
        doc("DOC_00002", "Mop Industrial Microfibra", DocCategory::Mop, DocType::Equipamento),
        doc("DOC_00003", "Aspirador de Po Industrial", DocCategory::Aspirador, DocType::Equipamento),
    ]
}

#[test]
fn bare_category_query_has_lower_confidence_than_specific_query() {
    let engine = IntegratedEngine::build(confidence_corpus(), EngineConfig::default()).unwrap();

    let bare = engine.search("enceradeira", 3).unwrap();
    // specificityMultiplier for a bare single-token query is 0.7 + 0.3*0.3 = 0.79.
    assert!((bare.confianca.score - 0.79).abs() < 1e-3);

    let specific = engine.search("enceradeira 510 mm", 3).unwrap();
    assert!(specific.confianca.score > bare.confianca.score);

    if specific.resultados.len() >= 2 {
        assert!(specific.resultados[0].confidence_item > specific.resultados[1].confidence_item || (specific.resultados[0].confidence_item - specific.resultados[1].confidence_item).abs() < 1e-6);
    }
}

#[test]
fn index_persists_and_reloads_to_identical_results() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.bin");

    let first = IntegratedEngine::load_or_build(confidence_corpus(), EngineConfig::default(), &index_path).unwrap();
    let baseline = first.search("enceradeira industrial", 3).unwrap();

    let second = IntegratedEngine::load_or_build(confidence_corpus(), EngineConfig::default(), &index_path).unwrap();
    let reloaded = second.search("enceradeira industrial", 3).unwrap();

    let baseline_ids: Vec<&str> = baseline.resultados.iter().map(|r| r.grupo.as_str()).collect();
    let reloaded_ids: Vec<&str> = reloaded.resultados.iter().map(|r| r.grupo.as_str()).collect();
    assert_eq!(baseline_ids, reloaded_ids);

    let mut bytes = std::fs::read(&index_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&index_path, bytes).unwrap();

    let third = IntegratedEngine::load_or_build(confidence_corpus(), EngineConfig::default(), &index_path).unwrap();
    let rebuilt = third.search("enceradeira industrial", 3).unwrap();
    let rebuilt_ids: Vec<&str> = rebuilt.resultados.iter().map(|r| r.grupo.as_str()).collect();
    assert_eq!(baseline_ids, rebuilt_ids);
}

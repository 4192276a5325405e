//! Collapses many supplier rows into one document per canonical equipment.

use std::collections::{BTreeSet, HashMap};

use equisearch_core::{
    DocCategory, DocType, Document, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics,
    Sources, taxonomy,
};

use crate::row::{parse_brazilian_decimal, SourceRow};

/// Non-fatal aggregation statistics, printed by the CLI after a build.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub original_rows: usize,
    pub unique_equipments: usize,
    pub duplicate_equipment_ids: usize,
    pub valor_unitario_coverage_pct: f32,
    pub vida_util_coverage_pct: f32,
    pub manutencao_coverage_pct: f32,
}

struct Group {
    title: String,
    unit_prices: Vec<f64>,
    useful_lives: Vec<f64>,
    maintenance_fractions: Vec<f64>,
    fornecedores: BTreeSet<String>,
    bids: BTreeSet<String>,
    marcas: BTreeSet<String>,
    n_linhas: u32,
}

fn classify(normalized_text: &str) -> (DocCategory, DocType) {
    let category = DocCategory::detect_in(normalized_text);
    let has_accessory = normalized_text
        .split_whitespace()
        .any(|t| taxonomy::canonical_accessory(t).is_some());
    let doc_type = if has_accessory {
        DocType::Acessorio
    } else if category != DocCategory::Unknown {
        DocType::Equipamento
    } else {
        DocType::Indefinido
    };
    (category, doc_type)
}

fn push_nonempty(set: &mut BTreeSet<String>, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        set.insert(trimmed.to_string());
    }
}

fn coverage_pct(groups: &HashMap<String, Group>, extract: impl Fn(&Group) -> bool) -> f32 {
    if groups.is_empty() {
        return 0.0;
    }
    let covered = groups.values().filter(|g| extract(g)).count();
    100.0 * covered as f32 / groups.len() as f32
}

/// Aggregate supplier rows into documents plus a non-fatal validation
/// report (spec "Dataset Aggregator").
pub fn aggregate(rows: &[SourceRow]) -> (Vec<Document>, ValidationReport) {
    let mut groups: HashMap<String, Group> = HashMap::new();
    // `DOC_NNNNN` ids are assigned in first-seen order of `equipmentId`
    // (spec "Dataset Aggregator"); a plain `HashMap` iteration order is
    // unspecified, so insertion order is tracked here explicitly.
    let mut first_seen_order: Vec<String> = Vec::new();

    for row in rows {
        let equipment_id = equisearch_normalize::normalize_text(&row.standardized_description);
        if equipment_id.is_empty() {
            continue;
        }
        if !groups.contains_key(&equipment_id) {
            first_seen_order.push(equipment_id.clone());
        }

        let group = groups.entry(equipment_id).or_insert_with(|| Group {
            title: row.standardized_description.trim().to_string(),
            unit_prices: Vec::new(),
            useful_lives: Vec::new(),
            maintenance_fractions: Vec::new(),
            fornecedores: BTreeSet::new(),
            bids: BTreeSet::new(),
            marcas: BTreeSet::new(),
            n_linhas: 0,
        });

        if let Some(price) = parse_brazilian_decimal(&row.unit_price) {
            if price > 0.0 {
                group.unit_prices.push(price);
            }
        }
        if let Some(life) = parse_brazilian_decimal(&row.useful_life_months) {
            if life > 0.0 {
                group.useful_lives.push(life);
            }
        }
        if let Some(maintenance) = parse_brazilian_decimal(&row.maintenance) {
            if maintenance > 0.0 {
                let fraction = if maintenance > 1.0 { maintenance / 100.0 } else { maintenance };
                group.maintenance_fractions.push(fraction);
            }
        }

        push_nonempty(&mut group.fornecedores, &row.fornecedor);
        push_nonempty(&mut group.bids, &row.bid);
        push_nonempty(&mut group.marcas, &row.marca);
        group.n_linhas += 1;
    }

    let zero_metric = NumericMetrics { display: 0.0, mean: 0.0, median: 0.0, min: 0.0, max: 0.0, n: 0 };

    let mut documents = Vec::with_capacity(groups.len());
    for (sequence, equipment_id) in first_seen_order.iter().enumerate() {
        let group = &groups[equipment_id];
        let raw_text = group.title.clone();
        let text = equisearch_normalize::normalize_equip(&raw_text);
        let (doc_category, doc_type) = classify(&text);

        let valor_unitario = NumericMetrics::from_values(&group.unit_prices).unwrap_or(zero_metric);
        let vida_util_meses = NumericMetrics::from_values(&group.useful_lives).unwrap_or(zero_metric);
        let manutencao_metrics =
            NumericMetrics::from_values(&group.maintenance_fractions).unwrap_or(zero_metric);

        let semantic_text = format!(
            "{} | Fornecedor: {} | Marca: {} | Fonte: {}",
            raw_text,
            group.fornecedores.iter().cloned().collect::<Vec<_>>().join(", "),
            group.marcas.iter().cloned().collect::<Vec<_>>().join(", "),
            group.bids.iter().cloned().collect::<Vec<_>>().join(", "),
        );

        documents.push(Document {
            id: format!("DOC_{:05}", sequence + 1),
            equipment_id: equipment_id.clone(),
            title: group.title.clone(),
            text,
            raw_text,
            semantic_text,
            doc_category,
            doc_type,
            metrics: Metrics {
                valor_unitario,
                vida_util_meses,
                manutencao: MaintenanceMetrics { metrics: manutencao_metrics, unit: MaintenanceUnit::Fraction },
            },
            sources: Sources {
                fornecedores: group.fornecedores.clone(),
                bids: group.bids.clone(),
                marcas: group.marcas.clone(),
                n_linhas: group.n_linhas,
            },
        });
    }

    // Post-aggregation invariant check (spec "Validation pass"): since
    // `documents` is built one-per-key from `groups`, this should always
    // come out zero. A non-zero count means the grouping key collided
    // with itself during emission, which is a bug, not expected input.
    let mut seen_equipment_ids = std::collections::HashSet::with_capacity(documents.len());
    let duplicate_equipment_ids = documents
        .iter()
        .filter(|d| !seen_equipment_ids.insert(d.equipment_id.as_str()))
        .count();

    let report = ValidationReport {
        original_rows: rows.len(),
        unique_equipments: groups.len(),
        duplicate_equipment_ids,
        valor_unitario_coverage_pct: coverage_pct(&groups, |g| !g.unit_prices.is_empty()),
        vida_util_coverage_pct: coverage_pct(&groups, |g| !g.useful_lives.is_empty()),
        manutencao_coverage_pct: coverage_pct(&groups, |g| !g.maintenance_fractions.is_empty()),
    };

    (documents, report)
}

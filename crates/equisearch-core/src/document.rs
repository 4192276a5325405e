//! The post-aggregation data model (spec section 3): one `Document` per
//! canonical equipment, plus the numeric/provenance statistics rolled up
//! from many supplier rows.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Closed equipment-category taxonomy shared by the aggregator (which
/// persists `doc_category` at build time) and the reranker (which reads it
/// back, never re-classifying at query time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocCategory {
    Mop,
    Vassoura,
    Enceradeira,
    Lavadora,
    Aspirador,
    Extratora,
    Varredeira,
    Polidora,
    Carrinho,
    Unknown,
}

impl DocCategory {
    /// The closed set of category tokens, in the order the query-time
    /// parser scans for the first match (spec 4.6 `mainCategory`).
    pub const ALL: [DocCategory; 9] = [
        DocCategory::Mop,
        DocCategory::Vassoura,
        DocCategory::Enceradeira,
        DocCategory::Lavadora,
        DocCategory::Aspirador,
        DocCategory::Extratora,
        DocCategory::Varredeira,
        DocCategory::Polidora,
        DocCategory::Carrinho,
    ];

    /// `SCREAMING_SNAKE_CASE` variant name, matching this enum's serde
    /// rename and the key operators use in `categories.tsv` to override
    /// a category's surface token (spec section 6).
    fn variant_key(self) -> Option<&'static str> {
        Some(match self {
            DocCategory::Mop => "MOP",
            DocCategory::Vassoura => "VASSOURA",
            DocCategory::Enceradeira => "ENCERADEIRA",
            DocCategory::Lavadora => "LAVADORA",
            DocCategory::Aspirador => "ASPIRADOR",
            DocCategory::Extratora => "EXTRATORA",
            DocCategory::Varredeira => "VARREDEIRA",
            DocCategory::Polidora => "POLIDORA",
            DocCategory::Carrinho => "CARRINHO",
            DocCategory::Unknown => return None,
        })
    }

    /// The normalized Portuguese surface token for this category, or
    /// `None` for `Unknown` (which has no surface form of its own). A
    /// file-supplied `categories.tsv` override (see [`crate::taxonomy`])
    /// takes precedence over the compiled-in default.
    pub fn token(self) -> Option<&'static str> {
        let variant_key = self.variant_key()?;
        if let Some(overridden) = crate::taxonomy::category_token_override(variant_key) {
            return Some(overridden);
        }
        Some(match self {
            DocCategory::Mop => "mop",
            DocCategory::Vassoura => "vassoura",
            DocCategory::Enceradeira => "enceradeira",
            DocCategory::Lavadora => "lavadora",
            DocCategory::Aspirador => "aspirador",
            DocCategory::Extratora => "extratora",
            DocCategory::Varredeira => "varredeira",
            DocCategory::Polidora => "polidora",
            DocCategory::Carrinho => "carrinho",
            DocCategory::Unknown => return None,
        })
    }

    /// Classify a normalized text by the first category token it contains.
    pub fn detect_in(normalized_text: &str) -> DocCategory {
        let tokens: Vec<&str> = normalized_text.split_whitespace().collect();
        for category in DocCategory::ALL {
            let Some(token) = category.token() else { continue };
            if tokens.iter().any(|t| *t == token) {
                return category;
            }
        }
        DocCategory::Unknown
    }
}

/// A document's (or, at query time, a parsed query's) inferred target
/// type along the equipment/accessory axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocType {
    Equipamento,
    Acessorio,
    Indefinido,
}

/// Whether a maintenance metric's `display`/`mean`/etc. values are stored
/// as a fraction in `[0, inf)` or a whole percentage. The aggregator always
/// emits `Fraction` (spec 4.9 step 4 divides percent inputs by 100 before
/// this type is constructed); the variant is kept so the type can't silently
/// be misread if that convention ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceUnit {
    Fraction,
    Percent,
}

/// Aggregate numeric statistics for one metric field across all supplier
/// rows contributing to a document.
///
/// Invariant: `min <= median <= max`, `min <= mean <= max`, and `n` equals
/// the count of finite positive source values that contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericMetrics {
    /// The value surfaced to users: the median by default (spec 4.9 step 5).
    pub display: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub n: u32,
}

impl NumericMetrics {
    /// Compute mean/median/min/max/n over a slice of finite positive
    /// values. Returns `None` for an empty slice (no contributing rows).
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("values are finite"));

        let n = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mean = sum / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        let min = sorted[0];
        let max = sorted[n - 1];

        Some(Self {
            display: median,
            mean,
            median,
            min,
            max,
            n: n as u32,
        })
    }
}

/// Maintenance metric, always stored as a fraction internally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceMetrics {
    #[serde(flatten)]
    pub metrics: NumericMetrics,
    pub unit: MaintenanceUnit,
}

/// The three metric families tracked per document (spec section 3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub valor_unitario: NumericMetrics,
    pub vida_util_meses: NumericMetrics,
    pub manutencao: MaintenanceMetrics,
}

/// Provenance rolled up from the supplier rows that contributed to a
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sources {
    pub fornecedores: BTreeSet<String>,
    pub bids: BTreeSet<String>,
    pub marcas: BTreeSet<String>,
    pub n_linhas: u32,
}

/// One indexed entity: one logical equipment, aggregated from many
/// supplier rows (spec section 3, "Document").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Opaque id, stable across builds of the same corpus (`DOC_00001`, ...).
    pub id: String,
    /// Canonical key: normalized standardized description. Unique per document.
    pub equipment_id: String,
    /// Human-readable original description.
    pub title: String,
    /// Normalized text used for indexing and matching.
    pub text: String,
    /// Original, unnormalized display text.
    pub raw_text: String,
    /// Enriched text optionally used by external embedding providers.
    pub semantic_text: String,
    pub doc_category: DocCategory,
    pub doc_type: DocType,
    pub metrics: Metrics,
    pub sources: Sources,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_metrics_odd_count_median_is_middle_value() {
        let m = NumericMetrics::from_values(&[10.0, 5.0, 20.0]).unwrap();
        assert_eq!(m.median, 10.0);
        assert_eq!(m.min, 5.0);
        assert_eq!(m.max, 20.0);
        assert_eq!(m.n, 3);
        assert_eq!(m.display, m.median);
    }

    #[test]
    fn numeric_metrics_even_count_median_is_average_of_middle_two() {
        let m = NumericMetrics::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.median, 2.5);
        assert!(m.min <= m.median && m.median <= m.max);
        assert!(m.min <= m.mean && m.mean <= m.max);
    }

    #[test]
    fn numeric_metrics_empty_is_none() {
        assert!(NumericMetrics::from_values(&[]).is_none());
    }

    #[test]
    fn category_detection_finds_first_matching_token() {
        assert_eq!(
            DocCategory::detect_in("enceradeira de piso 510 mm"),
            DocCategory::Enceradeira
        );
        assert_eq!(DocCategory::detect_in("disco para polir"), DocCategory::Unknown);
    }
}

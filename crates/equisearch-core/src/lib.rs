//! Shared data model, error taxonomy, and environment configuration for
//! the equisearch equipment-search engine.
//!
//! This crate has no behavior of its own beyond small value-type helpers
//! (`NumericMetrics::from_values`, `DocCategory::detect_in`); it exists so
//! that `equisearch-normalize`, `equisearch-retrieve`, `equisearch-rerank`,
//! `equisearch-aggregate`, and `equisearch-engine` can all speak the same
//! `Document`/`EquisearchError` vocabulary without depending on each other.

pub mod config;
pub mod document;
pub mod error;

pub use config::EngineConfig;
pub use document::{
    DocCategory, DocType, Document, MaintenanceMetrics, MaintenanceUnit, Metrics, NumericMetrics,
    Sources,
};
pub use error::{EquisearchError, EquisearchResult};

/// Closed accessory-term taxonomy (spec section 4.6), canonicalized to
/// singular. Shared between the reranker (query/doc classification) and
/// the aggregator (doc-time classification must use the same set).
///
/// These tables double as operator-editable static mapping tables (spec
/// section 6): [`load_overrides`] reads plain-text files under a fixed
/// directory at startup and, for any table a file actually supplies,
/// shadows the compiled-in defaults below for the rest of the process.
/// A missing or malformed file is not an error — it just leaves the
/// built-in table in place, logged at `warn`.
pub mod taxonomy {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::OnceLock;

    /// Accessory surface forms, mapped to their singular canonical form.
    /// Order matters only for readability; lookups are by exact match.
    pub const ACCESSORY_TERMS: &[(&str, &str)] = &[
        ("disco", "disco"),
        ("discos", "disco"),
        ("escova", "escova"),
        ("escovas", "escova"),
        ("refil", "refil"),
        ("refis", "refil"),
        ("pad", "pad"),
        ("pads", "pad"),
        ("rodo", "rodo"),
        ("rodos", "rodo"),
        ("balde", "balde"),
        ("baldes", "balde"),
        ("espremedor", "espremedor"),
        ("espremedores", "espremedor"),
        ("saco", "saco"),
        ("sacos", "saco"),
    ];

    /// Connector/stopword tokens stripped when building a core query from
    /// an equipment-intent query that also carries accessory terms
    /// (spec section 4.6, `buildCoreQuery`).
    pub const CONNECTORS: &[&str] = &["c", "com", "e", "para", "de", "da", "do", "a", "o"];

    /// Stopwords removed (along with the category token) when computing a
    /// subtype key for navigation-intent diversification (spec 4.7).
    pub const DIVERSIFIER_STOPWORDS: &[&str] = &["de", "da", "do", "para", "com", "e", "sem"];

    struct Overrides {
        accessory_terms: HashMap<String, String>,
        connectors: Vec<String>,
        diversifier_stopwords: Vec<String>,
        category_tokens: HashMap<String, String>,
    }

    static OVERRIDES: OnceLock<Overrides> = OnceLock::new();

    fn read_pair_table(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .filter_map(|line| {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        return None;
                    }
                    let mut parts = line.splitn(2, '\t');
                    let key = parts.next()?.trim();
                    let value = parts.next()?.trim();
                    Some((key.to_string(), value.to_string()))
                })
                .collect(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "static table not found, using built-in defaults");
                HashMap::new()
            }
        }
    }

    fn read_line_list(path: &Path) -> Vec<String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "static table not found, using built-in defaults");
                Vec::new()
            }
        }
    }

    /// Load `accessories.tsv`, `connectors.txt`, `diversifier_stopwords.txt`,
    /// and `categories.tsv` from `dir` (spec section 6: "loaded at
    /// startup, read-only"). Only the first call in a process has effect;
    /// later calls are no-ops, matching a once-at-boot config load.
    pub fn load_overrides(dir: &Path) {
        OVERRIDES.get_or_init(|| Overrides {
            accessory_terms: read_pair_table(&dir.join("accessories.tsv")),
            connectors: read_line_list(&dir.join("connectors.txt")),
            diversifier_stopwords: read_line_list(&dir.join("diversifier_stopwords.txt")),
            category_tokens: read_pair_table(&dir.join("categories.tsv")),
        });
    }

    /// Canonicalize an accessory surface form to its singular, if it is one.
    pub fn canonical_accessory(token: &str) -> Option<&'static str> {
        if let Some(overrides) = OVERRIDES.get() {
            if let Some(canonical) = overrides.accessory_terms.get(token) {
                return Some(canonical.as_str());
            }
            if !overrides.accessory_terms.is_empty() {
                return None;
            }
        }
        ACCESSORY_TERMS
            .iter()
            .find(|(surface, _)| *surface == token)
            .map(|(_, canonical)| *canonical)
    }

    pub fn is_connector(token: &str) -> bool {
        match OVERRIDES.get() {
            Some(overrides) if !overrides.connectors.is_empty() => {
                overrides.connectors.iter().any(|c| c == token)
            }
            _ => CONNECTORS.contains(&token),
        }
    }

    pub fn is_diversifier_stopword(token: &str) -> bool {
        match OVERRIDES.get() {
            Some(overrides) if !overrides.diversifier_stopwords.is_empty() => {
                overrides.diversifier_stopwords.iter().any(|s| s == token)
            }
            _ => DIVERSIFIER_STOPWORDS.contains(&token),
        }
    }

    /// File-supplied surface-token override for a `DocCategory` variant,
    /// keyed by its `SCREAMING_SNAKE_CASE` name. Used by
    /// [`crate::document::DocCategory::token`]; `None` means "use the
    /// compiled-in default for this variant."
    pub(crate) fn category_token_override(variant_key: &str) -> Option<&'static str> {
        OVERRIDES.get()?.category_tokens.get(variant_key).map(String::as_str)
    }
}

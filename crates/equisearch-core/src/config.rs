//! Environment-driven configuration (spec section 6).
//!
//! Every variable is optional; an absent or malformed value falls back to
//! its documented default and (for malformed-but-present values) logs a
//! warning rather than aborting startup. Only `CorpusMalformed` is fatal
//! per the error taxonomy in spec section 7, and this module never raises it.

/// Top-level engine configuration assembled from environment variables at
/// startup.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub reranker_enabled: bool,
    pub nav_intent_enabled: bool,
    pub nav_max_per_subtype: usize,
    pub nav_max_candidate_mult: usize,
    pub confidence_temperature: f32,
    pub confidence_use_specificity: bool,
    pub rerank_bm25_weight: f32,
    pub rerank_model_boost: f32,
    pub rerank_category_boost: f32,
    pub rerank_accessory_penalty: f32,
    pub rerank_missing_model_penalty: f32,
    /// Subtraction applied when accessory terms co-occur with an
    /// EQUIPAMENTO-intent query. `None` (the default) disables it — spec:
    /// "optional, behind a feature flag", unexercised by any scenario.
    pub rerank_mixed_query_penalty: Option<f32>,
    pub rerank_hard_top1_equipment: bool,
    pub accessory_bonus_enabled: bool,
    pub max_top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reranker_enabled: true,
            nav_intent_enabled: true,
            nav_max_per_subtype: 1,
            nav_max_candidate_mult: 8,
            confidence_temperature: 1.2,
            confidence_use_specificity: true,
            rerank_bm25_weight: 0.35,
            rerank_model_boost: 0.45,
            rerank_category_boost: 0.30,
            rerank_accessory_penalty: 0.95,
            rerank_missing_model_penalty: 0.55,
            rerank_mixed_query_penalty: None,
            rerank_hard_top1_equipment: true,
            accessory_bonus_enabled: true,
            max_top_k: 30,
        }
    }
}

impl EngineConfig {
    /// Build configuration from the process environment, falling back to
    /// defaults (with a logged warning) for any variable that is present
    /// but fails to parse or violates its stated bounds.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reranker_enabled: read_bool("SEARCH_RERANKER_ENABLED", defaults.reranker_enabled),
            nav_intent_enabled: read_bool(
                "SEARCH_NAV_INTENT_ENABLED",
                defaults.nav_intent_enabled,
            ),
            nav_max_per_subtype: read_usize_min(
                "SEARCH_NAV_MAX_PER_SUBTYPE",
                defaults.nav_max_per_subtype,
                1,
            ),
            nav_max_candidate_mult: read_usize_min(
                "SEARCH_NAV_MAX_CANDIDATE_MULT",
                defaults.nav_max_candidate_mult,
                1,
            ),
            confidence_temperature: read_f32_range(
                "CONF_TEMPERATURE",
                defaults.confidence_temperature,
                0.5,
                2.5,
            ),
            confidence_use_specificity: read_bool(
                "CONF_USE_SPECIFICITY",
                defaults.confidence_use_specificity,
            ),
            rerank_bm25_weight: read_f32("RERANK_BM25_WEIGHT", defaults.rerank_bm25_weight),
            rerank_model_boost: read_f32("RERANK_MODEL_BOOST", defaults.rerank_model_boost),
            rerank_category_boost: read_f32(
                "RERANK_CATEGORY_BOOST",
                defaults.rerank_category_boost,
            ),
            rerank_accessory_penalty: read_f32(
                "RERANK_ACCESSORY_PENALTY",
                defaults.rerank_accessory_penalty,
            ),
            rerank_missing_model_penalty: read_f32(
                "RERANK_MISSING_MODEL_PENALTY",
                defaults.rerank_missing_model_penalty,
            ),
            rerank_mixed_query_penalty: read_f32_opt("RERANK_MIXED_QUERY_PENALTY"),
            rerank_hard_top1_equipment: read_bool(
                "RERANK_HARD_TOP1_EQUIPMENT",
                defaults.rerank_hard_top1_equipment,
            ),
            accessory_bonus_enabled: read_bool(
                "SEARCH_ACCESSORY_BONUS_ENABLED",
                defaults.accessory_bonus_enabled,
            ),
            max_top_k: read_usize_min("MAX_TOP_K", defaults.max_top_k, 1),
        }
    }
}

fn read_bool(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Err(_) => default,
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(var, raw, "could not parse boolean env var, using default");
                default
            }
        },
    }
}

fn read_f32(var: &str, default: f32) -> f32 {
    match std::env::var(var) {
        Err(_) => default,
        Ok(raw) => raw.trim().parse::<f32>().unwrap_or_else(|_| {
            tracing::warn!(var, raw, "could not parse float env var, using default");
            default
        }),
    }
}

fn read_f32_range(var: &str, default: f32, min: f32, max: f32) -> f32 {
    let value = read_f32(var, default);
    value.clamp(min, max)
}

/// Unlike [`read_f32`], absence means "feature disabled", not "use a
/// numeric default" — there is no default weight for this penalty.
fn read_f32_opt(var: &str) -> Option<f32> {
    match std::env::var(var) {
        Err(_) => None,
        Ok(raw) => match raw.trim().parse::<f32>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(var, raw, "could not parse float env var, leaving feature disabled");
                None
            }
        },
    }
}

fn read_usize_min(var: &str, default: usize, min: usize) -> usize {
    match std::env::var(var) {
        Err(_) => default,
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(v) if v >= min => v,
            _ => {
                tracing::warn!(var, raw, "could not parse integer env var, using default");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = EngineConfig::default();
        assert_eq!(c.nav_max_per_subtype, 1);
        assert_eq!(c.nav_max_candidate_mult, 8);
        assert_eq!(c.confidence_temperature, 1.2);
        assert_eq!(c.max_top_k, 30);
        assert!(c.reranker_enabled && c.nav_intent_enabled);
        assert_eq!(c.rerank_mixed_query_penalty, None);
    }

    #[test]
    fn read_f32_opt_is_none_when_absent_or_malformed() {
        std::env::remove_var("EQUISEARCH_TEST_OPT_PENALTY");
        assert_eq!(read_f32_opt("EQUISEARCH_TEST_OPT_PENALTY"), None);
        std::env::set_var("EQUISEARCH_TEST_OPT_PENALTY", "not-a-number");
        assert_eq!(read_f32_opt("EQUISEARCH_TEST_OPT_PENALTY"), None);
        std::env::set_var("EQUISEARCH_TEST_OPT_PENALTY", "0.2");
        assert_eq!(read_f32_opt("EQUISEARCH_TEST_OPT_PENALTY"), Some(0.2));
        std::env::remove_var("EQUISEARCH_TEST_OPT_PENALTY");
    }

    #[test]
    fn read_bool_accepts_common_spellings() {
        std::env::set_var("EQUISEARCH_TEST_BOOL", "yes");
        assert!(read_bool("EQUISEARCH_TEST_BOOL", false));
        std::env::set_var("EQUISEARCH_TEST_BOOL", "off");
        assert!(!read_bool("EQUISEARCH_TEST_BOOL", true));
        std::env::remove_var("EQUISEARCH_TEST_BOOL");
    }

    #[test]
    fn read_f32_range_clamps() {
        std::env::set_var("EQUISEARCH_TEST_TEMP", "10.0");
        assert_eq!(read_f32_range("EQUISEARCH_TEST_TEMP", 1.2, 0.5, 2.5), 2.5);
        std::env::remove_var("EQUISEARCH_TEST_TEMP");
    }
}

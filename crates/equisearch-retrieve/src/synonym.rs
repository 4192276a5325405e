//! Static synonym / lemma-group query expansion.
//!
//! Unlike pseudo-relevance feedback, which infers expansion terms from the
//! top-ranked documents of a first retrieval pass, this expander broadens
//! recall from a fixed lemma table decided up front — appropriate when the
//! domain vocabulary (and its synonyms) is closed and known ahead of time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

static SYNONYM_TABLE_OVERRIDE: OnceLock<Vec<(String, Vec<String>)>> = OnceLock::new();

/// Load `synonyms.tsv` (`lemma<TAB>variant1,variant2,...` per line) from
/// `dir`, shadowing [`SynonymExpander::with_defaults`]'s compiled-in table
/// for the rest of the process (spec section 6, "Static mapping
/// tables"). A missing or malformed file leaves the default table in
/// place. Only the first call in a process has effect.
pub fn load_overrides(dir: &Path) {
    SYNONYM_TABLE_OVERRIDE.get_or_init(|| match std::fs::read_to_string(dir.join("synonyms.tsv")) {
        Ok(contents) => contents
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let mut parts = line.splitn(2, '\t');
                let lemma = parts.next()?.trim().to_string();
                let variants: Vec<String> = parts.next()?.split(',').map(|v| v.trim().to_string()).collect();
                Some((lemma, variants))
            })
            .collect(),
        Err(e) => {
            tracing::warn!(path = %dir.join("synonyms.tsv").display(), error = %e, "static table not found, using built-in defaults");
            Vec::new()
        }
    });
}

/// Expander configuration.
#[derive(Debug, Clone)]
pub struct SynonymConfig {
    /// Maximum number of query variants returned by `expand` (including
    /// the original query as the first element). Default: 5.
    pub max_expansions: usize,
}

impl Default for SynonymConfig {
    fn default() -> Self {
        Self { max_expansions: 5 }
    }
}

/// Lemma-to-variants synonym table with reverse (surface form -> lemma)
/// lookup built at construction time.
pub struct SynonymExpander {
    lemma_to_variants: HashMap<String, Vec<String>>,
    surface_to_lemma: HashMap<String, String>,
    config: SynonymConfig,
}

impl SynonymExpander {
    /// Build from an ordered lemma -> variants table, e.g.
    /// `[("mop", vec!["mop", "esfregao"])]`.
    pub fn new(groups: Vec<(&str, Vec<&str>)>, config: SynonymConfig) -> Self {
        let mut lemma_to_variants = HashMap::new();
        let mut surface_to_lemma = HashMap::new();
        for (lemma, variants) in groups {
            let lemma = lemma.to_string();
            let variants: Vec<String> = variants.into_iter().map(str::to_string).collect();
            for variant in &variants {
                surface_to_lemma.insert(variant.clone(), lemma.clone());
            }
            lemma_to_variants.insert(lemma, variants);
        }
        Self {
            lemma_to_variants,
            surface_to_lemma,
            config,
        }
    }

    /// Built-in domain table for equipment/accessory surface forms (spec
    /// "Synonym Expander" default data), unless [`load_overrides`] has
    /// already supplied a file-backed table for this process.
    pub fn with_defaults() -> Self {
        if let Some(groups) = SYNONYM_TABLE_OVERRIDE.get() {
            if !groups.is_empty() {
                let borrowed: Vec<(&str, Vec<&str>)> = groups
                    .iter()
                    .map(|(lemma, variants)| (lemma.as_str(), variants.iter().map(String::as_str).collect()))
                    .collect();
                return Self::new(borrowed, SynonymConfig::default());
            }
        }
        Self::new(
            vec![
                ("mop", vec!["mop", "esfregao"]),
                ("aspirador", vec!["aspirador", "aspiradeira"]),
                ("enceradeira", vec!["enceradeira", "lustradora"]),
                ("lavadora", vec!["lavadora", "lavador", "lavadeira"]),
                ("varredeira", vec!["varredeira", "varredora"]),
                ("carrinho", vec!["carrinho", "carro"]),
                ("balde", vec!["balde", "baldes"]),
                ("rodo", vec!["rodo", "rodos"]),
                ("disco", vec!["disco", "discos"]),
            ],
            SynonymConfig::default(),
        )
    }

    /// Canonical lemma for a surface form, if it belongs to any group.
    pub fn lemma_of(&self, surface: &str) -> Option<&str> {
        self.surface_to_lemma.get(surface).map(String::as_str)
    }

    /// All variants for a surface form's lemma group (including the
    /// surface form itself), or `None` if it has no group.
    pub fn variants_of(&self, surface: &str) -> Option<&[String]> {
        let lemma = self.lemma_of(surface)?;
        self.lemma_to_variants.get(lemma).map(Vec::as_slice)
    }

    /// Expand `query` into an ordered, deduplicated list of variants. The
    /// original query is always first; subsequent variants substitute one
    /// token at a time with an alternative from its synonym group.
    pub fn expand(&self, query: &str) -> Vec<String> {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();

        let original = query.to_lowercase();
        seen.insert(original.clone());
        out.push(original);

        'tokens: for (i, token) in tokens.iter().enumerate() {
            let Some(variants) = self.variants_of(token) else { continue };
            for variant in variants {
                if variant == token {
                    continue;
                }
                let mut substituted: Vec<&str> = tokens.clone();
                substituted[i] = variant.as_str();
                let candidate = substituted.join(" ").to_lowercase();
                if seen.insert(candidate.clone()) {
                    out.push(candidate);
                }
                if out.len() >= self.config.max_expansions {
                    break 'tokens;
                }
            }
        }

        out.truncate(self.config.max_expansions);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_query_is_always_first() {
        let expander = SynonymExpander::with_defaults();
        let variants = expander.expand("mop industrial");
        assert_eq!(variants[0], "mop industrial");
    }

    #[test]
    fn substitutes_synonym_group_members() {
        let expander = SynonymExpander::with_defaults();
        let variants = expander.expand("mop industrial");
        assert!(variants.contains(&"esfregao industrial".to_string()));
    }

    #[test]
    fn caps_at_max_expansions() {
        let config = SynonymConfig { max_expansions: 2 };
        let expander = SynonymExpander::new(
            vec![("lavadora", vec!["lavadora", "lavador", "lavadeira"])],
            config,
        );
        let variants = expander.expand("lavadora eletrica");
        assert!(variants.len() <= 2);
    }

    #[test]
    fn reverse_lookup_finds_canonical_lemma() {
        let expander = SynonymExpander::with_defaults();
        assert_eq!(expander.lemma_of("esfregao"), Some("mop"));
    }

    #[test]
    fn token_without_synonym_group_is_left_alone() {
        let expander = SynonymExpander::with_defaults();
        let variants = expander.expand("xyz industrial");
        assert_eq!(variants, vec!["xyz industrial".to_string()]);
    }
}

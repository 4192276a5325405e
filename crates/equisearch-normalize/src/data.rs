//! Static mapping tables for the normalizer, compiled in as `&'static`
//! slices and used as the fallback baseline whenever no operator-supplied
//! table is present.
//!
//! [`load_overrides`] reads `units.tsv` and `abbreviations.tsv` from a
//! fixed directory, once per process (spec section 6, "Static mapping
//! tables... loaded at startup, read-only"). A missing or malformed file
//! just leaves the compiled-in table below in place.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Unit aliases recognized when joining a `<number><unit>` pair, and the
/// canonical unit token each maps to. `cv` folds into `hp`; `volts` folds
/// into `v`; every other unit maps to itself.
pub const UNIT_ALIASES: &[(&str, &str)] = &[
    ("kva", "kva"),
    ("kw", "kw"),
    ("hp", "hp"),
    ("cv", "hp"),
    ("v", "v"),
    ("volts", "v"),
    ("hz", "hz"),
];

/// Abbreviation / domain-synonym table. A value containing a comma lists
/// multiple equivalent expansions; `normalize_equip` splices in the first
/// one, `expansion_variants_for_query` surfaces the rest.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("asp", "aspirador"),
    ("aspir", "aspirador"),
    ("aspiradr", "aspirador"),
    ("enc", "enceradeira"),
    ("encer", "enceradeira"),
    ("vass", "vassoura"),
    ("varr", "varredeira"),
    ("lav", "lavadora,lavador"),
    ("extr", "extratora"),
    ("pol", "polidora"),
    ("carr", "carrinho,carro"),
    ("ind", "industrial"),
    ("indl", "industrial"),
    ("prof", "profissional"),
    ("profis", "profissional"),
    ("autom", "automatico,automatica"),
    ("elet", "eletrico,eletrica"),
    ("eletr", "eletrico,eletrica"),
    ("mec", "mecanico,mecanica"),
    ("mult", "multiuso"),
    ("portat", "portatil"),
    ("esfregao", "mop,esfregao"),
    ("microf", "microfibra"),
    ("inox", "inox"),
];

struct Overrides {
    units: HashMap<String, String>,
    abbreviations: HashMap<String, String>,
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

/// Load `units.tsv` and `abbreviations.tsv` from `dir`. Only the first
/// call in a process has effect.
pub fn load_overrides(dir: &Path) {
    OVERRIDES.get_or_init(|| Overrides {
        units: read_pair_table(&dir.join("units.tsv")),
        abbreviations: read_pair_table(&dir.join("abbreviations.tsv")),
    });
}

/// Whether `token` is a recognized unit at all (the gate `join_units`
/// checks before fusing it with a preceding number). Consults the
/// file-supplied units table's key set once one has been loaded.
pub fn is_unit(token: &str) -> bool {
    match OVERRIDES.get() {
        Some(overrides) if !overrides.units.is_empty() => overrides.units.contains_key(token),
        _ => UNIT_ALIASES.iter().any(|(alias, _)| *alias == token),
    }
}

pub fn unit_alias(token: &str) -> Option<&'static str> {
    if let Some(overrides) = OVERRIDES.get() {
        if let Some(canonical) = overrides.units.get(token) {
            return Some(canonical.as_str());
        }
        if !overrides.units.is_empty() {
            return None;
        }
    }
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map(|(_, canonical)| *canonical)
}

pub fn abbreviation(token: &str) -> Option<&'static str> {
    if let Some(overrides) = OVERRIDES.get() {
        if let Some(expansion) = overrides.abbreviations.get(token) {
            return Some(expansion.as_str());
        }
        if !overrides.abbreviations.is_empty() {
            return None;
        }
    }
    ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, expansion)| *expansion)
}

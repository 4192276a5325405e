//! Portuguese-language text normalization for the equisearch equipment
//! search engine: the single place that decides what "the same token"
//! means across indexing, querying, and key construction.

mod data;

use unicode_normalization::UnicodeNormalization;

/// Load the file-backed unit-alias and abbreviation tables from `dir`
/// (spec section 6). See [`data::load_overrides`].
pub fn load_data_overrides(dir: &std::path::Path) {
    data::load_overrides(dir);
}

/// Strip combining diacritics via canonical (NFD) decomposition, leaving
/// base Latin letters behind. `"ênfase" -> "enfase"`.
fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F)
}

/// Light Portuguese singularization: strip trailing `es` for tokens longer
/// than 4 characters, else strip trailing `s` for tokens longer than 3.
/// Applied before abbreviation lookup so both `discos` and `disco` resolve
/// to the same entry.
fn singularize(token: &str) -> String {
    let len = token.chars().count();
    if len > 4 && token.ends_with("es") {
        token[..token.len() - 2].to_string()
    } else if len > 3 && token.ends_with('s') {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Replace every non-alphanumeric character with a space, except `.`/`,`
/// between two digits (a decimal separator), then collapse consecutive
/// whitespace. Brackets and parentheses fall out naturally since they are
/// non-alphanumeric; a `.`/`,` not flanked by digits on both sides (e.g.
/// an ellipsis or a trailing comma) is dropped the same as any other
/// punctuation. Keeping the separator attached is what lets
/// [`join_units`] fuse a decimal number like `2,5` with a following unit
/// instead of just fusing its last digit run.
fn strip_non_alnum(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut replaced = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let is_decimal_separator = (c == '.' || c == ',')
            && i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_ascii_digit()
            && chars[i + 1].is_ascii_digit();
        if c.is_ascii_alphanumeric() || is_decimal_separator {
            replaced.push(c);
        } else {
            replaced.push(' ');
        }
    }
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join a `<number>` token (optionally carrying one `.`/`,` decimal
/// separator, e.g. `2,5`) followed immediately by a recognized unit token
/// into `<num><canonical_unit>`, applying `cv -> hp` and `volts -> v`.
/// Operates on already-lowercased, accent-stripped, whitespace-collapsed
/// token streams.
fn join_units(tokens: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let current = &tokens[i];
        if i + 1 < tokens.len() {
            let next = &tokens[i + 1];
            let is_number = is_decimal_number(current);
            if is_number && data::is_unit(next) {
                let canonical = data::unit_alias(next).unwrap_or(next);
                out.push(format!("{current}{canonical}"));
                i += 2;
                continue;
            }
        }
        out.push(current.clone());
        i += 1;
    }
    out
}

/// A token is a joinable number if it is all digits, or digits with a
/// single `.`/`,` decimal separator that isn't leading/trailing (`"2,5"`,
/// not `",5"` or `"2,"`).
fn is_decimal_number(token: &str) -> bool {
    let mut seen_separator = false;
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() {
        return false;
    }
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            continue;
        }
        if (c == '.' || c == ',') && !seen_separator && i > 0 && i + 1 < chars.len() {
            seen_separator = true;
            continue;
        }
        return false;
    }
    true
}

/// Look up the abbreviation/domain-synonym table for `token` (already
/// singularized). A comma-separated mapping splices in only its first
/// variant; the full variant list is recovered separately by
/// [`expansion_variants_for_query`].
fn expand_abbreviation(token: &str) -> Vec<String> {
    match data::abbreviation(token) {
        None => vec![token.to_string()],
        Some(expansion) => expansion
            .split(',')
            .next()
            .map(|first| first.trim().to_string())
            .into_iter()
            .collect(),
    }
}

/// Canonical form used for indexing, querying, and key construction (spec
/// "Normalizer" `normalizeEquip`).
///
/// Pipeline: lowercase, strip diacritics, drop non-alphanumeric characters,
/// collapse whitespace, fuse `<number><unit>` pairs, then for each
/// remaining token: singularize, look up an abbreviation/synonym expansion,
/// and splice in its first variant.
pub fn normalize_equip(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let stripped = strip_accents(&lowered);
    let cleaned = strip_non_alnum(&stripped);
    if cleaned.is_empty() {
        return String::new();
    }

    let raw_tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
    let joined = join_units(raw_tokens);

    let mut out_tokens = Vec::new();
    for token in joined {
        let singular = singularize(&token);
        out_tokens.extend(expand_abbreviation(&singular));
    }
    out_tokens.join(" ")
}

/// Ordered, deduplicated phrase variants arising from tokens whose
/// abbreviation mapping lists more than one equivalent surface form (spec
/// "Normalizer" `expansionVariantsForQuery`). The original query is not
/// included; callers that want it should prepend it themselves.
pub fn expansion_variants_for_query(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    let stripped = strip_accents(&lowered);
    let cleaned = strip_non_alnum(&stripped);
    if cleaned.is_empty() {
        return Vec::new();
    }

    let raw_tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
    let joined = join_units(raw_tokens);

    let mut variants = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for token in &joined {
        let singular = singularize(token);
        if let Some(expansion) = data::abbreviation(&singular) {
            if expansion.contains(',') {
                for variant in expansion.split(',') {
                    let variant = variant.trim().to_string();
                    if seen.insert(variant.clone()) {
                        variants.push(variant);
                    }
                }
            }
        }
    }
    variants
}

/// Cheap collision-check fingerprint: non-vowel letters of the normalized
/// form (first 12), underscore, then every digit encountered, in order.
pub fn consonant_signature(text: &str) -> String {
    let normalized = normalize_equip(text);
    let consonants: String = normalized
        .chars()
        .filter(|c| c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .take(12)
        .collect();
    let digits: String = normalized.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{consonants}_{digits}")
}

/// Lightweight normalization that preserves dots and hyphens, used for
/// display-adjacent comparisons rather than indexing (spec "Normalizer"
/// `normalizeText`).
pub fn normalize_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lowered = text.to_lowercase();
    let stripped = strip_accents(&lowered);
    let cleaned: String = stripped
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

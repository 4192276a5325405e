//! Query-side parsing: model numbers, category, accessory terms, intent.

use equisearch_core::{taxonomy, DocCategory, DocType};

/// Intent label shared between queries and documents — reuses
/// [`DocType`] since both sides of the classification speak the same
/// three-way vocabulary (spec "Reranker").
pub type Intent = DocType;

/// Structured view of a search query after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub normalized: String,
    pub tokens: Vec<String>,
    pub model_numbers: Vec<String>,
    pub main_category: Option<DocCategory>,
    pub accessory_terms: Vec<String>,
    pub intent: Intent,
}

/// Maximal digit runs of length >= 3 found anywhere in `text`'s tokens,
/// in order of appearance. Used for both query model-number extraction
/// and document digit-run matching.
pub fn extract_model_numbers(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    for token in text.split_whitespace() {
        let mut current = String::new();
        for ch in token.chars() {
            if ch.is_ascii_digit() {
                current.push(ch);
            } else {
                if current.len() >= 3 {
                    runs.push(current.clone());
                }
                current.clear();
            }
        }
        if current.len() >= 3 {
            runs.push(current);
        }
    }
    runs
}

/// Parse a normalized query into its structured components.
pub fn parse_query(normalized_query: &str) -> ParsedQuery {
    let tokens: Vec<String> = normalized_query.split_whitespace().map(str::to_string).collect();
    let model_numbers = extract_model_numbers(normalized_query);

    let mut main_category: Option<DocCategory> = None;
    let mut category_index: Option<usize> = None;
    let mut accessory_terms: Vec<String> = Vec::new();
    let mut first_accessory_index: Option<usize> = None;

    for (idx, token) in tokens.iter().enumerate() {
        if main_category.is_none() {
            for category in DocCategory::ALL {
                if category.token() == Some(token.as_str()) {
                    main_category = Some(category);
                    category_index = Some(idx);
                    break;
                }
            }
        }
        if let Some(canonical) = taxonomy::canonical_accessory(token) {
            accessory_terms.push(canonical.to_string());
            if first_accessory_index.is_none() {
                first_accessory_index = Some(idx);
            }
        }
    }

    let intent = match (main_category, first_accessory_index) {
        (Some(_), Some(acc_idx)) => {
            let cat_idx = category_index.expect("category_index set alongside main_category");
            if cat_idx <= acc_idx {
                Intent::Equipamento
            } else {
                Intent::Acessorio
            }
        }
        (Some(_), None) => Intent::Equipamento,
        (None, Some(_)) => Intent::Acessorio,
        (None, None) => Intent::Indefinido,
    };

    ParsedQuery {
        normalized: normalized_query.to_string(),
        tokens,
        model_numbers,
        main_category,
        accessory_terms,
        intent,
    }
}

//! One typed supplier quote row, and Brazilian-format decimal parsing.

use serde::{Deserialize, Serialize};

/// One supplier quote: the aggregator's unit of input. Produced by whatever
/// reads the source workbook (out of scope here) and handed to the
/// aggregator as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceRow {
    pub standardized_description: String,
    pub unit_price: String,
    pub useful_life_months: String,
    pub maintenance: String,
    pub fornecedor: String,
    pub bid: String,
    pub marca: String,
}

/// Parse a Brazilian-format decimal string (comma as decimal separator,
/// `.` as an optional thousands separator) into an `f64`. Returns `None`
/// for blank or unparseable input.
pub fn parse_brazilian_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    cleaned.parse::<f64>().ok()
}

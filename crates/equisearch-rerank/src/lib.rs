//! Reranking stage: query parsing, document classification, intent-aware
//! rerank scoring, navigation-intent diversification, and confidence
//! calibration.

pub mod classify;
pub mod confidence;
pub mod diversify;
pub mod parsed_query;
pub mod rerank;

pub use classify::{classify_doc, ClassifiedDoc};
pub use confidence::{compute_confidence, confidence_level, query_specificity, ConfidenceLevel, ConfidenceParams};
pub use diversify::{diversify, is_navigation_intent};
pub use parsed_query::{extract_model_numbers, parse_query, Intent, ParsedQuery};
pub use rerank::{build_core_query, rerank, RerankOutcome, RerankedItem, RerankWeights};

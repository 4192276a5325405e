//! Lexical retrieval stage: hybrid BM25 over word and character n-grams,
//! typo correction against the corpus vocabulary, and static synonym
//! expansion.
//!
//! # Pipeline Stage
//!
//! This crate sits before reranking: the full corpus narrows down to a
//! candidate set via [`bm25::BM25Index::search`], with [`fuzzy::FuzzyMatcher`]
//! and [`synonym::SynonymExpander`] used upstream by the orchestrating
//! engine to repair and broaden the query before it ever reaches the index.
//!
//! # Design
//!
//! In-memory, synchronous, no persistence of its own — the engine crate
//! owns serialization of the built indexes.

pub mod bm25;
pub mod error;
pub mod fuzzy;
pub mod synonym;

pub use bm25::{BM25Index, Bm25Params, HybridParams, NGramRange, RetrievalMode};
pub use error::RetrieveError;
pub use fuzzy::{FuzzyConfig, FuzzyMatcher, QueryCorrection};
pub use synonym::{load_overrides as load_synonym_overrides, SynonymConfig, SynonymExpander};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::bm25::{BM25Index, Bm25Params, HybridParams, NGramRange, RetrievalMode};
    pub use crate::error::RetrieveError;
    pub use crate::fuzzy::{FuzzyConfig, FuzzyMatcher, QueryCorrection};
    pub use crate::synonym::{SynonymConfig, SynonymExpander};
}

//! Optional embedding / cross-encoder provider hooks (spec section 5:
//! "only suspension points in the pure lexical/reranker/confidence path").
//!
//! No implementation ships here — these are the seams a deployment can
//! plug a real model into. The lexical search path never calls them; an
//! [`IntegratedEngine`](crate::engine::IntegratedEngine) configured
//! without a provider behaves exactly as if this module didn't exist.

use equisearch_core::EquisearchResult;

/// A dense embedding backend, used to re-score or re-retrieve candidates
/// outside the lexical path.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> EquisearchResult<Vec<f32>>;
}

/// A cross-encoder backend, scoring a single (query, document) pair
/// directly rather than via independent embeddings.
pub trait CrossEncoderProvider: Send + Sync {
    fn score(&self, query: &str, doc_text: &str) -> EquisearchResult<f32>;
}

//! Search orchestration: the `IntegratedEngine` pipeline, its query
//! cache, index persistence, the public search API types, and the
//! optional embedding/cross-encoder provider seams.

pub mod api;
pub mod cache;
mod data;
pub mod engine;
pub mod persistence;
pub mod providers;

pub use api::{
    Confidence, ErrorBody, ErrorResponse, ResponseMetadata, ResultItem, ScoreBreakdown,
    SearchRequest, SearchResponse,
};
pub use cache::{CachedSearch, QueryCache};
pub use engine::IntegratedEngine;
pub use providers::{CrossEncoderProvider, EmbeddingProvider};

//! # equisearch-cli
//!
//! The build-time entry point for the equisearch equipment-search engine.
//!
//! This crate is a thin facade over the rest of the workspace: it re-exports
//! the aggregation and engine crates under one namespace and maps their
//! errors onto process exit codes for the `equisearch` binary.
//!
//! 1. **Facade**: re-exports `equisearch-aggregate` and `equisearch-engine`.
//! 2. **Exit codes**: [`exit_code_for`] gives the binary a single place to
//!    decide what process exit code a given failure deserves.

pub mod aggregate {
    pub use equisearch_aggregate::*;
}

pub mod engine {
    pub use equisearch_engine::*;
}

pub mod prelude {
    pub use crate::aggregate::{aggregate, Dataset, DatasetMetadata, SourceRow, ValidationReport};
    pub use crate::engine::{IntegratedEngine, SearchRequest, SearchResponse};
}

/// Exit codes the `equisearch` binary returns for each class of failure.
pub mod exit_code {
    /// Input file (rows JSON or dataset) could not be found or opened.
    pub const INPUT_MISSING: i32 = 1;
    /// The aggregated dataset failed validation (e.g. duplicate equipment ids).
    pub const VALIDATION_FAILED: i32 = 2;
    /// The output file could not be written.
    pub const WRITE_FAILED: i32 = 3;
}

/// Maps an [`equisearch_core::EquisearchError`] to the exit code the CLI
/// should return for it.
pub fn exit_code_for(error: &equisearch_core::EquisearchError) -> i32 {
    use equisearch_core::EquisearchError::*;
    match error {
        CorpusMalformed(_) | InputValidation(_) => exit_code::VALIDATION_FAILED,
        Io(_) => exit_code::INPUT_MISSING,
        _ => exit_code::WRITE_FAILED,
    }
}

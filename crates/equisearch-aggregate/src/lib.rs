//! Offline dataset aggregation: supplier spreadsheet rows collapsed into
//! one [`equisearch_core::Document`] per canonical equipment.
//!
//! The pipeline is `rows_io::read_rows` -> `aggregate::aggregate` ->
//! `dataset::Dataset::new`, run once by the `build-dataset` CLI command and
//! never at query time. Reading the source `.xlsx` workbook itself is an
//! external collaborator; this crate only consumes the typed rows it
//! produces, handed over as a JSON array (see [`rows_io`]).

pub mod aggregate;
pub mod dataset;
pub mod row;
pub mod rows_io;

pub use aggregate::{aggregate, ValidationReport};
pub use dataset::{Dataset, DatasetMetadata};
pub use row::{parse_brazilian_decimal, SourceRow};

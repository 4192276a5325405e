//! Reads supplier rows from a pre-parsed JSON file.
//!
//! Excel parsing is an explicit external collaborator (only the resulting
//! typed rows are consumed here, never raw workbook bytes); a JSON array of
//! [`SourceRow`] is how the `.xlsx` -> typed-rows conversion hands its
//! output to the aggregator.

use equisearch_core::{EquisearchError, EquisearchResult};

use crate::row::SourceRow;

/// Read every row from a JSON file containing a `[SourceRow, ...]` array.
pub fn read_rows(path: &std::path::Path) -> EquisearchResult<Vec<SourceRow>> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(file)
        .map_err(|e| EquisearchError::CorpusMalformed(format!("malformed rows JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_json_array_of_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(
            &path,
            r#"[{"standardized_description":"Mop Industrial","unit_price":"12,50","useful_life_months":"24","maintenance":"5","fornecedor":"Fornecedor A","bid":"BID-1","marca":"MarcaX"}]"#,
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].standardized_description, "Mop Industrial");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = read_rows(std::path::Path::new("/nonexistent/rows.json"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_json_is_corpus_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "not json").unwrap();

        match read_rows(&path) {
            Err(EquisearchError::CorpusMalformed(_)) => {}
            other => panic!("expected CorpusMalformed, got {other:?}"),
        }
    }
}

//! Integration test for file-backed taxonomy tables (spec section 6).
//!
//! Runs as its own process (the `tests/` convention), so setting the
//! crate's process-wide override `OnceLock` here can't bleed into the
//! crate's own unit tests, which rely on the compiled-in defaults.

use equisearch_core::taxonomy;
use equisearch_core::DocCategory;

#[test]
fn file_supplied_tables_shadow_compiled_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("accessories.tsv"), "garrafa\tgarrafa\n").unwrap();
    std::fs::write(dir.path().join("connectors.txt"), "com\n").unwrap();
    std::fs::write(dir.path().join("diversifier_stopwords.txt"), "de\n").unwrap();
    std::fs::write(dir.path().join("categories.tsv"), "MOP\trodo-mop\n").unwrap();

    taxonomy::load_overrides(dir.path());

    assert_eq!(taxonomy::canonical_accessory("garrafa"), Some("garrafa"));
    assert_eq!(
        taxonomy::canonical_accessory("disco"),
        None,
        "file table is authoritative once present, even for entries it omits"
    );
    assert!(taxonomy::is_connector("com"));
    assert!(!taxonomy::is_connector("para"), "not listed in the file-supplied table");
    assert!(taxonomy::is_diversifier_stopword("de"));
    assert_eq!(DocCategory::Mop.token(), Some("rodo-mop"));
    // A category the override file didn't mention keeps its compiled-in
    // token — only the tables a file actually supplies take effect.
    assert_eq!(DocCategory::Vassoura.token(), Some("vassoura"));
}

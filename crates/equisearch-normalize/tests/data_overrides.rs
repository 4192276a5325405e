//! Integration test for the file-backed unit/abbreviation tables (spec
//! section 6). Runs as its own process so the crate's process-wide
//! override `OnceLock` can't bleed into the crate's own unit tests, which
//! rely on the compiled-in defaults.

use equisearch_normalize::{load_data_overrides, normalize_equip};

#[test]
fn file_supplied_tables_shadow_compiled_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("units.tsv"), "bar\tbar\n").unwrap();
    std::fs::write(dir.path().join("abbreviations.tsv"), "esc\tescova\n").unwrap();

    load_data_overrides(dir.path());

    assert_eq!(normalize_equip("motor 5 bar"), "motor 5bar");
    // "cv" is not a key in the file-supplied units table, so once that
    // table is active it is no longer recognized as a unit at all.
    assert_eq!(normalize_equip("motor 5 cv"), "motor 5 cv");

    assert_eq!(normalize_equip("esc industrial"), "escova industrial");
    // "elet" is not in the file-supplied abbreviations table either.
    assert_eq!(normalize_equip("elet portatil"), "elet portatil");
}

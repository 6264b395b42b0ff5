#![allow(dead_code)]
use colfold::{CollationFolding, FoldConfig, Strength};
use colfold_table::generate::{self, GenerateOptions};
use colfold_table::BuildOptions;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn rules_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/rules")
}

/// Generates folding tables from testdata/rules into a fresh temp dir.
pub fn generate_tables() -> TempDir {
    let td = tempfile::tempdir().unwrap();
    let opts = GenerateOptions {
        source_dir: rules_dir(),
        dest_dir: td.path().to_path_buf(),
        build: BuildOptions {
            code_points: 0..=0x24FF,
            ..Default::default()
        },
    };
    let report = generate::run(&opts).unwrap();
    assert!(report.is_complete());
    td
}

pub fn config(dir: &Path) -> FoldConfig {
    FoldConfig {
        data_dir: dir.to_string_lossy().into_owned(),
        ..Default::default()
    }
}

pub fn open(dir: &Path, locale: &str, strength: Strength) -> CollationFolding {
    CollationFolding::open_with(&config(dir), locale, strength).unwrap()
}

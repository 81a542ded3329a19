use crate::{GenotypeBase, GenotypeObservation, LoadParams, SampleRecord, Schema};
use crate::utils;

use std::path::{Path, PathBuf};

use tempfile::TempDir;

//-----------------------------------------------------------------------------

// Reshape inputs.

// One sample with a duplicated call at M1.
pub(crate) fn scenario() -> (Vec<SampleRecord>, Vec<GenotypeObservation>) {
    let samples = vec![SampleRecord::new("S1", "short1", "groupA")];
    let observations = vec![
        GenotypeObservation::new("S1", "M1", "AA"),
        GenotypeObservation::new("S1", "M1", "AB"),
        GenotypeObservation::new("S1", "M2", "BB"),
    ];
    (samples, observations)
}

//-----------------------------------------------------------------------------

// Genotype-base utilities.

pub(crate) fn temp_dir() -> TempDir {
    let dir = tempfile::tempdir();
    assert!(dir.is_ok(), "Failed to create a temporary directory: {}", dir.unwrap_err());
    dir.unwrap()
}

pub(crate) fn create_database(dir: &TempDir, schema: Schema) -> PathBuf {
    let db_file = dir.path().join(format!("{}.db", schema));
    assert!(!utils::file_exists(&db_file), "Database {} already exists", db_file.display());
    let result = GenotypeBase::create(&db_file, schema);
    assert!(result.is_ok(), "Failed to create database: {}", result.unwrap_err());
    db_file
}

pub(crate) fn open_database(filename: &Path) -> GenotypeBase {
    let database = GenotypeBase::open(filename);
    assert!(database.is_ok(), "Failed to open database: {}", database.unwrap_err());
    database.unwrap()
}

pub(crate) fn load_test_file(database: &mut GenotypeBase, table: &str, file: &'static str, params: &LoadParams) -> usize {
    let filename = utils::get_test_data(file);
    let result = database.load_table(table, &filename, params);
    assert!(result.is_ok(), "Failed to load {} into table {}: {}", file, table, result.unwrap_err());
    result.unwrap()
}

pub(crate) fn row_count(database: &GenotypeBase, table: &str) -> usize {
    let rows = database.rows(table);
    assert!(rows.is_ok(), "Failed to count rows in table {}: {}", table, rows.unwrap_err());
    rows.unwrap()
}

//-----------------------------------------------------------------------------

//! Errors reported by the database, the loader, the reshape engine, and the export.

use std::path::PathBuf;

use thiserror::Error;

//-----------------------------------------------------------------------------

/// Errors in Genotype-base operations.
///
/// None of the errors are recovered from locally.
/// They propagate to the caller, which is expected to abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// The target table does not exist in the database.
    #[error("table {0} does not exist in the database")]
    Schema(String),

    /// The file could not be appended to the table.
    #[error("cannot load {} into table {table}: {message}", .file.display())]
    Load {
        table: String,
        file: PathBuf,
        message: String,
    },

    /// A row given to the reshape engine is missing a required field.
    #[error("malformed genotype row {row}: {message}")]
    Reshape { row: usize, message: String },

    /// The genotype join query failed.
    #[error("genotype query failed: {0}")]
    Query(#[source] rusqlite::Error),

    /// The schema name is not one of the built-in schemas.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// The database file already exists.
    #[error("database {} already exists", .0.display())]
    Exists(PathBuf),

    /// The file is not a Genotype-base database.
    #[error("{} is not a Genotype-base database", .0.display())]
    NotDatabase(PathBuf),

    /// The database has an unsupported version.
    #[error("unsupported database version: {found} (expected {expected})")]
    Version { found: String, expected: String },

    /// Any other database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Writing the delimited output failed.
    #[error("cannot write delimited output: {0}")]
    Export(#[from] csv::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Genotype-base operations.
pub type Result<T> = std::result::Result<T, Error>;

//-----------------------------------------------------------------------------

/// Logs the error in a failed stage of the run and passes the result through unchanged.
///
/// This is the only place where errors are reported.
/// The caller still receives the error and decides how to terminate.
///
/// # Examples
///
/// ```
/// use genotype_base::error::{self, Error};
///
/// let result: Result<(), Error> = Err(Error::Schema(String::from("Rivers")));
/// let result = error::logged("loading rivers", result);
/// assert!(matches!(result, Err(Error::Schema(_))));
/// ```
pub fn logged<T>(stage: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        tracing::error!("{} failed: {}", stage, err);
    }
    result
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------

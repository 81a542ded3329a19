//! # Genotype-base: herring and salmon genotyping data in SQLite databases.
//!
//! This crate provisions a SQLite database for genetic sample-tracking data, bulk-loads delimited text files into it, and exports the genotypes as a wide table.
//! It is intended for one-off batch runs: create the database, load the files, export the table.
//! Every step either completes or fails the run.
//!
//! ### Schemas
//!
//! A database uses one of the built-in [`Schema`]s.
//! Both schemas have a sample dimension table `Samples` and a genotype fact table `Genotypes` with one row per (sample, marker) pair.
//! The other tables store marker annotations, storage information, and collection metadata.
//! Table `Tags` stores the database version and the schema name.
//!
//! ### Loading
//!
//! [`GenotypeBase::load_table`] appends a delimited file (by default `;`-separated, possibly gzip-compressed) to a table.
//! The header of the file must use the column names of the table.
//! Rows are never updated, deduplicated, or deleted.
//!
//! ### Reshaping and export
//!
//! [`GenotypeBase::genotype_table`] joins samples with genotypes and reshapes the long table into a [`WideGenotypeTable`].
//! Rows are keyed by (sample id, short id, group label) and there is a column for each marker.
//! The same reshaping is available without a database as [`reshape`].
//! [`export::write_delimited`] writes the table as delimited text.
//!
//! See [`error`] for the errors and how they are reported.

pub mod db;
pub mod error;
pub mod export;
pub mod reshape;
pub mod schema;
pub mod utils;

#[cfg(test)]
pub(crate) mod internal;

pub use db::{GenotypeBase, LoadParams};
pub use error::{Error, Result};
pub use export::ExportParams;
pub use reshape::{reshape, GenotypeObservation, JoinedRow, SampleRecord, WideGenotypeRow, WideGenotypeTable};
pub use schema::Schema;
pub use utils::Encoding;

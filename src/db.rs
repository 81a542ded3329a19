//! Genotype-base: a SQLite database storing samples and genotypes of one of the built-in schemas.

use crate::error::{Error, Result};
use crate::utils::{self, Encoding};
use crate::{JoinedRow, Schema, WideGenotypeTable};

use std::path::Path;

use csv::ReaderBuilder;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, Row, Statement};

use tracing::{debug, info, warn};


//-----------------------------------------------------------------------------

/// Parameters for loading delimited files into the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadParams {
    /// Field delimiter.
    pub delimiter: u8,
    /// Character encoding of the file.
    pub encoding: Encoding,
    /// Number of rows inserted in a single transaction.
    pub batch_size: usize,
}

impl LoadParams {
    /// Default field delimiter.
    pub const DELIMITER: u8 = b';';

    /// Default number of rows in a transaction.
    pub const BATCH_SIZE: usize = 10000;
}

impl Default for LoadParams {
    fn default() -> Self {
        LoadParams {
            delimiter: Self::DELIMITER,
            encoding: Encoding::default(),
            batch_size: Self::BATCH_SIZE,
        }
    }
}

//-----------------------------------------------------------------------------

/// A database connection to a Genotype-base database.
///
/// The database contains the tables of a [`Schema`] and table `Tags` with the version and the schema name.
/// Tables are filled by appending delimited files with [`GenotypeBase::load_table`].
/// Nothing is ever updated or deleted.
/// [`GenotypeBase::genotype_table`] joins samples with genotypes and reshapes the result into a [`WideGenotypeTable`].
///
/// # Examples
///
/// ```
/// use genotype_base::{utils, GenotypeBase, LoadParams, Schema};
///
/// let dir = tempfile::tempdir().unwrap();
/// let db_file = dir.path().join("herring.db");
/// GenotypeBase::create(&db_file, Schema::Herring).unwrap();
///
/// let mut database = GenotypeBase::open(&db_file).unwrap();
/// assert_eq!(database.schema(), Schema::Herring);
/// let params = LoadParams::default();
/// database.load_table("Samples", utils::get_test_data("herring_samples.csv"), &params).unwrap();
/// database.load_table("Genotypes", utils::get_test_data("herring_genotypes.csv"), &params).unwrap();
///
/// let table = database.genotype_table().unwrap();
/// assert_eq!(table.markers(), ["M1", "M2", "M3"]);
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.cell(0, "M1"), Some("AA"));
/// assert_eq!(table.cell(0, "M3"), None);
/// ```
#[derive(Debug)]
pub struct GenotypeBase {
    connection: Connection,
    version: String,
    schema: Schema,
}

/// Using the database.
impl GenotypeBase {
    // Key for database version.
    const KEY_VERSION: &'static str = "version";

    /// Current database version.
    pub const VERSION: &'static str = "Genotype-base v1";

    // Key for schema name.
    const KEY_SCHEMA: &'static str = "schema";

    /// Opens a connection to the database in the given file.
    ///
    /// The connection can be used for both loading and querying.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a Genotype-base database or if the version or the schema is not supported.
    /// Passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&filename, flags)?;
        disable_foreign_keys(&connection)?;

        // Get the header information.
        let mut get_tag = connection.prepare(
            "SELECT value FROM Tags WHERE key = ?1"
        ).map_err(|_| Error::NotDatabase(filename.as_ref().to_path_buf()))?;
        let version = get_string_value(&mut get_tag, Self::KEY_VERSION)
            .ok_or_else(|| Error::NotDatabase(filename.as_ref().to_path_buf()))?;
        if version != Self::VERSION {
            return Err(Error::Version { found: version, expected: Self::VERSION.to_string() });
        }
        let schema = get_string_value(&mut get_tag, Self::KEY_SCHEMA)
            .ok_or_else(|| Error::NotDatabase(filename.as_ref().to_path_buf()))?;
        let schema: Schema = schema.parse()?;
        drop(get_tag);

        debug!("Opened {} database {}", schema, filename.as_ref().display());
        Ok(GenotypeBase { connection, version, schema })
    }

    /// Returns the filename of the database or [`None`] if there is no filename.
    pub fn filename(&self) -> Option<&str> {
        self.connection.path()
    }

    /// Returns the size of the database file in a human-readable format.
    pub fn file_size(&self) -> Option<String> {
        let filename = self.filename()?;
        utils::file_size(filename)
    }

    /// Returns the version of the database.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the schema of the database.
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Returns the names of the tables in the database in lexicographic order.
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut statement = self.connection.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name"
        )?;
        let names = statement.query_map((), |row| row.get(0))?;
        let names = names.collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Returns `true` if the database contains the table.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        let tables = self.tables()?;
        Ok(tables.iter().any(|name| name == table))
    }

    /// Returns the column names of the table in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table does not exist.
    pub fn columns(&self, table: &str) -> Result<Vec<String>> {
        let query = format!("PRAGMA table_info({})", utils::quote_identifier(table));
        let mut statement = self.connection.prepare(&query)?;
        let columns = statement.query_map((), |row| row.get(1))?;
        let columns = columns.collect::<rusqlite::Result<Vec<String>>>()?;
        if columns.is_empty() {
            return Err(Error::Schema(table.to_string()));
        }
        Ok(columns)
    }

    /// Returns the number of rows in the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table does not exist.
    pub fn rows(&self, table: &str) -> Result<usize> {
        if !self.has_table(table)? {
            return Err(Error::Schema(table.to_string()));
        }
        let query = format!("SELECT COUNT(*) FROM {}", utils::quote_identifier(table));
        let count: i64 = self.connection.query_row(&query, (), |row| row.get(0))?;
        Ok(count as usize)
    }
}

//-----------------------------------------------------------------------------

/// Creating and loading the database.
impl GenotypeBase {
    /// Creates a new database with the tables of the given schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database already exists.
    /// Passes through any database errors.
    pub fn create<P: AsRef<Path>>(filename: P, schema: Schema) -> Result<()> {
        info!("Creating {} database {}", schema, filename.as_ref().display());
        if utils::file_exists(&filename) {
            return Err(Error::Exists(filename.as_ref().to_path_buf()));
        }

        let mut connection = Connection::open(&filename)?;
        disable_foreign_keys(&connection)?;
        Self::insert_tags(schema, &mut connection)?;
        connection.execute_batch(schema.ddl())?;
        info!("Created tables {}", schema.tables().join(", "));
        Ok(())
    }

    fn insert_tags(schema: Schema, connection: &mut Connection) -> rusqlite::Result<()> {
        // Create the tags table.
        connection.execute(
            "CREATE TABLE Tags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) STRICT",
            (),
        )?;

        let transaction = connection.transaction()?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO Tags(key, value) VALUES (?1, ?2)"
            )?;
            insert.execute((Self::KEY_VERSION, Self::VERSION))?;
            insert.execute((Self::KEY_SCHEMA, schema.name()))?;
        }
        transaction.commit()
    }

    /// Appends the rows of a delimited file to the table.
    ///
    /// The first line of the file is a header with the names of table columns.
    /// Table columns missing from the header are left `NULL`, as are empty fields.
    /// Values are inserted as text and converted according to the column types.
    /// The file may be gzip-compressed.
    ///
    /// Rows are committed in batches of [`LoadParams::batch_size`] rows.
    /// If loading fails, the batches committed before the failure remain in the table.
    /// Returns the number of inserted rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table does not exist.
    /// Returns [`Error::Load`] if the file cannot be read, the header contains an unknown column, a line has the wrong number of fields, a field is not valid in the encoding, or the database rejects a row.
    pub fn load_table<P: AsRef<Path>>(&mut self, table: &str, filename: P, params: &LoadParams) -> Result<usize> {
        let filename = filename.as_ref();
        let tables = self.tables()?;
        info!("Tables in the database: {}", tables.join(", "));
        if !tables.iter().any(|name| name == table) {
            return Err(Error::Schema(table.to_string()));
        }
        info!("Loading {} into table {}", filename.display(), table);

        let load_error = |message: String| Error::Load {
            table: table.to_string(),
            file: filename.to_path_buf(),
            message,
        };

        // Match the header with table columns.
        let reader = utils::open_file(filename).map_err(|x| load_error(x.to_string()))?;
        let mut reader = ReaderBuilder::new()
            .delimiter(params.delimiter)
            .has_headers(true)
            .from_reader(reader);
        let header = reader.byte_headers().map_err(|x| load_error(x.to_string()))?;
        let mut columns: Vec<String> = Vec::with_capacity(header.len());
        for field in header.iter() {
            let column = params.encoding.decode(field).ok_or_else(|| {
                load_error(format!("header is not valid {:?}", params.encoding))
            })?;
            columns.push(column);
        }
        if columns.iter().all(|column| column.is_empty()) {
            return Err(load_error(String::from("the file has no header")));
        }
        let table_columns = self.columns(table)?;
        if let Some(column) = columns.iter().find(|column| !table_columns.contains(column)) {
            return Err(load_error(format!("table has no column named {}", column)));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(load_error(format!("column {} appears twice in the header", column)));
            }
        }

        let statement = format!(
            "INSERT INTO {}({}) VALUES ({})",
            utils::quote_identifier(table),
            columns.iter().map(|column| utils::quote_identifier(column)).collect::<Vec<_>>().join(", "),
            (1..=columns.len()).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
        );

        // Insert the rows in batches.
        let batch_size = params.batch_size.max(1);
        let mut records = reader.into_byte_records();
        let mut inserted = 0;
        loop {
            let transaction = self.connection.transaction()?;
            let mut batch = 0;
            {
                let mut insert = transaction.prepare(&statement)?;
                while batch < batch_size {
                    let record = match records.next() {
                        Some(record) => record.map_err(|x| load_error(x.to_string()))?,
                        None => break,
                    };
                    let line = record.position().map(|pos| pos.line()).unwrap_or(0);
                    let mut values: Vec<Option<String>> = Vec::with_capacity(record.len());
                    for field in record.iter() {
                        if field.is_empty() {
                            values.push(None);
                            continue;
                        }
                        let value = params.encoding.decode(field).ok_or_else(|| {
                            load_error(format!("line {} is not valid {:?}", line, params.encoding))
                        })?;
                        values.push(Some(value));
                    }
                    insert.execute(params_from_iter(values.iter())).map_err(|x| {
                        load_error(format!("line {}: {}", line, x))
                    })?;
                    batch += 1;
                }
            }
            transaction.commit()?;
            inserted += batch;
            if batch < batch_size {
                break;
            }
            debug!("Committed {} rows", inserted);
        }

        info!("Inserted {} rows into table {}", inserted, table);
        Ok(inserted)
    }
}

//-----------------------------------------------------------------------------

/// Querying the database.
impl GenotypeBase {
    /// Returns the inner join of samples and genotypes.
    ///
    /// Genotypes of unknown samples are not included.
    /// The rows are in the order the genotypes were inserted.
    /// Integer calls are converted to decimal strings.
    /// Real values keep the fractional part, so `1.0` becomes `"1.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the query fails.
    pub fn joined_rows(&self) -> Result<Vec<JoinedRow>> {
        let query = self.schema.genotype_query();
        let mut statement = self.connection.prepare(&query).map_err(Error::Query)?;
        let rows = statement.query_map((), |row| {
            Ok(JoinedRow {
                sample_id: text_value(row, 0)?,
                short_id: text_value(row, 1)?,
                group: text_value(row, 2)?,
                marker_id: text_value(row, 3)?,
                call: text_value(row, 4)?,
            })
        }).map_err(Error::Query)?;
        let rows = rows.collect::<rusqlite::Result<Vec<JoinedRow>>>().map_err(Error::Query)?;
        Ok(rows)
    }

    /// Returns the wide genotype table with one row per sample and one column per marker.
    ///
    /// Logs a warning for each short id that is too long for Genepop.
    /// See [`WideGenotypeTable`] for details.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the query fails and [`Error::Reshape`] if a joined row contains `NULL` values.
    pub fn genotype_table(&self) -> Result<WideGenotypeTable> {
        let rows = self.joined_rows()?;
        info!("Reshaping {} genotype observations", rows.len());
        let table = WideGenotypeTable::from_joined(rows)?;

        let limit = self.schema.short_id_limit();
        for sample in table.samples() {
            if sample.short_id.chars().count() > limit {
                warn!("Short id {} of sample {} is longer than {} characters", sample.short_id, sample.sample_id, limit);
            }
        }

        info!("The genotype table has {} samples and {} markers", table.len(), table.markers().len());
        Ok(table)
    }
}

//-----------------------------------------------------------------------------

// The bundled SQLite enforces foreign keys by default. The schemas declare them
// only for documentation, and tables must load in any order.
fn disable_foreign_keys(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch("PRAGMA foreign_keys = OFF")
}

// Executes the statement, which is expected to return a single string value.
// Returns `None` if there is no such value.
fn get_string_value(statement: &mut Statement, key: &str) -> Option<String> {
    statement.query_row((key,), |row| row.get(0)).ok()
}

// Returns the value in the given column as a string.
fn text_value(row: &Row, index: usize) -> rusqlite::Result<Option<String>> {
    let value: Value = row.get(index)?;
    let result = match value {
        Value::Null => None,
        Value::Integer(value) => Some(value.to_string()),
        // Reals keep the fractional part: 1.0 is "1.0", not "1".
        Value::Real(value) => Some(format!("{:?}", value)),
        Value::Text(value) => Some(value),
        Value::Blob(value) => Some(String::from_utf8_lossy(&value).into_owned()),
    };
    Ok(result)
}

//-----------------------------------------------------------------------------

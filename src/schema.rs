//! Built-in database schemas for herring and salmon genotyping data.
//!
//! Both schemas have a sample dimension table `Samples` and a genotype fact table `Genotypes`.
//! The remaining tables hold marker, storage, and collection metadata; they are only loaded, never queried.
//! Foreign keys are declared for documentation only; [`GenotypeBase`](crate::GenotypeBase) turns enforcement off on every connection.

use crate::error::{Error, Result};

use std::fmt;
use std::str::FromStr;

//-----------------------------------------------------------------------------

/// A built-in schema.
///
/// The schema determines the tables created in a new database and the columns used in the genotype export.
///
/// # Examples
///
/// ```
/// use genotype_base::Schema;
///
/// let schema: Schema = "salmon".parse().unwrap();
/// assert_eq!(schema, Schema::Salmon);
/// assert_eq!(schema.key_columns(), ["Sample_ID", "Short_ID", "River"]);
/// assert_eq!(schema.marker_column(), "Probeset_ID");
/// assert!(schema.tables().contains(&"Rivers"));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Schema {
    /// Herring SNP panel: six tables, population label `Pop_name`.
    Herring,
    /// Salmon SNP array: five tables, population label `River`.
    Salmon,
}

impl Schema {
    /// All built-in schemas.
    pub const ALL: [Schema; 2] = [Schema::Herring, Schema::Salmon];

    /// Name of the sample dimension table.
    pub const SAMPLES: &'static str = "Samples";

    /// Name of the genotype fact table.
    pub const GENOTYPES: &'static str = "Genotypes";

    /// Returns the name of the schema.
    pub fn name(&self) -> &'static str {
        match self {
            Schema::Herring => "herring",
            Schema::Salmon => "salmon",
        }
    }

    /// Returns the names of the tables in the schema.
    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            Schema::Herring => &[
                "Samples", "Genotypes", "Storage_info", "Genetic_markers", "Species_id_codes", "Hafro_samples_info",
            ],
            Schema::Salmon => &[
                "Samples", "Genotypes", "SNP_annotations", "SNP_position", "Rivers",
            ],
        }
    }

    /// Returns the statements creating the tables.
    pub fn ddl(&self) -> &'static str {
        match self {
            Schema::Herring => HERRING_DDL,
            Schema::Salmon => SALMON_DDL,
        }
    }

    /// Returns the sample id, short id, and group label columns of table `Samples`.
    ///
    /// These are also the key columns of the genotype export, in this order.
    pub fn key_columns(&self) -> [&'static str; 3] {
        match self {
            Schema::Herring => ["Sample_id", "Short_sid", "Pop_name"],
            Schema::Salmon => ["Sample_ID", "Short_ID", "River"],
        }
    }

    /// Returns the marker identifier column of table `Genotypes`.
    pub fn marker_column(&self) -> &'static str {
        match self {
            Schema::Herring => "Marker_id",
            Schema::Salmon => "Probeset_ID",
        }
    }

    /// Returns the genotype call column of table `Genotypes`.
    pub fn call_column(&self) -> &'static str {
        match self {
            Schema::Herring => "Gt",
            Schema::Salmon => "Genotype",
        }
    }

    /// Returns the maximum length of a short id accepted by Genepop.
    pub fn short_id_limit(&self) -> usize {
        match self {
            Schema::Herring => 10,
            Schema::Salmon => 12,
        }
    }

    /// Returns the query joining samples and genotypes.
    ///
    /// Each result row contains sample id, short id, group label, marker id, and call.
    /// The rows are in the order the genotypes were inserted.
    pub fn genotype_query(&self) -> String {
        let [sample_id, short_id, group] = self.key_columns();
        format!(
            "SELECT Samples.{sid}, Samples.{short}, Samples.{group}, Genotypes.{marker}, Genotypes.{call}
            FROM Samples JOIN Genotypes ON Samples.{sid} = Genotypes.{sid}
            ORDER BY Genotypes.rowid",
            sid = sample_id, short = short_id, group = group,
            marker = self.marker_column(), call = self.call_column()
        )
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Schema::ALL.iter()
            .find(|schema| schema.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| Error::UnknownSchema(s.to_string()))
    }
}

//-----------------------------------------------------------------------------

const HERRING_DDL: &str = "
CREATE TABLE Samples(
    Sample_id text PRIMARY KEY,
    Short_sid char(10), -- Genepop input, max 10 characters
    Pop_name text,
    Species_id_code int REFERENCES Species_id_codes(Species_id_code),
    FOREIGN KEY(Sample_id) REFERENCES Hafro_samples_info(Sample_id),
    FOREIGN KEY(Sample_id) REFERENCES Storage_info(Sample_id)
);

CREATE TABLE Genotypes(
    Sample_id text REFERENCES Samples(Sample_id),
    Marker_id text REFERENCES Genetic_markers(Marker_id),
    Gt text,
    PRIMARY KEY(Sample_id, Marker_id)
);

CREATE TABLE Storage_info(
    Sample_id text PRIMARY KEY,
    Box text,
    Plate_id text,
    Well text,
    Sample_type text, -- tissue, scales, otolith, DNA
    Matis_id int
);

CREATE TABLE Genetic_markers(
    Marker_id text PRIMARY KEY,
    Short_mid char(10),
    Possible_genotypes text,
    Marker_type text,
    Probe_sequence text,
    Marker_info text
);

CREATE TABLE Species_id_codes(
    Species_id_code int PRIMARY KEY,
    Species_latin text,
    Species_english text,
    Species_icelandic text
);

CREATE TABLE Hafro_samples_info(
    Sample_id text PRIMARY KEY,
    Date_time_collect date,
    Year_sampled int,
    Latitute real,
    Longitute real,
    Cruise_id text,
    Station text,
    Age int,
    Weight real,
    Maturity int,
    Length int,
    Sex int,
    Ship_id int,
    Location text,
    Sample_type text -- spawning, feeding
);
";

const SALMON_DDL: &str = "
CREATE TABLE Samples(
    Sample_ID text PRIMARY KEY,
    Short_ID char(12) UNIQUE, -- Genepop input, max 12 characters
    Species text,
    River text REFERENCES Rivers(River_short),
    Hybrid bool,
    Date_collected date,
    Latitude real,
    Longitude real
);

CREATE TABLE Genotypes(
    Sample_ID text REFERENCES Samples(Sample_ID),
    Probeset_ID text REFERENCES SNP_annotations(Probeset_ID),
    Genotype int NOT NULL,
    PRIMARY KEY(Sample_ID, Probeset_ID)
);

CREATE TABLE SNP_annotations(
    Probeset_ID text PRIMARY KEY REFERENCES SNP_position(Probeset_ID),
    Affymetrix_ID text,
    Flank_sequence text,
    Allele_A char(1),
    Allele_B char(1),
    Custom_ID text,
    Info text
);

CREATE TABLE SNP_position(
    Probeset_ID text PRIMARY KEY,
    Chromosome text,
    Position bigint
);

CREATE TABLE Rivers(
    River_short text PRIMARY KEY,
    River_full_name text UNIQUE,
    Country text,
    Region text,
    Longitude real,
    Latitude real
);
";

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------

//! Long-to-wide reshaping of genotype observations.
//!
//! The genotype table stores one row per (sample, marker) pair.
//! Population genetics tools expect a matrix with one row per sample and one column per marker.
//! [`WideGenotypeTable`] is that matrix.
//!
//! Rows are keyed by [`SampleRecord`], which is the (sample id, short id, group label) triple.
//! Both rows and marker columns are in lexicographic order.
//! If the same (sample, marker) cell has several observations, the calls are joined with a single space in the order they were observed.
//! Missing cells are `None`.

use crate::error::{Error, Result};

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// A sample in the sample dimension table.
///
/// The derived ordering is lexicographic by sample id, short id, and group label.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleRecord {
    /// Unique sample identifier.
    pub sample_id: String,
    /// Short identifier used in Genepop files.
    pub short_id: String,
    /// Population or river.
    pub group: String,
}

impl SampleRecord {
    /// Creates a new sample record.
    pub fn new(sample_id: &str, short_id: &str, group: &str) -> Self {
        SampleRecord {
            sample_id: sample_id.to_string(),
            short_id: short_id.to_string(),
            group: group.to_string(),
        }
    }
}

/// A genotype call for a sample at a marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenotypeObservation {
    pub sample_id: String,
    pub marker_id: String,
    /// Genotype call; integer calls are stored in decimal.
    pub call: String,
}

impl GenotypeObservation {
    /// Creates a new observation.
    pub fn new(sample_id: &str, marker_id: &str, call: &str) -> Self {
        GenotypeObservation {
            sample_id: sample_id.to_string(),
            marker_id: marker_id.to_string(),
            call: call.to_string(),
        }
    }
}

/// A row from the join of samples and genotypes.
///
/// Fields are optional, because the database may contain `NULL` values.
/// All fields are required by [`WideGenotypeTable::from_joined`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinedRow {
    pub sample_id: Option<String>,
    pub short_id: Option<String>,
    pub group: Option<String>,
    pub marker_id: Option<String>,
    pub call: Option<String>,
}

impl JoinedRow {
    /// Joins the sample with the observation.
    ///
    /// The sample id is taken from the sample.
    pub fn new(sample: &SampleRecord, observation: &GenotypeObservation) -> Self {
        JoinedRow {
            sample_id: Some(sample.sample_id.clone()),
            short_id: Some(sample.short_id.clone()),
            group: Some(sample.group.clone()),
            marker_id: Some(observation.marker_id.clone()),
            call: Some(observation.call.clone()),
        }
    }

    // Splits the row into the sample key, the marker, and the call.
    // `row` is the 1-based row number used in error messages.
    fn into_parts(self, row: usize) -> Result<(SampleRecord, String, String)> {
        let missing = |field: &str| Error::Reshape { row, message: format!("missing {}", field) };
        let sample = SampleRecord {
            sample_id: self.sample_id.ok_or_else(|| missing("sample id"))?,
            short_id: self.short_id.ok_or_else(|| missing("short id"))?,
            group: self.group.ok_or_else(|| missing("group label"))?,
        };
        let marker = self.marker_id.ok_or_else(|| missing("marker id"))?;
        let call = self.call.ok_or_else(|| missing("genotype call"))?;
        Ok((sample, marker, call))
    }
}

//-----------------------------------------------------------------------------

/// A row of the wide genotype table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WideGenotypeRow {
    sample: SampleRecord,
    cells: Vec<Option<String>>,
}

impl WideGenotypeRow {
    /// Returns the sample key of the row.
    pub fn sample(&self) -> &SampleRecord {
        &self.sample
    }

    /// Returns the cells of the row, in the same order as [`WideGenotypeTable::markers`].
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Returns the cell in the given column, or [`None`] if the cell is empty or the column does not exist.
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column)?.as_deref()
    }
}

/// A wide genotype matrix with one row per sample and one column per marker.
///
/// # Examples
///
/// ```
/// use genotype_base::{reshape, GenotypeObservation, SampleRecord};
///
/// let samples = vec![SampleRecord::new("S1", "short1", "groupA")];
/// let observations = vec![
///     GenotypeObservation::new("S1", "M1", "AA"),
///     GenotypeObservation::new("S1", "M1", "AB"),
///     GenotypeObservation::new("S1", "M2", "BB"),
///     GenotypeObservation::new("S2", "M3", "AA"),
/// ];
/// let table = reshape(&observations, &samples).unwrap();
///
/// // S2 is not a known sample, so M3 does not appear.
/// assert_eq!(table.markers(), ["M1", "M2"]);
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.cell(0, "M1"), Some("AA AB"));
/// assert_eq!(table.cell(0, "M2"), Some("BB"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WideGenotypeTable {
    markers: Vec<String>,
    rows: Vec<WideGenotypeRow>,
}

impl WideGenotypeTable {
    /// Builds the table from rows that have already been joined.
    ///
    /// The order of the rows only matters for cells with multiple observations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reshape`] if a row is missing a field.
    pub fn from_joined<I: IntoIterator<Item = JoinedRow>>(rows: I) -> Result<Self> {
        let mut markers: BTreeSet<String> = BTreeSet::new();
        let mut samples: BTreeMap<SampleRecord, HashMap<String, Vec<String>>> = BTreeMap::new();
        for (index, row) in rows.into_iter().enumerate() {
            let (sample, marker, call) = row.into_parts(index + 1)?;
            markers.insert(marker.clone());
            samples.entry(sample).or_default().entry(marker).or_default().push(call);
        }

        let markers: Vec<String> = markers.into_iter().collect();
        let rows = samples.into_iter().map(|(sample, mut calls)| {
            let cells = markers.iter().map(|marker| {
                calls.remove(marker).map(|values| values.join(" "))
            }).collect();
            WideGenotypeRow { sample, cells }
        }).collect();

        Ok(WideGenotypeTable { markers, rows })
    }

    /// Returns the marker identifiers in column order.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Returns the rows in order.
    pub fn rows(&self) -> &[WideGenotypeRow] {
        &self.rows
    }

    /// Returns an iterator over the sample keys.
    pub fn samples(&self) -> impl Iterator<Item = &SampleRecord> + '_ {
        self.rows.iter().map(|row| row.sample())
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column of the given marker.
    pub fn marker_column(&self, marker: &str) -> Option<usize> {
        self.markers.binary_search_by(|probe| probe.as_str().cmp(marker)).ok()
    }

    /// Returns the cell for the given row and marker.
    ///
    /// Returns [`None`] if the cell is empty or if the row or the marker does not exist.
    pub fn cell(&self, row: usize, marker: &str) -> Option<&str> {
        let column = self.marker_column(marker)?;
        self.rows.get(row)?.cell(column)
    }
}

//-----------------------------------------------------------------------------

/// Reshapes genotype observations into a wide table.
///
/// Observations are inner joined with the samples on sample id.
/// Observations of unknown samples are dropped silently.
/// If the same sample id appears in several sample records, the observation joins with each of them.
/// See [`WideGenotypeTable`] for the layout of the result.
///
/// # Errors
///
/// Returns [`Error::Reshape`] if a sample or an observation has an empty sample id or an observation has an empty marker id.
/// Multiple observations for the same cell are not an error.
pub fn reshape(observations: &[GenotypeObservation], samples: &[SampleRecord]) -> Result<WideGenotypeTable> {
    let mut by_id: HashMap<&str, Vec<&SampleRecord>> = HashMap::new();
    for (index, sample) in samples.iter().enumerate() {
        if sample.sample_id.is_empty() {
            return Err(Error::Reshape { row: index + 1, message: String::from("sample record without a sample id") });
        }
        by_id.entry(sample.sample_id.as_str()).or_default().push(sample);
    }
    for (index, observation) in observations.iter().enumerate() {
        if observation.sample_id.is_empty() {
            return Err(Error::Reshape { row: index + 1, message: String::from("observation without a sample id") });
        }
        if observation.marker_id.is_empty() {
            return Err(Error::Reshape { row: index + 1, message: String::from("observation without a marker id") });
        }
    }

    let joined = observations.iter().flat_map(|observation| {
        by_id.get(observation.sample_id.as_str())
            .into_iter()
            .flatten()
            .map(move |sample| JoinedRow::new(sample, observation))
    });
    WideGenotypeTable::from_joined(joined)
}

//-----------------------------------------------------------------------------

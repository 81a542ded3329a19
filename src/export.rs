//! Delimited text output for the wide genotype table.

use crate::error::Result;
use crate::{Schema, WideGenotypeTable};

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

//-----------------------------------------------------------------------------

/// Parameters for writing the wide genotype table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportParams {
    /// Field delimiter.
    pub delimiter: u8,
    /// Header names for the sample id, short id, and group label columns.
    pub key_columns: [String; 3],
}

impl ExportParams {
    /// Default field delimiter.
    pub const DELIMITER: u8 = b';';

    /// Returns parameters with the key column names of the given schema.
    pub fn for_schema(schema: Schema) -> Self {
        ExportParams {
            delimiter: Self::DELIMITER,
            key_columns: schema.key_columns().map(String::from),
        }
    }
}

impl Default for ExportParams {
    fn default() -> Self {
        Self::for_schema(Schema::Herring)
    }
}

//-----------------------------------------------------------------------------

/// Writes the table as delimited text.
///
/// The header row contains the key columns followed by the markers.
/// Each row of the table becomes a line, with empty fields for empty cells.
/// Fields are quoted if they contain the delimiter, a quote, or a line break.
///
/// # Examples
///
/// ```
/// use genotype_base::{export, reshape, ExportParams, GenotypeObservation, SampleRecord};
///
/// let samples = vec![SampleRecord::new("S1", "short1", "groupA")];
/// let observations = vec![
///     GenotypeObservation::new("S1", "M1", "AA"),
///     GenotypeObservation::new("S1", "M1", "AB"),
///     GenotypeObservation::new("S1", "M2", "BB"),
/// ];
/// let table = reshape(&observations, &samples).unwrap();
///
/// let mut output: Vec<u8> = Vec::new();
/// export::write_delimited(&table, &ExportParams::default(), &mut output).unwrap();
/// assert_eq!(
///     String::from_utf8(output).unwrap(),
///     "Sample_id;Short_sid;Pop_name;M1;M2\nS1;short1;groupA;AA AB;BB\n"
/// );
/// ```
pub fn write_delimited<W: Write>(table: &WideGenotypeTable, params: &ExportParams, output: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(params.delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(output);

    let header = params.key_columns.iter().map(String::as_str)
        .chain(table.markers().iter().map(String::as_str));
    writer.write_record(header)?;

    for row in table.rows() {
        let sample = row.sample();
        let key = [sample.sample_id.as_str(), sample.short_id.as_str(), sample.group.as_str()];
        let cells = row.cells().iter().map(|cell| cell.as_deref().unwrap_or(""));
        writer.write_record(key.into_iter().chain(cells))?;
    }

    writer.flush()?;
    Ok(())
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::internal;
    use crate::{reshape, GenotypeObservation, SampleRecord};

    fn write_to_string(table: &WideGenotypeTable, params: &ExportParams) -> String {
        let mut output: Vec<u8> = Vec::new();
        let result = write_delimited(table, params, &mut output);
        assert!(result.is_ok(), "Failed to write the table: {}", result.unwrap_err());
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn scenario_output() {
        let (samples, observations) = internal::scenario();
        let table = reshape(&observations, &samples).unwrap();
        let output = write_to_string(&table, &ExportParams::default());
        assert_eq!(output, "Sample_id;Short_sid;Pop_name;M1;M2\nS1;short1;groupA;AA AB;BB\n");

        // Same input, same bytes.
        let again = reshape(&observations, &samples).unwrap();
        assert_eq!(write_to_string(&again, &ExportParams::default()), output, "Export is not deterministic");
    }

    #[test]
    fn empty_cells_and_schema_header() {
        let samples = vec![
            SampleRecord::new("S1", "s1", "ELL"),
            SampleRecord::new("S2", "s2", "THJ"),
        ];
        let observations = vec![
            GenotypeObservation::new("S1", "AX-1", "0"),
            GenotypeObservation::new("S2", "AX-2", "2"),
        ];
        let table = reshape(&observations, &samples).unwrap();
        let output = write_to_string(&table, &ExportParams::for_schema(Schema::Salmon));
        assert_eq!(output, "Sample_ID;Short_ID;River;AX-1;AX-2\nS1;s1;ELL;0;\nS2;s2;THJ;;2\n");
    }

    #[test]
    fn delimiters_in_values_are_quoted() {
        let samples = vec![SampleRecord::new("S1", "s1", "North;East")];
        let observations = vec![
            GenotypeObservation::new("S1", "M1", "A;A"),
            GenotypeObservation::new("S1", "M1", "AB"),
        ];
        let table = reshape(&observations, &samples).unwrap();
        let output = write_to_string(&table, &ExportParams::default());
        assert_eq!(output, "Sample_id;Short_sid;Pop_name;M1\nS1;s1;\"North;East\";\"A;A AB\"\n");
    }

    #[test]
    fn custom_delimiter() {
        let (samples, observations) = internal::scenario();
        let table = reshape(&observations, &samples).unwrap();
        let mut params = ExportParams::default();
        params.delimiter = b'\t';
        let output = write_to_string(&table, &params);
        assert_eq!(output, "Sample_id\tShort_sid\tPop_name\tM1\tM2\nS1\tshort1\tgroupA\tAA AB\tBB\n");
    }

    #[test]
    fn empty_table() {
        let output = write_to_string(&WideGenotypeTable::default(), &ExportParams::default());
        assert_eq!(output, "Sample_id;Short_sid;Pop_name\n");
    }
}

//-----------------------------------------------------------------------------

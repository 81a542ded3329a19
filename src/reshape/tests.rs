use super::*;

use crate::internal;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//-----------------------------------------------------------------------------

fn reshape_ok(observations: &[GenotypeObservation], samples: &[SampleRecord]) -> WideGenotypeTable {
    let result = reshape(observations, samples);
    assert!(result.is_ok(), "Failed to reshape: {}", result.unwrap_err());
    result.unwrap()
}

fn check_row(table: &WideGenotypeTable, row: usize, sample: &SampleRecord, cells: &[Option<&str>]) {
    assert!(row < table.len(), "Missing row {}", row);
    let wide_row = &table.rows()[row];
    assert_eq!(wide_row.sample(), sample, "Wrong sample in row {}", row);
    let found: Vec<Option<&str>> = wide_row.cells().iter().map(|cell| cell.as_deref()).collect();
    assert_eq!(found, cells, "Wrong cells in row {}", row);
}

//-----------------------------------------------------------------------------

#[test]
fn end_to_end_scenario() {
    let (samples, observations) = internal::scenario();
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.markers(), ["M1", "M2"], "Wrong markers");
    assert_eq!(table.len(), 1, "Wrong number of rows");
    check_row(&table, 0, &samples[0], &[Some("AA AB"), Some("BB")]);
}

#[test]
fn empty_input() {
    let table = reshape_ok(&[], &[]);
    assert!(table.is_empty(), "Non-empty table from empty input");
    assert!(table.markers().is_empty(), "Markers from empty input");

    let samples = vec![SampleRecord::new("S1", "s1", "A")];
    let table = reshape_ok(&[], &samples);
    assert!(table.is_empty(), "A sample without observations produced a row");
}

#[test]
fn unknown_samples_are_dropped() {
    let samples = vec![SampleRecord::new("S1", "s1", "A")];
    let observations = vec![
        GenotypeObservation::new("S1", "M1", "AA"),
        GenotypeObservation::new("S9", "M1", "AB"),
        GenotypeObservation::new("S9", "M2", "BB"),
    ];
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.markers(), ["M1"], "A marker from an unknown sample was kept");
    assert_eq!(table.len(), 1, "Wrong number of rows");
    check_row(&table, 0, &samples[0], &[Some("AA")]);
}

#[test]
fn duplicates_keep_input_order() {
    let samples = vec![SampleRecord::new("S1", "s1", "A")];
    let observations = vec![
        GenotypeObservation::new("S1", "M1", "AB"),
        GenotypeObservation::new("S1", "M2", "CC"),
        GenotypeObservation::new("S1", "M1", "AA"),
        GenotypeObservation::new("S1", "M1", "AB"),
    ];
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.cell(0, "M1"), Some("AB AA AB"), "Duplicate calls were not joined in input order");
    assert_eq!(table.cell(0, "M2"), Some("CC"), "Wrong single call");
}

#[test]
fn missing_cells_are_empty() {
    let samples = vec![
        SampleRecord::new("S1", "s1", "A"),
        SampleRecord::new("S2", "s2", "B"),
    ];
    let observations = vec![
        GenotypeObservation::new("S1", "M1", "AA"),
        GenotypeObservation::new("S2", "M2", "BB"),
    ];
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.markers(), ["M1", "M2"], "Wrong markers");
    check_row(&table, 0, &samples[0], &[Some("AA"), None]);
    check_row(&table, 1, &samples[1], &[None, Some("BB")]);
    assert_eq!(table.cell(0, "M2"), None, "Missing cell is not empty");
    assert_eq!(table.cell(0, "M3"), None, "Found a cell for a missing marker");
    assert_eq!(table.cell(2, "M1"), None, "Found a cell for a missing row");
}

#[test]
fn rows_and_columns_are_sorted() {
    let samples = vec![
        SampleRecord::new("S3", "s3", "A"),
        SampleRecord::new("S1", "s1", "B"),
        SampleRecord::new("S2", "s2", "A"),
    ];
    let observations = vec![
        GenotypeObservation::new("S3", "rs20", "1"),
        GenotypeObservation::new("S1", "rs3", "0"),
        GenotypeObservation::new("S2", "rs100", "2"),
    ];
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.markers(), ["rs100", "rs20", "rs3"], "Markers are not in lexicographic order");
    let ids: Vec<&str> = table.samples().map(|sample| sample.sample_id.as_str()).collect();
    assert_eq!(ids, ["S1", "S2", "S3"], "Rows are not in lexicographic order");
}

#[test]
fn repeated_sample_ids_join_every_match() {
    let samples = vec![
        SampleRecord::new("S1", "s1", "A"),
        SampleRecord::new("S1", "s1", "B"),
    ];
    let observations = vec![GenotypeObservation::new("S1", "M1", "AA")];
    let table = reshape_ok(&observations, &samples);
    assert_eq!(table.len(), 2, "Each sample record should produce its own row");
    check_row(&table, 0, &samples[0], &[Some("AA")]);
    check_row(&table, 1, &samples[1], &[Some("AA")]);
}

#[test]
fn malformed_input() {
    let samples = vec![SampleRecord::new("", "s1", "A")];
    let result = reshape(&[], &samples);
    assert!(matches!(result, Err(Error::Reshape { row: 1, .. })), "Accepted a sample without an id");

    let samples = vec![SampleRecord::new("S1", "s1", "A")];
    let observations = vec![
        GenotypeObservation::new("S1", "M1", "AA"),
        GenotypeObservation::new("S1", "", "AA"),
    ];
    let result = reshape(&observations, &samples);
    assert!(matches!(result, Err(Error::Reshape { row: 2, .. })), "Accepted an observation without a marker");

    let observations = vec![GenotypeObservation::new("", "M1", "AA")];
    let result = reshape(&observations, &samples);
    assert!(matches!(result, Err(Error::Reshape { row: 1, .. })), "Accepted an observation without a sample");
}

#[test]
fn joined_rows_with_nulls() {
    let complete = JoinedRow {
        sample_id: Some(String::from("S1")),
        short_id: Some(String::from("s1")),
        group: Some(String::from("A")),
        marker_id: Some(String::from("M1")),
        call: Some(String::from("AA")),
    };

    let mut no_group = complete.clone();
    no_group.group = None;
    let result = WideGenotypeTable::from_joined(vec![complete.clone(), no_group]);
    match result {
        Err(Error::Reshape { row, message }) => {
            assert_eq!(row, 2, "Wrong row in the error");
            assert!(message.contains("group label"), "Wrong message: {}", message);
        },
        other => panic!("Expected a reshape error, got {:?}", other),
    }

    let mut no_call = complete.clone();
    no_call.call = None;
    let result = WideGenotypeTable::from_joined(vec![no_call]);
    assert!(matches!(result, Err(Error::Reshape { row: 1, .. })), "Accepted a row without a call");

    let result = WideGenotypeTable::from_joined(vec![complete]);
    assert!(result.is_ok(), "Rejected a complete row: {}", result.unwrap_err());
}

//-----------------------------------------------------------------------------

// Random inputs with a fixed seed.
fn random_input(rng: &mut StdRng) -> (Vec<SampleRecord>, Vec<GenotypeObservation>) {
    let samples: Vec<SampleRecord> = (0..rng.gen_range(1..20)).map(|i| {
        SampleRecord::new(&format!("S{}", i), &format!("s{}", i), &format!("G{}", i % 3))
    }).collect();
    let calls = ["AA", "AB", "BB", "0", "1", "2"];
    let observations: Vec<GenotypeObservation> = (0..rng.gen_range(0..200)).map(|_| {
        // Some observations refer to unknown samples.
        let sample = format!("S{}", rng.gen_range(0..samples.len() + 5));
        let marker = format!("M{}", rng.gen_range(0..30));
        let call = calls[rng.gen_range(0..calls.len())];
        GenotypeObservation::new(&sample, &marker, call)
    }).collect();
    (samples, observations)
}

#[test]
fn random_column_completeness() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..20 {
        let (samples, observations) = random_input(&mut rng);
        let table = reshape_ok(&observations, &samples);

        let known: BTreeSet<&str> = samples.iter().map(|s| s.sample_id.as_str()).collect();
        let expected_markers: BTreeSet<&str> = observations.iter()
            .filter(|o| known.contains(o.sample_id.as_str()))
            .map(|o| o.marker_id.as_str())
            .collect();
        let markers: Vec<&str> = table.markers().iter().map(|m| m.as_str()).collect();
        let expected_markers: Vec<&str> = expected_markers.into_iter().collect();
        assert_eq!(markers, expected_markers, "Wrong marker columns");

        let expected_rows: BTreeSet<&str> = observations.iter()
            .map(|o| o.sample_id.as_str())
            .filter(|id| known.contains(id))
            .collect();
        let rows: Vec<&str> = table.samples().map(|s| s.sample_id.as_str()).collect();
        let expected_rows: Vec<&str> = expected_rows.into_iter().collect();
        assert_eq!(rows, expected_rows, "Wrong rows");

        // Every cell holds exactly the calls observed for it.
        for (row, wide_row) in table.rows().iter().enumerate() {
            for marker in table.markers() {
                let calls: Vec<&str> = observations.iter()
                    .filter(|o| o.sample_id == wide_row.sample().sample_id && &o.marker_id == marker)
                    .map(|o| o.call.as_str())
                    .collect();
                let expected = if calls.is_empty() { None } else { Some(calls.join(" ")) };
                assert_eq!(table.cell(row, marker), expected.as_deref(), "Wrong cell for row {}, marker {}", row, marker);
            }
        }

        // Reshaping again gives the same table.
        let again = reshape_ok(&observations, &samples);
        assert_eq!(again, table, "Reshaping is not deterministic");
    }
}

//-----------------------------------------------------------------------------

mod common;

use arrow::array::{Array, Float64Array, StringArray};
use common::at;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use passlog::formats::parquet::{chunk_file_name, ParquetFormatter, COLUMNS};
use passlog::models::{EnrichedRecord, Geometry, MergedRecord, SidecarMetadata};
use std::fs::File;
use tempfile::tempdir;

fn row(second: u32, geometry: Option<Geometry>) -> EnrichedRecord {
    let mut record = MergedRecord::new(at(0, 0, second));
    record.snr = Some(second as f64);
    record.viterbi = Some("SYNCED".to_string());
    let mut enriched = EnrichedRecord::new(
        record,
        SidecarMetadata {
            satellite: "NOAA-19".to_string(),
            pass_timestamp: None,
        },
        "apt".to_string(),
    );
    enriched.geometry = geometry;
    enriched
}

#[test]
fn test_schema_has_all_columns_in_order() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    ParquetFormatter::new(out.to_str().unwrap().to_string(), 50_000)
        .convert(&[row(1, None)])
        .unwrap();

    let file = File::open(out.join(chunk_file_name(0))).unwrap();
    let reader = SerializedFileReader::new(file).unwrap();
    let schema = reader.metadata().file_metadata().schema();
    let names: Vec<&str> = schema.get_fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, COLUMNS.to_vec());
    assert!(schema.get_fields().iter().all(|f| f.is_primitive()));
}

#[test]
fn test_missing_values_are_null() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let geometry = Geometry {
        azimuth: 123.0,
        elevation: 45.0,
        distance: 900.0,
        lat: 40.0,
        lon: -8.0,
    };
    ParquetFormatter::new(out.to_str().unwrap().to_string(), 50_000)
        .convert(&[row(1, Some(geometry)), row(2, None)])
        .unwrap();

    let file = File::open(out.join(chunk_file_name(0))).unwrap();
    let batch = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(batch.num_rows(), 2);

    let azimuth = batch
        .column(10)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(azimuth.value(0), 123.0);
    assert!(azimuth.is_null(1));

    let ber = batch
        .column(4)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(ber.null_count(), 2);

    let deframer = batch
        .column(5)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(deframer.is_null(0));
    let viterbi = batch
        .column(3)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(viterbi.value(1), "SYNCED");

    // pass_timestamp was never resolved
    assert_eq!(batch.column(8).null_count(), 2);
}

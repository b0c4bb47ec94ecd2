use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::NaiveDateTime;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::EnrichedRecord;

/// Column names of the tabular artifact, in order.
pub const COLUMNS: [&str; 15] = [
    "Timestamp",
    "SNR",
    "Peak_SNR",
    "Viterbi",
    "BER",
    "Deframer",
    "folder_name",
    "satellite",
    "pass_timestamp",
    "decoder",
    "Azimuth",
    "Elevation",
    "Distance",
    "lat",
    "lon",
];

/// File name of the `index`-th chunk.
pub fn chunk_file_name(index: usize) -> String {
    format!("passes_part{:03}.parquet", index)
}

pub fn schema() -> SchemaRef {
    let timestamp = DataType::Timestamp(TimeUnit::Second, None);
    Arc::new(Schema::new(vec![
        Field::new(COLUMNS[0], timestamp.clone(), false),
        Field::new(COLUMNS[1], DataType::Float64, true),
        Field::new(COLUMNS[2], DataType::Float64, true),
        Field::new(COLUMNS[3], DataType::Utf8, true),
        Field::new(COLUMNS[4], DataType::Float64, true),
        Field::new(COLUMNS[5], DataType::Utf8, true),
        Field::new(COLUMNS[6], DataType::Utf8, true),
        Field::new(COLUMNS[7], DataType::Utf8, true),
        Field::new(COLUMNS[8], timestamp, true),
        Field::new(COLUMNS[9], DataType::Utf8, true),
        Field::new(COLUMNS[10], DataType::Float64, true),
        Field::new(COLUMNS[11], DataType::Float64, true),
        Field::new(COLUMNS[12], DataType::Float64, true),
        Field::new(COLUMNS[13], DataType::Float64, true),
        Field::new(COLUMNS[14], DataType::Float64, true),
    ]))
}

fn seconds(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp()
}

pub struct ParquetFormatter {
    output_directory: String,
    chunk_size: usize,
}

impl ParquetFormatter {
    pub fn new(output_directory: String, chunk_size: usize) -> Self {
        Self {
            output_directory,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write rows as one or more Parquet files and return their paths.
    ///
    /// An empty input still produces a single zero-row file carrying the schema.
    pub fn convert(&self, rows: &[EnrichedRecord]) -> Result<Vec<PathBuf>> {
        create_dir_all(&self.output_directory)?;

        let total_chunks = rows.len().div_ceil(self.chunk_size).max(1);
        info!(
            "Generated a total of {} chunks, will now create that total amount of files.",
            total_chunks
        );

        let mut written = Vec::with_capacity(total_chunks);
        for i in 0..total_chunks {
            let start = i * self.chunk_size;
            let end = (start + self.chunk_size).min(rows.len());
            let chunk = &rows[start.min(end)..end];
            info!(
                "Writing chunk {}/{}, {} rows",
                i + 1,
                total_chunks,
                chunk.len()
            );

            let output_path = Path::new(&self.output_directory).join(chunk_file_name(i));
            self.write_chunk_to_parquet(chunk, &output_path)?;
            written.push(output_path);
        }

        info!("All chunks have been written");
        Ok(written)
    }

    fn write_chunk_to_parquet(&self, rows: &[EnrichedRecord], output_path: &Path) -> Result<()> {
        let schema = schema();
        let batch = RecordBatch::try_new(schema.clone(), build_arrays(rows))?;

        let file = File::create(output_path)?;
        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;

        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }
}

fn float_column<F>(rows: &[EnrichedRecord], get: F) -> ArrayRef
where
    F: Fn(&EnrichedRecord) -> Option<f64>,
{
    Arc::new(Float64Array::from(rows.iter().map(get).collect::<Vec<_>>()))
}

fn string_column<F>(rows: &[EnrichedRecord], get: F) -> ArrayRef
where
    F: Fn(&EnrichedRecord) -> Option<&str>,
{
    Arc::new(StringArray::from(rows.iter().map(get).collect::<Vec<_>>()))
}

fn build_arrays(rows: &[EnrichedRecord]) -> Vec<ArrayRef> {
    let timestamps: Vec<i64> = rows.iter().map(|r| seconds(&r.record.timestamp)).collect();
    let pass_timestamps: Vec<Option<i64>> = rows
        .iter()
        .map(|r| r.pass_timestamp.as_ref().map(seconds))
        .collect();

    vec![
        Arc::new(TimestampSecondArray::from(timestamps)),
        float_column(rows, |r| r.record.snr),
        float_column(rows, |r| r.record.peak_snr),
        string_column(rows, |r| r.record.viterbi.as_deref()),
        float_column(rows, |r| r.record.ber),
        string_column(rows, |r| r.record.deframer.as_deref()),
        string_column(rows, |r| r.record.folder_name.as_deref()),
        string_column(rows, |r| Some(r.satellite.as_str())),
        Arc::new(TimestampSecondArray::from(pass_timestamps)),
        string_column(rows, |r| Some(r.decoder.as_str())),
        float_column(rows, |r| r.geometry.map(|g| g.azimuth)),
        float_column(rows, |r| r.geometry.map(|g| g.elevation)),
        float_column(rows, |r| r.geometry.map(|g| g.distance)),
        float_column(rows, |r| r.geometry.map(|g| g.lat)),
        float_column(rows, |r| r.geometry.map(|g| g.lon)),
    ]
}

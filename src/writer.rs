//! High-level API for writing the enriched pass table.

use crate::error::{Error, Result};
use crate::formats::parquet::ParquetFormatter;
use crate::models::EnrichedRecord;
use std::path::{Path, PathBuf};

/// Writer for outputting enriched rows to Apache Parquet format.
///
/// Every file carries the same fixed schema, so downstream readers can open
/// any chunk without looking at the others.
///
/// # Examples
///
/// ```no_run
/// use passlog::{ParquetWriter, Pipeline, Config};
///
/// let output = Pipeline::new(Config::default()).process()?;
///
/// ParquetWriter::new("output_dir")
///     .write(&output.rows)?;
/// # Ok::<(), passlog::Error>(())
/// ```
pub struct ParquetWriter {
    output_directory: String,
    chunk_size: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer that will write to the specified directory.
    ///
    /// # Arguments
    ///
    /// * `output_directory` - Directory where Parquet files will be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use passlog::ParquetWriter;
    ///
    /// let writer = ParquetWriter::new("./output");
    /// ```
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_string_lossy().to_string(),
            chunk_size: 50_000, // Default chunk size
        }
    }

    /// Set the chunk size for splitting large tables.
    ///
    /// Default is 50,000 rows per file. A size of zero is treated as one.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of rows per Parquet file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use passlog::ParquetWriter;
    ///
    /// let writer = ParquetWriter::new("./output")
    ///     .chunk_size(100_000);
    /// ```
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Write the rows to Parquet format.
    ///
    /// This will create one or more Parquet files in the output directory,
    /// named `passes_part000.parquet`, `passes_part001.parquet`, etc. An empty
    /// slice still produces one file holding only the schema.
    ///
    /// # Arguments
    ///
    /// * `records` - The enriched rows to write
    ///
    /// # Errors
    ///
    /// Returns `Error::OutputError` if:
    /// - The output directory cannot be created
    /// - The Parquet files cannot be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use passlog::{Config, ParquetWriter, Pipeline};
    ///
    /// let output = Pipeline::new(Config::default()).process()?;
    ///
    /// let files = ParquetWriter::new("./output")
    ///     .chunk_size(100_000)
    ///     .write(&output.rows)?;
    /// println!("{} file(s)", files.len());
    /// # Ok::<(), passlog::Error>(())
    /// ```
    pub fn write(self, records: &[EnrichedRecord]) -> Result<Vec<PathBuf>> {
        let formatter = ParquetFormatter::new(self.output_directory, self.chunk_size);

        formatter
            .convert(records)
            .map_err(|e| Error::OutputError(e.to_string()))
    }

    /// Write rows to Parquet and return statistics about the write operation.
    ///
    /// # Returns
    ///
    /// A `WriteStats` struct containing information about the write operation.
    pub fn write_with_stats(self, records: &[EnrichedRecord]) -> Result<WriteStats> {
        let num_records = records.len();
        let chunk_size = self.chunk_size;

        let files = self.write(records)?;

        Ok(WriteStats {
            num_records,
            num_chunks: files.len(),
            chunk_size,
            files,
        })
    }
}

/// Statistics about a Parquet write operation.
#[derive(Debug, Clone)]
pub struct WriteStats {
    /// Total number of records written
    pub num_records: usize,
    /// Number of Parquet files created
    pub num_chunks: usize,
    /// Rows per file (chunk size)
    pub chunk_size: usize,
    /// Paths of the files created
    pub files: Vec<PathBuf>,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} records across {} file(s) ({} rows per file)",
            self.num_records, self.num_chunks, self.chunk_size
        )
    }
}

//! # Pass Log
//!
//! Batch processing of satellite-receiver session logs. Session logs are
//! segmented into reception sessions, progress lines are turned into signal
//! metrics, rows sharing a timestamp are merged, each session folder's
//! metadata file supplies the satellite identity, and SGP4 propagation adds
//! look angles and the ground track. The result is written as an Apache
//! Parquet table, SVG charts per pass and per decoder, and an HTML summary of
//! every pass.
//!
//! ## Quick Start
//!
//! ```no_run
//! use passlog::{Config, Pipeline};
//!
//! let report = Pipeline::new(Config::default()).run()?;
//! println!("{}", report.write.summary());
//! # Ok::<(), passlog::Error>(())
//! ```
//!
//! ## Stages
//!
//! Each stage is usable on its own:
//!
//! ```no_run
//! use passlog::{merge_records, SessionLogReader, SidecarResolver};
//!
//! let records = SessionLogReader::from_dir("logs")?.read_records()?;
//! let merged = merge_records(&records);
//!
//! let mut resolver = SidecarResolver::new("recordings", "dataset.json");
//! for row in &merged.records {
//!     if let Some(folder) = row.folder_name.as_deref() {
//!         println!("{} -> {}", folder, resolver.resolve(folder).satellite);
//!     }
//! }
//! # Ok::<(), passlog::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Only run-level failures are errors: a missing log directory, unreadable
//! files, a failed catalog fetch or an unwritable output. Lines that do not
//! parse, folders without metadata and rows whose geometry cannot be computed
//! become nulls (or the `"Unknown"` satellite) instead.
//!
//! ```no_run
//! use passlog::{Config, Error, Pipeline};
//!
//! match Pipeline::new(Config::default()).run() {
//!     Ok(report) => println!("{} rows", report.output.rows.len()),
//!     Err(Error::MissingInput(msg)) => eprintln!("{}", msg),
//!     Err(err) => eprintln!("Error: {}", err),
//! }
//! ```

// Public API modules
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use merge::{merge_records, MergeOutcome};
pub use pipeline::{Pipeline, PipelineOutput, PipelineStats, RunReport};
pub use reader::{SessionLogReader, SessionLogReaderBuilder};
pub use sidecar::{decoder_tag, SidecarResolver};
pub use writer::{ParquetWriter, WriteStats};

pub use models::{EnrichedRecord, Geometry, MergedRecord, PartialRecord, SessionRecord};

// Stage modules (public but not part of the high-level API)
pub mod catalog;
pub mod formats;
pub mod geometry;
pub mod merge;
pub mod models;
pub mod sessionlog;
pub mod sidecar;
pub mod summary;
pub mod timestamp;

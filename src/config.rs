use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::{DEFAULT_MAX_AGE_DAYS, DEFAULT_TLE_FILE, DEFAULT_TLE_URL};
use crate::geometry::Observer;
use crate::reader::DEFAULT_LOG_EXTENSION;
use crate::sidecar::DEFAULT_SIDECAR_PATTERN;

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the session log files
    pub log_dir: PathBuf,
    pub log_extension: String,
    /// Directory under which session folders (and their metadata files) live
    pub recordings_root: PathBuf,
    /// Metadata file location relative to a session folder, may contain wildcards
    pub sidecar_pattern: String,
    /// Cached orbital-element catalog
    pub tle_file: PathBuf,
    pub tle_url: String,
    /// Catalog older than this is fetched again
    pub tle_max_age: Duration,
    pub observer: Observer,
    pub out_dir: PathBuf,
    /// Rows per Parquet file
    pub chunk_size: usize,
    pub write_report: bool,
    /// Draw per-pass and per-decoder charts under `images/`
    pub write_plots: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_dir: PathBuf::from("logs"),
            log_extension: DEFAULT_LOG_EXTENSION.to_string(),
            recordings_root: PathBuf::from("."),
            sidecar_pattern: DEFAULT_SIDECAR_PATTERN.to_string(),
            tle_file: PathBuf::from(DEFAULT_TLE_FILE),
            tle_url: DEFAULT_TLE_URL.to_string(),
            tle_max_age: Duration::from_secs(DEFAULT_MAX_AGE_DAYS * 24 * 3600),
            observer: Observer::default(),
            out_dir: PathBuf::from("output"),
            chunk_size: 50_000,
            write_report: true,
            write_plots: true,
        }
    }
}

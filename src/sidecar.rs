//! Satellite identity recovered from per-folder metadata files.

use chrono::{DateTime, NaiveDateTime};
use glob::Pattern;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{SidecarMetadata, UNKNOWN};

/// Default location of the metadata file inside a session folder.
pub const DEFAULT_SIDECAR_PATTERN: &str = "dataset.json";

#[derive(Debug, Deserialize)]
struct DatasetFile {
    satellite: String,
    timestamp: f64,
}

/// Convert seconds since the Unix epoch to a UTC instant.
pub fn epoch_to_datetime(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

/// Derive the decoder tag from a folder name.
///
/// Folder names follow `date_time_satellite-variant_decoder_frequency`; the
/// tag is the second-to-last `_` token, or `"Unknown"` when there are fewer
/// than two tokens.
pub fn decoder_tag(folder_name: &str) -> String {
    let tokens: Vec<&str> = folder_name.split('_').collect();
    if tokens.len() < 2 {
        return UNKNOWN.to_string();
    }
    tokens[tokens.len() - 2].to_string()
}

/// Resolves folder names to satellite metadata, reading each folder once.
pub struct SidecarResolver {
    root: PathBuf,
    pattern: String,
    cache: HashMap<String, SidecarMetadata>,
}

impl SidecarResolver {
    /// Create a resolver looking for `pattern` under `root/<folder>/`.
    ///
    /// `pattern` may contain glob wildcards; the root and the folder name are
    /// matched literally.
    pub fn new<P: AsRef<Path>>(root: P, pattern: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pattern: pattern.into(),
            cache: HashMap::new(),
        }
    }

    /// Resolve a folder, consulting the cache first.
    pub fn resolve(&mut self, folder_name: &str) -> SidecarMetadata {
        if let Some(hit) = self.cache.get(folder_name) {
            return hit.clone();
        }
        let metadata = self.read_folder(folder_name);
        self.cache.insert(folder_name.to_string(), metadata.clone());
        metadata
    }

    /// Number of distinct folders looked up so far.
    pub fn cached_folders(&self) -> usize {
        self.cache.len()
    }

    fn locate(&self, folder_name: &str) -> Vec<PathBuf> {
        let full = format!(
            "{}/{}/{}",
            Pattern::escape(&self.root.to_string_lossy()),
            Pattern::escape(folder_name),
            self.pattern
        );
        match glob::glob(&full) {
            Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
            Err(e) => {
                warn!("Invalid sidecar pattern {}: {}", full, e);
                Vec::new()
            }
        }
    }

    fn read_folder(&self, folder_name: &str) -> SidecarMetadata {
        let matches = self.locate(folder_name);
        let path = match matches.as_slice() {
            [single] => single,
            [] => {
                warn!("No metadata file found for folder {}", folder_name);
                return SidecarMetadata::unknown();
            }
            many => {
                warn!(
                    "{} metadata files match for folder {}, expected one",
                    many.len(),
                    folder_name
                );
                return SidecarMetadata::unknown();
            }
        };

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<DatasetFile>(&text).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(dataset) => {
                debug!(
                    "Folder {} -> satellite {} at {}",
                    folder_name, dataset.satellite, dataset.timestamp
                );
                SidecarMetadata {
                    satellite: dataset.satellite,
                    pass_timestamp: epoch_to_datetime(dataset.timestamp),
                }
            }
            Err(e) => {
                warn!("Unreadable metadata file {}: {}", path.display(), e);
                SidecarMetadata::unknown()
            }
        }
    }
}

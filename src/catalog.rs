//! Cached orbital-element catalog.
//!
//! The catalog is a plain text file of three-line element sets. It is
//! refreshed from the network only when the cached copy is missing or older
//! than a threshold; a failed fetch aborts the run.

use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};

/// Weather satellite element sets published by CelesTrak.
pub const DEFAULT_TLE_URL: &str = "https://celestrak.org/NORAD/elements/weather.txt";
pub const DEFAULT_TLE_FILE: &str = "weather.txt";
pub const DEFAULT_MAX_AGE_DAYS: u64 = 3;

/// Whether the cached file is missing or last modified longer than `max_age` ago.
pub fn is_stale<P: AsRef<Path>>(path: P, max_age: Duration) -> bool {
    let modified = match fs::metadata(path.as_ref()).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age > max_age,
        // Modified in the future: treat as fresh.
        Err(_) => false,
    }
}

/// Download `url` into `path`, replacing any existing file.
pub fn download<P: AsRef<Path>>(url: &str, path: P) -> Result<()> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let body = response.bytes()?;
    fs::write(path.as_ref(), &body)?;
    info!(
        "Downloaded {} bytes of element sets from {}",
        body.len(),
        url
    );
    Ok(())
}

/// Fetch the catalog if the cached copy is stale. Returns whether a fetch happened.
pub fn refresh_if_stale<P: AsRef<Path>>(path: P, url: &str, max_age: Duration) -> Result<bool> {
    let path = path.as_ref();
    if !is_stale(path, max_age) {
        info!("Element sets in {} are up to date", path.display());
        return Ok(false);
    }
    info!("Element sets in {} are missing or stale, fetching", path.display());
    download(url, path)?;
    Ok(true)
}

/// A parsed element set ready for propagation.
pub struct CatalogEntry {
    pub name: String,
    pub elements: sgp4::Elements,
    pub constants: sgp4::Constants,
}

/// Element sets keyed by trimmed satellite name.
pub struct TleCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl TleCatalog {
    /// Load a catalog from a three-line element file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse three-line element sets. Sets that fail to parse are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Catalog` if no set could be parsed.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();

        let mut entries = HashMap::new();
        let mut i = 0;
        while i < lines.len() {
            let is_set = i + 2 < lines.len()
                && lines[i + 1].starts_with("1 ")
                && lines[i + 2].starts_with("2 ");
            if !is_set {
                warn!("Skipping unexpected catalog line: {}", lines[i]);
                i += 1;
                continue;
            }

            let name = lines[i].trim().to_string();
            match parse_set(&name, lines[i + 1], lines[i + 2]) {
                Ok(entry) => {
                    // First set wins for duplicate names.
                    entries.entry(name).or_insert(entry);
                }
                Err(e) => warn!("Skipping element set {}: {}", name, e),
            }
            i += 3;
        }

        if entries.is_empty() {
            return Err(Error::Catalog("no valid element sets found".to_string()));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_set(name: &str, line1: &str, line2: &str) -> std::result::Result<CatalogEntry, String> {
    let elements = sgp4::Elements::from_tle(
        Some(name.to_string()),
        line1.as_bytes(),
        line2.as_bytes(),
    )
    .map_err(|e| e.to_string())?;
    let constants = sgp4::Constants::from_elements(&elements).map_err(|e| e.to_string())?;
    Ok(CatalogEntry {
        name: name.to_string(),
        elements,
        constants,
    })
}

//! High-level API for reading receiver session logs.

use crate::error::{Error, Result};
use crate::models::{PartialRecord, SessionRecord};
use crate::sessionlog::{LogLine, SessionSegmenter};
use log::debug;
use memmap2::Mmap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Default extension of log files in the log directory.
pub const DEFAULT_LOG_EXTENSION: &str = "log";

/// A reader over one or more session log files, scanned as a single stream.
///
/// Files are concatenated in ascending file-name order, so the running folder
/// name announced at the end of one file carries into the next.
///
/// # Examples
///
/// ```no_run
/// use passlog::SessionLogReader;
///
/// let reader = SessionLogReader::from_dir("logs")?;
/// let sessions = reader.read_sessions()?;
/// println!("Read {} sessions", sessions.len());
/// # Ok::<(), passlog::Error>(())
/// ```
pub struct SessionLogReader {
    files: Vec<PathBuf>,
}

impl SessionLogReader {
    /// Create a reader over every `.log` file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingInput` if `dir` is not a directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        SessionLogReaderBuilder::new().from_dir(dir)
    }

    /// Create a reader over an explicit list of files, read in the given order.
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            files: files.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }

    /// Files this reader will scan, in scan order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Scan all files and return the sessions found.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be opened or mapped.
    pub fn read_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut segmenter = SessionSegmenter::new();

        for path in &self.files {
            let file = File::open(path)?;
            if file.metadata()?.len() == 0 {
                debug!("Skipping empty log {}", path.display());
                continue;
            }
            let mmap = unsafe { Mmap::map(&file)? };
            let text = String::from_utf8_lossy(&mmap);
            let mut count = 0;
            for (ordinal, line) in text.lines().enumerate() {
                segmenter.push(LogLine {
                    text: line,
                    source: path,
                    ordinal: ordinal + 1,
                });
                count += 1;
            }
            debug!("Scanned {} lines from {}", count, path.display());
        }

        Ok(segmenter.finish())
    }

    /// Scan all files and flatten the sessions into their progress rows.
    pub fn read_records(&self) -> Result<Vec<PartialRecord>> {
        Ok(self
            .read_sessions()?
            .into_iter()
            .flat_map(|session| session.records)
            .collect())
    }
}

/// Builder for configuring log discovery.
///
/// # Examples
///
/// ```no_run
/// use passlog::SessionLogReaderBuilder;
///
/// let reader = SessionLogReaderBuilder::new()
///     .extension("txt")
///     .from_dir("logs")?;
/// # Ok::<(), passlog::Error>(())
/// ```
pub struct SessionLogReaderBuilder {
    extension: String,
}

impl SessionLogReaderBuilder {
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_LOG_EXTENSION.to_string(),
        }
    }

    /// Set the file extension (without the dot) of log files to read.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Build a reader over matching regular files in `dir`, sorted by name.
    pub fn from_dir<P: AsRef<Path>>(self, dir: P) -> Result<SessionLogReader> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::MissingInput(format!(
                "'{}' is not a valid directory",
                dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some(self.extension.as_str())
            })
            .collect();
        files.sort();

        Ok(SessionLogReader { files })
    }
}

impl Default for SessionLogReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

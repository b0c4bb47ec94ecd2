/// Test utilities for building session logs and their side files
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

/// Element set for the ISS, named as a catalog entry for NOAA 19 so that
/// sidecars saying "NOAA-19" resolve against it.
pub const CATALOG: &str = "NOAA 19                 \n\
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992\n\
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008\n";

/// An instant on 2020-07-13, close to the element set epoch.
pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 7, 13)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn stamp(t: NaiveDateTime) -> String {
    t.format("[%H:%M:%S - %d/%m/%Y]").to_string()
}

/// Builder for session log text
pub struct LogBuilder {
    lines: Vec<String>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a start marker
    pub fn start(mut self, t: NaiveDateTime) -> Self {
        self.lines.push(format!("{} (I) Start processing...", stamp(t)));
        self
    }

    /// Add a stop marker
    pub fn stop(mut self, t: NaiveDateTime) -> Self {
        self.lines.push(format!("{} (I) Stop processing", stamp(t)));
        self
    }

    /// Add a folder announcement for `/data/live_output/<folder>`
    pub fn folder(mut self, t: NaiveDateTime, folder: &str) -> Self {
        self.lines.push(format!(
            "{} (I) Generated folder name : /data/live_output/{}",
            stamp(t),
            folder
        ));
        self
    }

    /// Add a progress line carrying SNR and peak SNR
    pub fn snr(mut self, t: NaiveDateTime, snr: f64, peak: f64) -> Self {
        self.lines.push(format!(
            "{} (I) Progress nan%, SNR : {:.6}dB, Peak SNR: {:.6}dB",
            stamp(t),
            snr,
            peak
        ));
        self
    }

    /// Add a progress line carrying decoder status
    pub fn status(mut self, t: NaiveDateTime, viterbi: &str, ber: f64, deframer: &str) -> Self {
        self.lines.push(format!(
            "{} (I) Progress nan%, Viterbi : {} BER : {:.6}, Deframer : {}",
            stamp(t),
            viterbi,
            ber,
            deframer
        ));
        self
    }

    /// Add an arbitrary line
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Build the log text
    pub fn build(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Write the log text to `path`
    pub fn write_to(self, path: &Path) {
        fs::write(path, self.build()).unwrap();
    }
}

/// Write `<root>/<folder>/dataset.json`
pub fn write_sidecar(root: &Path, folder: &str, satellite: &str, timestamp: f64) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    let json = serde_json::json!({ "satellite": satellite, "timestamp": timestamp });
    fs::write(dir.join("dataset.json"), json.to_string()).unwrap();
}

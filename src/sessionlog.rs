//! Line-level parsing of receiver session logs.
//!
//! Every line has the shape `[HH:MM:SS - DD/MM/YYYY] (I) <message>`. Four kinds
//! of message matter: session start and stop markers, the announcement of the
//! output folder, and progress lines carrying signal metrics. Everything else
//! is ignored.

use chrono::NaiveDateTime;
use log::{debug, trace};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::models::{PartialRecord, SessionRecord};
use crate::timestamp::parse_log_timestamp;

const START_MARKER: &str = "Start processing";
const STOP_MARKER: &str = "Stop processing";
const FOLDER_MARKER: &str = "Generated folder name :";
const PROGRESS_MARKER: &str = "Progress";

const DECIMAL: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\]]*)\]").unwrap());

// "SNR" and "Peak SNR" share a suffix, so both are matched by one pattern and
// told apart by the optional prefix group.
static SNR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(Peak\s+)?SNR\s*:\s*({DECIMAL})(\s*dB)?")).unwrap()
});
static VITERBI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Viterbi\s*:\s*(\w+)").unwrap());
static BER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\bBER\s*:\s*({DECIMAL})")).unwrap());
static DEFRAMER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Deframer\s*:\s*(\w+)").unwrap());

/// A raw log line with its origin, used only while scanning.
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    pub text: &'a str,
    pub source: &'a Path,
    pub ordinal: usize,
}

/// What a log line means to the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Start,
    Stop(Option<NaiveDateTime>),
    Folder(String),
    Progress(Option<NaiveDateTime>),
    Other,
}

/// Parse the leading `[...]` timestamp of a line, if any.
pub fn line_timestamp(line: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_RE
        .captures(line)
        .and_then(|caps| parse_log_timestamp(&caps[1]))
}

/// Classify a line. Markers are checked in the order start, stop, folder,
/// progress.
pub fn classify_line(line: &str) -> LineKind {
    if line.contains(START_MARKER) {
        LineKind::Start
    } else if line.contains(STOP_MARKER) {
        LineKind::Stop(line_timestamp(line))
    } else if let Some(pos) = line.find(FOLDER_MARKER) {
        match folder_from_payload(&line[pos + FOLDER_MARKER.len()..]) {
            Some(folder) => LineKind::Folder(folder),
            None => LineKind::Other,
        }
    } else if line.contains(PROGRESS_MARKER) {
        LineKind::Progress(line_timestamp(line))
    } else {
        LineKind::Other
    }
}

/// Take the trailing path segment of a folder announcement payload.
///
/// Accepts both `/` and `\` separators and ignores trailing separators.
pub fn folder_from_payload(payload: &str) -> Option<String> {
    let trimmed = payload.trim().trim_end_matches(&['/', '\\'][..]);
    let segment = trimmed.rsplit(&['/', '\\'][..]).next()?.trim();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

/// Extract one partial record from a progress line.
///
/// Each field is matched on its own; a field that is absent stays `None`.
pub fn extract_progress(line: &str, folder_name: Option<&str>) -> PartialRecord {
    let mut record = PartialRecord {
        timestamp: line_timestamp(line),
        folder_name: folder_name.map(str::to_string),
        ..Default::default()
    };

    for caps in SNR_RE.captures_iter(line) {
        let is_peak = caps.get(1).is_some();
        let has_unit = caps.get(3).is_some();
        if is_peak {
            if record.peak_snr.is_none() {
                record.peak_snr = parse_decimal(&caps[2]);
            }
        } else if has_unit && record.snr.is_none() {
            record.snr = parse_decimal(&caps[2]);
        }
    }

    record.viterbi = VITERBI_RE.captures(line).map(|c| c[1].to_string());
    record.ber = BER_RE.captures(line).and_then(|c| parse_decimal(&c[1]));
    record.deframer = DEFRAMER_RE.captures(line).map(|c| c[1].to_string());

    record
}

/// State machine partitioning a line stream into sessions.
///
/// The running folder name belongs to the whole scan rather than to a session:
/// the announcement may come before the start marker, between sessions, or
/// after progress lines have already been seen.
#[derive(Debug, Default)]
pub struct SessionSegmenter {
    current_folder: Option<String>,
    open: Option<SessionRecord>,
    sessions: Vec<SessionRecord>,
}

impl SessionSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: LogLine<'_>) {
        match classify_line(line.text) {
            LineKind::Start => {
                if let Some(session) = self.open.take() {
                    debug!(
                        "{}:{}: start marker inside an open session, closing it implicitly",
                        line.source.display(),
                        line.ordinal
                    );
                    self.sessions.push(session);
                }
                self.open = Some(SessionRecord::default());
            }
            LineKind::Stop(timestamp) => {
                if let Some(mut session) = self.open.take() {
                    session.end = timestamp;
                    self.sessions.push(session);
                }
            }
            LineKind::Folder(folder) => {
                trace!(
                    "{}:{}: folder name {}",
                    line.source.display(),
                    line.ordinal,
                    folder
                );
                if let Some(session) = self.open.as_mut() {
                    session.folder_name = Some(folder.clone());
                }
                self.current_folder = Some(folder);
            }
            LineKind::Progress(timestamp) => {
                if let Some(session) = self.open.as_mut() {
                    if session.start.is_none() {
                        session.start = timestamp;
                    }
                    if session.folder_name.is_none() {
                        session.folder_name = self.current_folder.clone();
                    }
                    let record = extract_progress(line.text, self.current_folder.as_deref());
                    session.records.push(record);
                }
            }
            LineKind::Other => {}
        }
    }

    /// Close the scan. A session still open at end of input is emitted as is.
    pub fn finish(mut self) -> Vec<SessionRecord> {
        if let Some(session) = self.open.take() {
            self.sessions.push(session);
        }
        self.sessions
    }
}

/// Segment a single in-memory text into sessions.
pub fn segment_text(text: &str, source: &Path) -> Vec<SessionRecord> {
    let mut segmenter = SessionSegmenter::new();
    for (ordinal, line) in text.lines().enumerate() {
        segmenter.push(LogLine {
            text: line,
            source,
            ordinal: ordinal + 1,
        });
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 23)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_classify_markers() {
        assert_eq!(
            classify_line("[02:38:30 - 23/07/2024] (I) Start processing..."),
            LineKind::Start
        );
        assert_eq!(
            classify_line("[02:48:30 - 23/07/2024] (I) Stop processing"),
            LineKind::Stop(Some(at(2, 48, 30)))
        );
        assert_eq!(
            classify_line("[02:38:31 - 23/07/2024] (I) Generated folder name : /srv/live/2024-07-23_02-38_noaa_19_apt_137.1 MHz"),
            LineKind::Folder("2024-07-23_02-38_noaa_19_apt_137.1 MHz".to_string())
        );
        assert_eq!(
            classify_line("[02:38:32 - 23/07/2024] (I) Progress nan%, SNR : 8.15dB"),
            LineKind::Progress(Some(at(2, 38, 32)))
        );
        assert_eq!(classify_line("[02:38:32 - 23/07/2024] (D) Tuning"), LineKind::Other);
    }

    #[test]
    fn test_folder_from_payload_variants() {
        assert_eq!(folder_from_payload(" /a/b/c/ ").as_deref(), Some("c"));
        assert_eq!(folder_from_payload(r"C:\rec\pass_1").as_deref(), Some("pass_1"));
        assert_eq!(folder_from_payload("plain").as_deref(), Some("plain"));
        assert_eq!(folder_from_payload("  "), None);
        assert_eq!(folder_from_payload("/"), None);
    }

    #[test]
    fn test_extract_snr_and_peak() {
        let r = extract_progress(
            "[02:38:32 - 23/07/2024] (I) Progress nan%, SNR : 8.155184dB, Peak SNR: 9.201015dB",
            Some("pass"),
        );
        assert_eq!(r.timestamp, Some(at(2, 38, 32)));
        assert_eq!(r.snr, Some(8.155184));
        assert_eq!(r.peak_snr, Some(9.201015));
        assert_eq!(r.viterbi, None);
        assert_eq!(r.ber, None);
        assert_eq!(r.deframer, None);
        assert_eq!(r.folder_name.as_deref(), Some("pass"));
    }

    #[test]
    fn test_extract_status_fields() {
        let r = extract_progress(
            "[02:38:32 - 23/07/2024] (I) Progress nan%, Viterbi : SYNCED BER : 0.080078, Deframer : NOSYNC",
            None,
        );
        assert_eq!(r.snr, None);
        assert_eq!(r.peak_snr, None);
        assert_eq!(r.viterbi.as_deref(), Some("SYNCED"));
        assert_eq!(r.ber, Some(0.080078));
        assert_eq!(r.deframer.as_deref(), Some("NOSYNC"));
        assert_eq!(r.folder_name, None);
    }

    #[test]
    fn test_extract_peak_only_does_not_set_snr() {
        let r = extract_progress("[02:38:32 - 23/07/2024] (I) Progress, Peak SNR: 4.5", None);
        assert_eq!(r.snr, None);
        assert_eq!(r.peak_snr, Some(4.5));
    }

    #[test]
    fn test_extract_bad_timestamp_is_null() {
        let r = extract_progress("[99:99:99 - 23/07/2024] (I) Progress, SNR : 1.0dB", None);
        assert_eq!(r.timestamp, None);
        assert_eq!(r.snr, Some(1.0));
    }

    #[test]
    fn test_start_stop_without_progress() {
        let text = "[02:38:30 - 23/07/2024] (I) Start processing...\n\
                    [02:48:30 - 23/07/2024] (I) Stop processing\n";
        let sessions = segment_text(text, Path::new("a.log"));
        assert_eq!(sessions.len(), 1);
        // Only a progress line sets the start instant.
        assert_eq!(sessions[0].start, None);
        assert_eq!(sessions[0].end, Some(at(2, 48, 30)));
        assert!(sessions[0].records.is_empty());
    }

    #[test]
    fn test_truncated_session_is_emitted() {
        let text = "[02:38:30 - 23/07/2024] (I) Start processing...\n\
                    [02:38:31 - 23/07/2024] (I) Progress 1%, SNR : 3.0dB\n\
                    [02:38:32 - 23/07/2024] (I) Progress 2%, SNR : 4.0dB\n";
        let sessions = segment_text(text, Path::new("a.log"));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start, Some(at(2, 38, 31)));
        assert_eq!(sessions[0].end, None);
        assert_eq!(sessions[0].records.len(), 2);
    }

    #[test]
    fn test_start_inside_open_session_closes_previous() {
        let text = "[02:00:00 - 23/07/2024] (I) Start processing...\n\
                    [02:00:01 - 23/07/2024] (I) Progress, SNR : 1.0dB\n\
                    [03:00:00 - 23/07/2024] (I) Start processing...\n\
                    [03:00:01 - 23/07/2024] (I) Progress, SNR : 2.0dB\n\
                    [03:10:00 - 23/07/2024] (I) Stop processing\n";
        let sessions = segment_text(text, Path::new("a.log"));
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].end, None);
        assert_eq!(sessions[0].records.len(), 1);
        assert_eq!(sessions[1].start, Some(at(3, 0, 1)));
        assert_eq!(sessions[1].end, Some(at(3, 10, 0)));
    }

    #[test]
    fn test_progress_outside_session_is_ignored() {
        let text = "[02:00:01 - 23/07/2024] (I) Progress, SNR : 1.0dB\n\
                    [02:00:02 - 23/07/2024] (I) Stop processing\n";
        let sessions = segment_text(text, Path::new("a.log"));
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_folder_is_global_to_scan_and_retroactive() {
        let text = "[02:00:00 - 23/07/2024] (I) Generated folder name : /rec/first_apt_1\n\
                    [02:00:01 - 23/07/2024] (I) Start processing...\n\
                    [02:00:02 - 23/07/2024] (I) Progress, SNR : 1.0dB\n\
                    [02:00:03 - 23/07/2024] (I) Stop processing\n\
                    [02:10:00 - 23/07/2024] (I) Start processing...\n\
                    [02:10:01 - 23/07/2024] (I) Progress, SNR : 2.0dB\n\
                    [02:10:02 - 23/07/2024] (I) Generated folder name : /rec/second_lrpt_2\n\
                    [02:10:03 - 23/07/2024] (I) Progress, SNR : 3.0dB\n";
        let sessions = segment_text(text, Path::new("a.log"));
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].folder_name.as_deref(), Some("first_apt_1"));
        assert_eq!(
            sessions[0].records[0].folder_name.as_deref(),
            Some("first_apt_1")
        );
        assert_eq!(sessions[1].folder_name.as_deref(), Some("second_lrpt_2"));
        // Rows are stamped with the folder known when they were read.
        assert_eq!(
            sessions[1].records[0].folder_name.as_deref(),
            Some("first_apt_1")
        );
        assert_eq!(
            sessions[1].records[1].folder_name.as_deref(),
            Some("second_lrpt_2")
        );
    }
}

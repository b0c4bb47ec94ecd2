use chrono::NaiveDateTime;

/// Sentinel used for an unresolved satellite name or decoder tag.
pub const UNKNOWN: &str = "Unknown";

/// One progress-line observation. A single log line usually fills only a
/// subset of the fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub snr: Option<f64>,
    pub peak_snr: Option<f64>,
    pub viterbi: Option<String>,
    pub ber: Option<f64>,
    pub deframer: Option<String>,
    pub folder_name: Option<String>,
}

/// One reception session, bounded by start and stop markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub folder_name: Option<String>,
    pub records: Vec<PartialRecord>,
}

/// One timestamp's observation after column-wise merging of partial records.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub timestamp: NaiveDateTime,
    pub snr: Option<f64>,
    pub peak_snr: Option<f64>,
    pub viterbi: Option<String>,
    pub ber: Option<f64>,
    pub deframer: Option<String>,
    pub folder_name: Option<String>,
}

impl MergedRecord {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            snr: None,
            peak_snr: None,
            viterbi: None,
            ber: None,
            deframer: None,
            folder_name: None,
        }
    }
}

/// Identity recovered from a session folder's metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarMetadata {
    pub satellite: String,
    pub pass_timestamp: Option<NaiveDateTime>,
}

impl SidecarMetadata {
    /// The result of a failed resolution.
    pub fn unknown() -> Self {
        Self {
            satellite: UNKNOWN.to_string(),
            pass_timestamp: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.satellite == UNKNOWN
    }
}

/// Topocentric look angles and sub-satellite point at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Degrees clockwise from north, in `[0, 360)`
    pub azimuth: f64,
    /// Degrees above the horizon
    pub elevation: f64,
    /// Slant range in kilometres
    pub distance: f64,
    pub lat: f64,
    pub lon: f64,
}

/// A merged record with satellite identity, decoder tag and geometry attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: MergedRecord,
    pub satellite: String,
    pub pass_timestamp: Option<NaiveDateTime>,
    pub decoder: String,
    pub geometry: Option<Geometry>,
}

impl EnrichedRecord {
    pub fn new(record: MergedRecord, sidecar: SidecarMetadata, decoder: String) -> Self {
        Self {
            record,
            satellite: sidecar.satellite,
            pass_timestamp: sidecar.pass_timestamp,
            decoder,
            geometry: None,
        }
    }

    pub fn folder_name(&self) -> Option<&str> {
        self.record.folder_name.as_deref()
    }
}

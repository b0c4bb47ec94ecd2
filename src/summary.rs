//! Per-pass and per-decoder aggregates of the enriched table.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::models::EnrichedRecord;

/// Aggregate of all rows sharing one folder name.
#[derive(Debug, Clone, PartialEq)]
pub struct PassSummary {
    pub folder_name: String,
    pub satellite: String,
    pub decoder: String,
    pub pass_start: NaiveDateTime,
    pub pass_end: NaiveDateTime,
    pub max_snr: Option<f64>,
    pub start_azimuth: Option<f64>,
    pub end_azimuth: Option<f64>,
    pub max_elevation: Option<f64>,
    pub rows: usize,
}

/// Aggregate of all passes sharing one decoder tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderSummary {
    pub decoder: String,
    pub passes: usize,
    pub rows: usize,
    pub max_snr: Option<f64>,
}

fn max_option(acc: Option<f64>, value: Option<f64>) -> Option<f64> {
    match (acc, value) {
        (Some(a), Some(v)) => Some(a.max(v)),
        (None, v) => v,
        (a, None) => a,
    }
}

/// Group rows by folder name, sorted by folder name. Rows without a folder
/// name are left out.
pub fn summarize_passes(rows: &[EnrichedRecord]) -> Vec<PassSummary> {
    let mut groups: BTreeMap<&str, Vec<&EnrichedRecord>> = BTreeMap::new();
    for row in rows {
        if let Some(folder) = row.folder_name() {
            groups.entry(folder).or_default().push(row);
        }
    }

    groups
        .into_iter()
        .filter_map(|(folder, group)| {
            let first = *group.first()?;
            let last = *group.last()?;
            let pass_start = group.iter().map(|r| r.record.timestamp).min()?;
            let pass_end = group.iter().map(|r| r.record.timestamp).max()?;
            Some(PassSummary {
                folder_name: folder.to_string(),
                satellite: first.satellite.clone(),
                decoder: first.decoder.to_uppercase(),
                pass_start,
                pass_end,
                max_snr: group.iter().fold(None, |acc, r| max_option(acc, r.record.snr)),
                start_azimuth: first.geometry.map(|g| g.azimuth),
                end_azimuth: last.geometry.map(|g| g.azimuth),
                max_elevation: group
                    .iter()
                    .fold(None, |acc, r| max_option(acc, r.geometry.map(|g| g.elevation))),
                rows: group.len(),
            })
        })
        .collect()
}

/// Roll pass summaries up by decoder, sorted by decoder.
pub fn summarize_decoders(passes: &[PassSummary]) -> Vec<DecoderSummary> {
    let mut groups: BTreeMap<&str, DecoderSummary> = BTreeMap::new();
    for pass in passes {
        let entry = groups
            .entry(pass.decoder.as_str())
            .or_insert_with(|| DecoderSummary {
                decoder: pass.decoder.clone(),
                passes: 0,
                rows: 0,
                max_snr: None,
            });
        entry.passes += 1;
        entry.rows += pass.rows;
        entry.max_snr = max_option(entry.max_snr, pass.max_snr);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Geometry, MergedRecord, SidecarMetadata};
    use chrono::NaiveDate;

    fn row(folder: &str, second: u32, snr: Option<f64>, az_el: Option<(f64, f64)>) -> EnrichedRecord {
        let mut record = MergedRecord::new(
            NaiveDate::from_ymd_opt(2024, 7, 23)
                .unwrap()
                .and_hms_opt(2, 40, second)
                .unwrap(),
        );
        record.snr = snr;
        record.folder_name = Some(folder.to_string());
        let mut enriched = EnrichedRecord::new(
            record,
            SidecarMetadata {
                satellite: "NOAA-19".into(),
                pass_timestamp: None,
            },
            crate::sidecar::decoder_tag(folder),
        );
        enriched.geometry = az_el.map(|(azimuth, elevation)| Geometry {
            azimuth,
            elevation,
            distance: 1000.0,
            lat: 0.0,
            lon: 0.0,
        });
        enriched
    }

    #[test]
    fn test_pass_summary_values() {
        let rows = vec![
            row("d_t_noaa_apt_137", 1, Some(3.0), Some((10.0, 5.0))),
            row("d_t_noaa_apt_137", 2, None, Some((20.0, 40.0))),
            row("d_t_noaa_apt_137", 3, Some(7.5), Some((30.0, 12.0))),
        ];
        let passes = summarize_passes(&rows);
        assert_eq!(passes.len(), 1);
        let p = &passes[0];
        assert_eq!(p.decoder, "APT");
        assert_eq!(p.max_snr, Some(7.5));
        assert_eq!(p.start_azimuth, Some(10.0));
        assert_eq!(p.end_azimuth, Some(30.0));
        assert_eq!(p.max_elevation, Some(40.0));
        assert_eq!(p.rows, 3);
        assert!(p.pass_start < p.pass_end);
    }

    #[test]
    fn test_decoder_rollup() {
        let rows = vec![
            row("a_apt_1", 1, Some(1.0), None),
            row("b_apt_1", 2, Some(2.0), None),
            row("c_lrpt_1", 3, None, None),
        ];
        let decoders = summarize_decoders(&summarize_passes(&rows));
        assert_eq!(decoders.len(), 2);
        assert_eq!(decoders[0].decoder, "APT");
        assert_eq!(decoders[0].passes, 2);
        assert_eq!(decoders[0].max_snr, Some(2.0));
        assert_eq!(decoders[1].decoder, "LRPT");
        assert_eq!(decoders[1].max_snr, None);
    }
}

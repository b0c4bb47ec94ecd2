//! Column-wise merging of partial records that share a timestamp.
//!
//! Rows without a timestamp are dropped: they cannot be keyed, and a grouping
//! over a nullable key excludes them. The number of dropped rows is reported so
//! the caller can log it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::models::{MergedRecord, PartialRecord};

/// Result of a merge pass.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// One record per distinct timestamp, ascending
    pub records: Vec<MergedRecord>,
    /// Input rows discarded for lacking a timestamp
    pub dropped_untimed: usize,
}

fn fill<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(value);
    }
}

/// Merge partial records into one record per timestamp.
///
/// For every column independently the first non-null value in input order
/// wins. Output is sorted by timestamp; the sort is stable with respect to
/// first occurrence because the map key is the timestamp itself.
pub fn merge_records<'a, I>(rows: I) -> MergeOutcome
where
    I: IntoIterator<Item = &'a PartialRecord>,
{
    let mut groups: BTreeMap<NaiveDateTime, MergedRecord> = BTreeMap::new();
    let mut dropped_untimed = 0;

    for row in rows {
        let Some(timestamp) = row.timestamp else {
            dropped_untimed += 1;
            continue;
        };
        let merged = groups
            .entry(timestamp)
            .or_insert_with(|| MergedRecord::new(timestamp));
        fill(&mut merged.snr, &row.snr);
        fill(&mut merged.peak_snr, &row.peak_snr);
        fill(&mut merged.viterbi, &row.viterbi);
        fill(&mut merged.ber, &row.ber);
        fill(&mut merged.deframer, &row.deframer);
        fill(&mut merged.folder_name, &row.folder_name);
    }

    MergeOutcome {
        records: groups.into_values().collect(),
        dropped_untimed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(s: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 7, 23)
            .unwrap()
            .and_hms_opt(2, 38, s)
    }

    #[test]
    fn test_merge_two_halves() {
        let rows = vec![
            PartialRecord {
                timestamp: at(30),
                snr: Some(8.15),
                ..Default::default()
            },
            PartialRecord {
                timestamp: at(30),
                ber: Some(0.08),
                ..Default::default()
            },
        ];
        let outcome = merge_records(&rows);
        assert_eq!(outcome.records.len(), 1);
        let merged = &outcome.records[0];
        assert_eq!(merged.snr, Some(8.15));
        assert_eq!(merged.ber, Some(0.08));
        assert_eq!(merged.peak_snr, None);
    }

    #[test]
    fn test_first_non_null_wins_per_column() {
        let rows = vec![
            PartialRecord {
                timestamp: at(30),
                snr: None,
                viterbi: Some("NOSYNC".into()),
                ..Default::default()
            },
            PartialRecord {
                timestamp: at(30),
                snr: Some(1.0),
                viterbi: Some("SYNCED".into()),
                ..Default::default()
            },
            PartialRecord {
                timestamp: at(30),
                snr: Some(2.0),
                deframer: Some("SYNCED".into()),
                ..Default::default()
            },
        ];
        let merged = &merge_records(&rows).records[0];
        assert_eq!(merged.snr, Some(1.0));
        assert_eq!(merged.viterbi.as_deref(), Some("NOSYNC"));
        assert_eq!(merged.deframer.as_deref(), Some("SYNCED"));
    }

    #[test]
    fn test_untimed_rows_are_dropped() {
        let rows = vec![
            PartialRecord {
                timestamp: None,
                snr: Some(5.0),
                ..Default::default()
            },
            PartialRecord {
                timestamp: at(31),
                ..Default::default()
            },
            PartialRecord {
                timestamp: None,
                ber: Some(0.1),
                ..Default::default()
            },
        ];
        let outcome = merge_records(&rows);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped_untimed, 2);
        assert_eq!(outcome.records[0].snr, None);
    }

    #[test]
    fn test_output_sorted_by_timestamp() {
        let rows: Vec<_> = [33, 31, 32, 31]
            .into_iter()
            .map(|s| PartialRecord {
                timestamp: at(s),
                ..Default::default()
            })
            .collect();
        let stamps: Vec<_> = merge_records(&rows)
            .records
            .iter()
            .map(|r| r.timestamp)
            .collect();
        assert_eq!(stamps, vec![at(31).unwrap(), at(32).unwrap(), at(33).unwrap()]);
    }
}

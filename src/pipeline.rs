//! End-to-end batch run: logs in, enriched table and report out.

use log::{debug, info};

use crate::catalog::{refresh_if_stale, TleCatalog};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::formats::html::{write_summary, SUMMARY_FILE_NAME};
use crate::formats::plot::PlotFormatter;
use crate::geometry::GeometryEnricher;
use crate::merge::merge_records;
use crate::models::{EnrichedRecord, MergedRecord, SidecarMetadata, UNKNOWN};
use crate::reader::SessionLogReaderBuilder;
use crate::sidecar::{decoder_tag, SidecarResolver};
use crate::summary::{summarize_decoders, summarize_passes};
use crate::writer::{ParquetWriter, WriteStats};
use std::path::PathBuf;

/// Counters describing what each stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub log_files: usize,
    pub sessions: usize,
    pub partial_rows: usize,
    pub dropped_untimed: usize,
    pub merged_rows: usize,
    pub unknown_rows: usize,
    pub rows_with_geometry: usize,
    pub catalog_fetched: bool,
}

/// Enriched rows plus stage counters.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<EnrichedRecord>,
    pub stats: PipelineStats,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PipelineOutput,
    pub write: WriteStats,
    pub passes: usize,
    /// Chart files written, empty when charts are disabled
    pub charts: Vec<PathBuf>,
}

/// Attach satellite identity and decoder tag, dropping rows whose satellite
/// cannot be resolved. Returns the kept rows and the number dropped.
pub fn resolve_identities(
    merged: Vec<MergedRecord>,
    resolver: &mut SidecarResolver,
) -> (Vec<EnrichedRecord>, usize) {
    let total = merged.len();
    let rows: Vec<EnrichedRecord> = merged
        .into_iter()
        .map(|record| {
            let (sidecar, decoder) = match record.folder_name.as_deref() {
                Some(folder) => (resolver.resolve(folder), decoder_tag(folder)),
                None => (SidecarMetadata::unknown(), UNKNOWN.to_string()),
            };
            EnrichedRecord::new(record, sidecar, decoder)
        })
        .filter(|row| row.satellite != UNKNOWN)
        .collect();
    let dropped = total - rows.len();
    (rows, dropped)
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Read, merge, resolve and enrich without writing any output.
    ///
    /// # Errors
    ///
    /// Fails if the log directory is missing, a log cannot be read, or the
    /// catalog cannot be fetched or parsed. Per-row problems never fail the run.
    pub fn process(&self) -> Result<PipelineOutput> {
        let config = &self.config;
        let mut stats = PipelineStats::default();

        let reader = SessionLogReaderBuilder::new()
            .extension(config.log_extension.clone())
            .from_dir(&config.log_dir)?;
        stats.log_files = reader.files().len();
        info!(
            "📂 Found {} log file(s) in {}",
            stats.log_files,
            config.log_dir.display()
        );

        let sessions = reader.read_sessions()?;
        stats.sessions = sessions.len();
        let partial: Vec<_> = sessions.into_iter().flat_map(|s| s.records).collect();
        stats.partial_rows = partial.len();
        info!(
            "   ├─ {} session(s), {} progress row(s)",
            stats.sessions, stats.partial_rows
        );

        let merged = merge_records(&partial);
        stats.dropped_untimed = merged.dropped_untimed;
        stats.merged_rows = merged.records.len();
        info!(
            "   ├─ Merged into {} row(s), {} without timestamp dropped",
            stats.merged_rows, stats.dropped_untimed
        );

        let mut resolver = SidecarResolver::new(&config.recordings_root, config.sidecar_pattern.clone());
        let (mut rows, unknown) = resolve_identities(merged.records, &mut resolver);
        stats.unknown_rows = unknown;
        info!(
            "   ├─ Resolved {} folder(s), {} row(s) with unknown satellite dropped",
            resolver.cached_folders(),
            unknown
        );

        stats.catalog_fetched =
            refresh_if_stale(&config.tle_file, &config.tle_url, config.tle_max_age)?;
        let catalog = TleCatalog::from_file(&config.tle_file)?;
        debug!("Loaded {} element sets", catalog.len());

        let enricher = GeometryEnricher::new(&catalog, config.observer);
        stats.rows_with_geometry = enricher.enrich(&mut rows);
        info!(
            "   └─ Geometry computed for {}/{} row(s)",
            stats.rows_with_geometry,
            rows.len()
        );

        Ok(PipelineOutput { rows, stats })
    }

    /// Process everything and write the Parquet table, the charts and the
    /// HTML summary.
    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        let output = self.process()?;

        let write = ParquetWriter::new(&config.out_dir)
            .chunk_size(config.chunk_size)
            .write_with_stats(&output.rows)?;
        info!("{}", write.summary());

        let charts = if config.write_plots {
            let charts = PlotFormatter::new(&config.out_dir)
                .convert(&output.rows)
                .map_err(|e| Error::OutputError(e.to_string()))?;
            info!("Drew {} chart(s)", charts.len());
            charts
        } else {
            Vec::new()
        };

        let passes = summarize_passes(&output.rows);
        if config.write_report {
            let decoders = summarize_decoders(&passes);
            let path = config.out_dir.join(SUMMARY_FILE_NAME);
            write_summary(&path, &passes, &decoders, config.write_plots)?;
            info!("Wrote summary of {} pass(es) to {}", passes.len(), path.display());
        }

        Ok(RunReport {
            output,
            write,
            passes: passes.len(),
            charts,
        })
    }
}

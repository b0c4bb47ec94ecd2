//! Command-line interface for the pass log pipeline.
//!
//! A bare invocation processes every log in `./logs` with the default
//! observer and writes `./output`.

use clap::Parser;
use log::{error, info, LevelFilter};
use passlog::geometry::Observer;
use passlog::{Config, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Enrich satellite receiver session logs with pass geometry",
    long_about = "Parses receiver session logs, merges progress metrics per timestamp, \
                  recovers satellite identity from each session folder's metadata file and \
                  adds azimuth, elevation, range and ground track from orbital elements.\n\n\
                  Writes a Parquet table, an HTML pass summary and SVG charts per pass."
)]
struct Args {
    /// Directory containing session log files
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Extension of log files to read
    #[arg(long, default_value = "log")]
    log_extension: String,

    /// Directory containing the session folders
    #[arg(long, value_name = "DIR", default_value = ".")]
    recordings_root: PathBuf,

    /// Metadata file path relative to a session folder (glob allowed)
    #[arg(long, default_value = "dataset.json")]
    sidecar_pattern: String,

    /// Cached orbital-element file
    #[arg(long, value_name = "FILE", default_value = "weather.txt")]
    tle_file: PathBuf,

    /// Where to fetch orbital elements when the cache is stale
    #[arg(long, default_value = passlog::catalog::DEFAULT_TLE_URL)]
    tle_url: String,

    /// Maximum age of the cached element file, in days
    #[arg(long, default_value = "3")]
    tle_max_age_days: u64,

    /// Observer latitude in degrees
    #[arg(long, default_value = "40.766136", allow_hyphen_values = true)]
    observer_lat: f64,

    /// Observer longitude in degrees
    #[arg(long, default_value = "-8.387586", allow_hyphen_values = true)]
    observer_lon: f64,

    /// Observer elevation above sea level in metres
    #[arg(long, default_value = "330", allow_hyphen_values = true)]
    observer_elevation: f64,

    /// Output directory for the Parquet table and summary
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    out_dir: PathBuf,

    /// Number of rows per Parquet file chunk
    #[arg(long, default_value = "50000")]
    chunk_size: usize,

    /// Skip the HTML summary
    #[arg(long)]
    no_report: bool,

    /// Skip the pass and decoder charts
    #[arg(long)]
    no_plots: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            log_dir: args.log_dir,
            log_extension: args.log_extension,
            recordings_root: args.recordings_root,
            sidecar_pattern: args.sidecar_pattern,
            tle_file: args.tle_file,
            tle_url: args.tle_url,
            tle_max_age: Duration::from_secs(args.tle_max_age_days * 24 * 3600),
            observer: Observer {
                latitude_deg: args.observer_lat,
                longitude_deg: args.observer_lon,
                elevation_m: args.observer_elevation,
            },
            out_dir: args.out_dir,
            chunk_size: args.chunk_size,
            write_report: !args.no_report,
            write_plots: !args.no_plots,
        }
    }
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let config = Config::from(Args::parse());

    info!("");
    info!("╔════════════════════════════════════════════╗");
    info!("║       Session Log → Pass Table             ║");
    info!("╚════════════════════════════════════════════╝");
    info!("");
    info!("📁 Output directory: {}", config.out_dir.display());

    let start = Instant::now();
    match Pipeline::new(config).run() {
        Ok(report) => {
            info!("   ├─ {} pass(es) summarised", report.passes);
            info!("   └─ ✓ Total time: {:.2?}", start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("✗ {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

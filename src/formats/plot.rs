//! Per-pass and per-decoder charts.
//!
//! Charts are written as SVG under `<out_dir>/images/`: one directory per
//! session folder holding its time series, ground track and sky plots, plus
//! one pair of combined sky plots per decoder. Sky plots put north at the top
//! and run clockwise; point colour follows SNR on a jet scale normalised over
//! the folder (or decoder) being drawn.

use anyhow::Result;
use chrono::NaiveDateTime;
use log::{debug, warn};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::models::EnrichedRecord;

pub const IMAGES_DIR: &str = "images";
pub const SNR_ELEVATION_FILE: &str = "SNR_and_Elevation_plot.svg";
pub const ROUTE_FILE: &str = "satellite_route.svg";
pub const POLAR_FILE: &str = "polar_plot.svg";
pub const POLAR_INVERTED_FILE: &str = "polar_plot_inverted.svg";

const FONT: &str = "sans-serif";
const SKY_EXTENT: f64 = 105.0;

/// Radial mapping of elevation onto a sky plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyProjection {
    /// Horizon at the centre, zenith on the outer ring.
    Polar,
    /// Zenith at the centre, horizon on the outer ring.
    Inverted,
}

impl SkyProjection {
    fn radius(self, elevation: f64) -> f64 {
        match self {
            SkyProjection::Polar => elevation.clamp(0.0, 90.0),
            SkyProjection::Inverted => 90.0 - elevation.clamp(0.0, 90.0),
        }
    }

    fn ring_label(self, radius: f64) -> f64 {
        match self {
            SkyProjection::Polar => radius,
            SkyProjection::Inverted => 90.0 - radius,
        }
    }
}

/// Plot coordinates of an azimuth/elevation pair.
pub fn sky_point(azimuth: f64, elevation: f64, projection: SkyProjection) -> (f64, f64) {
    let r = projection.radius(elevation);
    let (s, c) = azimuth.to_radians().sin_cos();
    (r * s, r * c)
}

/// Jet colour scale over `[0, 1]`.
pub fn jet(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let channel = |offset: f64| ((1.5 - (4.0 * t - offset).abs()).clamp(0.0, 1.0) * 255.0).round() as u8;
    RGBColor(channel(3.0), channel(2.0), channel(1.0))
}

/// File-system safe form of a folder or decoder name.
pub fn file_component(name: &str) -> String {
    name.replace(':', "-").replace(&['/', '\\'][..], "_")
}

/// Path of a per-pass chart relative to the output directory.
pub fn pass_plot_path(folder: &str, file: &str) -> String {
    format!("{}/{}/{}", IMAGES_DIR, file_component(folder), file)
}

/// Path of a combined per-decoder sky plot relative to the output directory.
pub fn decoder_plot_path(decoder: &str, projection: SkyProjection) -> String {
    let kind = match projection {
        SkyProjection::Polar => "polar_plot_all",
        SkyProjection::Inverted => "polar_plot_all_inverted",
    };
    format!("{}/{}_{}.svg", IMAGES_DIR, kind, file_component(decoder))
}

fn snr_range<'a, I>(rows: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    rows.into_iter()
        .filter_map(|r| r.record.snr)
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn normalize(value: f64, range: Option<(f64, f64)>) -> f64 {
    match range {
        Some((lo, hi)) if hi > lo => (value - lo) / (hi - lo),
        _ => 0.5,
    }
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    if hi - lo < 1e-9 {
        (lo - 1.0)..(hi + 1.0)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad)..(hi + pad)
    }
}

/// Renders every chart for a set of enriched rows.
pub struct PlotFormatter {
    output_directory: PathBuf,
}

impl PlotFormatter {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    /// Draw all charts and return the files written, in write order.
    pub fn convert(&self, rows: &[EnrichedRecord]) -> Result<Vec<PathBuf>> {
        let mut folders: BTreeMap<&str, Vec<&EnrichedRecord>> = BTreeMap::new();
        // Decoder tags are grouped upper-cased, as in the summary report.
        let mut decoders: BTreeMap<String, Vec<&EnrichedRecord>> = BTreeMap::new();
        for row in rows {
            if let Some(folder) = row.folder_name() {
                folders.entry(folder).or_default().push(row);
            }
            decoders.entry(row.decoder.to_uppercase()).or_default().push(row);
        }

        let mut written = Vec::new();
        for (folder, group) in &folders {
            if matches!(*folder, "." | "..") {
                warn!("Skipping charts for folder name {:?}", folder);
                continue;
            }
            written.extend(self.draw_pass(folder, group)?);
        }

        for (decoder, group) in &decoders {
            let snr = snr_range(group.iter().copied());
            for projection in [SkyProjection::Polar, SkyProjection::Inverted] {
                let path = self.output_directory.join(decoder_plot_path(decoder, projection));
                let title = match projection {
                    SkyProjection::Polar => format!("Combined polar plot for decoder {}", decoder),
                    SkyProjection::Inverted => {
                        format!("Combined inverted polar plot for decoder {}", decoder)
                    }
                };
                draw_sky(&path, &title, group, snr, projection)?;
                written.push(path);
            }
        }

        debug!("Wrote {} chart(s)", written.len());
        Ok(written)
    }

    fn draw_pass(&self, folder: &str, rows: &[&EnrichedRecord]) -> Result<Vec<PathBuf>> {
        let dir = self.output_directory.join(IMAGES_DIR).join(file_component(folder));
        fs::create_dir_all(&dir)?;
        let snr = snr_range(rows.iter().copied());
        let pass_at = rows
            .first()
            .and_then(|r| r.pass_timestamp)
            .map(|t| format!(" (pass at {})", t))
            .unwrap_or_default();

        let series = dir.join(SNR_ELEVATION_FILE);
        draw_snr_elevation(&series, folder, rows)?;

        let route = dir.join(ROUTE_FILE);
        draw_route(&route, folder, rows, snr)?;

        let polar = dir.join(POLAR_FILE);
        draw_sky(
            &polar,
            &format!("Polar plot for {}{}", folder, pass_at),
            rows,
            snr,
            SkyProjection::Polar,
        )?;

        let inverted = dir.join(POLAR_INVERTED_FILE);
        draw_sky(
            &inverted,
            &format!("Inverted polar plot for {}{}", folder, pass_at),
            rows,
            snr,
            SkyProjection::Inverted,
        )?;

        Ok(vec![series, route, polar, inverted])
    }
}

fn draw_snr_elevation(path: &Path, folder: &str, rows: &[&EnrichedRecord]) -> Result<()> {
    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let Some(start) = rows.first().map(|r| r.record.timestamp) else {
        root.present()?;
        return Ok(());
    };
    let seconds = |t: NaiveDateTime| (t - start).num_seconds() as f64;
    let span = rows.last().map(|r| seconds(r.record.timestamp)).unwrap_or(0.0);

    let snr_points: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| r.record.snr.map(|v| (seconds(r.record.timestamp), v)))
        .collect();
    let elevation_points: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| r.geometry.map(|g| (seconds(r.record.timestamp), g.elevation)))
        .collect();
    let (lo, hi) = snr_range(rows.iter().copied()).unwrap_or((0.0, 1.0));

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("SNR and elevation over time for {}", folder),
            (FONT, 24).into_font(),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(padded(0.0, span), padded(lo, hi))?
        .set_secondary_coord(padded(0.0, span), 0.0..90.0);

    let clock = |s: &f64| (start + chrono::Duration::seconds(*s as i64)).format("%H:%M:%S").to_string();
    chart
        .configure_mesh()
        .x_desc("Time (UTC)")
        .y_desc("SNR (dB)")
        .x_label_formatter(&clock)
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Elevation (deg)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(snr_points, BLUE.stroke_width(2)))?
        .label("SNR")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart
        .draw_secondary_series(LineSeries::new(elevation_points, RED.stroke_width(2)))?
        .label("Elevation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_route(
    path: &Path,
    folder: &str,
    rows: &[&EnrichedRecord],
    snr: Option<(f64, f64)>,
) -> Result<()> {
    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Satellite route for {}", folder), (FONT, 24).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-180.0..180.0, -90.0..90.0)?;
    chart
        .configure_mesh()
        .x_desc("Longitude (deg)")
        .y_desc("Latitude (deg)")
        .draw()?;

    chart.draw_series(rows.iter().filter_map(|r| {
        let g = r.geometry?;
        let value = r.record.snr?;
        Some(Circle::new((g.lon, g.lat), 4, jet(normalize(value, snr)).filled()))
    }))?;
    if let Some((lo, hi)) = snr {
        chart.draw_series(std::iter::once(Text::new(
            format!("SNR {:.2} to {:.2} dB", lo, hi),
            (-175.0, -80.0),
            (FONT, 16).into_font(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn draw_sky(
    path: &Path,
    title: &str,
    rows: &[&EnrichedRecord],
    snr: Option<(f64, f64)>,
    projection: SkyProjection,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let root = SVGBackend::new(path, (900, 960)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 22).into_font())
        .margin(20)
        .build_cartesian_2d(-SKY_EXTENT..SKY_EXTENT, -SKY_EXTENT..SKY_EXTENT)?;

    let grid = BLACK.mix(0.3).stroke_width(1);
    for step in 1..=6 {
        let radius = f64::from(step) * 15.0;
        let ring: Vec<(f64, f64)> = (0..=360)
            .map(|deg| {
                let (s, c) = f64::from(deg).to_radians().sin_cos();
                (radius * s, radius * c)
            })
            .collect();
        chart.draw_series(std::iter::once(PathElement::new(ring, grid)))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.0}", projection.ring_label(radius)),
            (2.0, radius + 1.0),
            (FONT, 12).into_font(),
        )))?;
    }
    for spoke in (0..360).step_by(30) {
        let (s, c) = f64::from(spoke).to_radians().sin_cos();
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), (90.0 * s, 90.0 * c)],
            grid,
        )))?;
    }
    for (label, x, y) in [("N", -2.0, 101.0), ("E", 96.0, 2.0), ("S", -2.0, -96.0), ("W", -101.0, 2.0)] {
        chart.draw_series(std::iter::once(Text::new(label, (x, y), (FONT, 18).into_font())))?;
    }

    chart.draw_series(rows.iter().filter_map(|r| {
        let g = r.geometry?;
        let value = r.record.snr?;
        let colour = jet(normalize(value, snr));
        Some(Circle::new(
            sky_point(g.azimuth, g.elevation, projection),
            5,
            colour.filled(),
        ))
    }))?;
    if let Some((lo, hi)) = snr {
        chart.draw_series(std::iter::once(Text::new(
            format!("SNR {:.2} to {:.2} dB", lo, hi),
            (-SKY_EXTENT + 2.0, -SKY_EXTENT + 3.0),
            (FONT, 14).into_font(),
        )))?;
    }

    root.present()?;
    Ok(())
}

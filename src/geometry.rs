//! Satellite look angles and ground track.
//!
//! Propagation is delegated to SGP4. Its TEME position is rotated into an
//! Earth-fixed frame by Greenwich sidereal time (polar motion ignored), then
//! expressed relative to a WGS-84 observer.

use chrono::NaiveDateTime;
use log::warn;

use crate::catalog::{CatalogEntry, TleCatalog};
use crate::error::{Error, Result};
use crate::models::{EnrichedRecord, Geometry};

const WGS84_A_KM: f64 = 6378.137;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Fixed ground station location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            latitude_deg: 40.766136,
            longitude_deg: -8.387586,
            elevation_m: 330.0,
        }
    }
}

impl Observer {
    /// Earth-fixed position in kilometres.
    fn ecef(&self) -> [f64; 3] {
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        let h = self.elevation_m / 1000.0;
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let n = WGS84_A_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        [
            (n + h) * lat.cos() * lon.cos(),
            (n + h) * lat.cos() * lon.sin(),
            (n * (1.0 - e2) + h) * lat.sin(),
        ]
    }
}

/// Map a log-derived satellite name to the catalog's naming: the last `-`
/// becomes a space (`NOAA-19` -> `NOAA 19`).
pub fn catalog_name(satellite: &str) -> String {
    match satellite.rfind('-') {
        Some(idx) => format!("{} {}", &satellite[..idx], &satellite[idx + 1..]),
        None => satellite.to_string(),
    }
}

fn teme_to_ecef(position: [f64; 3], gmst: f64) -> [f64; 3] {
    let (s, c) = gmst.sin_cos();
    [
        c * position[0] + s * position[1],
        -s * position[0] + c * position[1],
        position[2],
    ]
}

/// Geodetic latitude and longitude in degrees of an Earth-fixed point.
fn ecef_to_latlon(p: [f64; 3]) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let lon = p[1].atan2(p[0]);
    let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
    let mut lat = p[2].atan2(r * (1.0 - e2));
    for _ in 0..5 {
        let n = WGS84_A_KM / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        lat = (p[2] + e2 * n * lat.sin()).atan2(r);
    }
    (lat.to_degrees(), lon.to_degrees())
}

/// Azimuth and elevation in degrees and slant range in kilometres of an
/// Earth-fixed point, seen from `observer` (south-east-zenith frame).
fn look_angles(sat: [f64; 3], observer: &Observer) -> (f64, f64, f64) {
    let obs = observer.ecef();
    let d = [sat[0] - obs[0], sat[1] - obs[1], sat[2] - obs[2]];

    let lat = observer.latitude_deg.to_radians();
    let lon = observer.longitude_deg.to_radians();
    let (slat, clat) = lat.sin_cos();
    let (slon, clon) = lon.sin_cos();
    let south = slat * clon * d[0] + slat * slon * d[1] - clat * d[2];
    let east = -slon * d[0] + clon * d[1];
    let up = clat * clon * d[0] + clat * slon * d[1] + slat * d[2];

    let distance = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    let elevation = (up / distance).asin().to_degrees();
    let azimuth = east.atan2(-south).to_degrees().rem_euclid(360.0);
    (azimuth, elevation, distance)
}

/// Compute look angles and sub-satellite point for one instant.
pub fn compute(entry: &CatalogEntry, observer: &Observer, at: &NaiveDateTime) -> Result<Geometry> {
    let minutes = entry
        .elements
        .datetime_to_minutes_since_epoch(at)
        .map_err(|e| Error::Other(format!("{}: {}", entry.name, e)))?;
    let prediction = entry
        .constants
        .propagate(minutes)
        .map_err(|e| Error::Other(format!("{}: {}", entry.name, e)))?;

    let gmst = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(at));
    let sat = teme_to_ecef(prediction.position, gmst);
    let (azimuth, elevation, distance) = look_angles(sat, observer);
    let (sub_lat, sub_lon) = ecef_to_latlon(sat);

    let geometry = Geometry {
        azimuth,
        elevation,
        distance,
        lat: sub_lat,
        lon: sub_lon,
    };
    let values = [azimuth, elevation, distance, sub_lat, sub_lon];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::Other(format!(
            "{}: non-finite geometry at {}",
            entry.name, at
        )));
    }
    Ok(geometry)
}

/// Attaches geometry to enriched rows against a fixed observer and catalog.
pub struct GeometryEnricher<'a> {
    catalog: &'a TleCatalog,
    observer: Observer,
}

impl<'a> GeometryEnricher<'a> {
    pub fn new(catalog: &'a TleCatalog, observer: Observer) -> Self {
        Self { catalog, observer }
    }

    /// Geometry for one row, or `None` when the satellite is not in the
    /// catalog or propagation fails. Failures are logged, never propagated.
    pub fn geometry_for(&self, row: &EnrichedRecord) -> Option<Geometry> {
        let name = catalog_name(&row.satellite);
        let entry = self.catalog.get(&name)?;
        match compute(entry, &self.observer, &row.record.timestamp) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                warn!(
                    "Error calculating geometry for {} at {}: {}",
                    row.satellite, row.record.timestamp, e
                );
                None
            }
        }
    }

    /// Fill in geometry for every row. Returns how many rows got a value.
    pub fn enrich(&self, rows: &mut [EnrichedRecord]) -> usize {
        let mut filled = 0;
        for row in rows.iter_mut() {
            row.geometry = self.geometry_for(row);
            if row.geometry.is_some() {
                filled += 1;
            }
        }
        filled
    }
}

//! The map projection bridge.
//!
//! The geometry code does not know anything about projections; it only needs a
//! forward and an inverse mapping between geographic coordinates and map plane
//! coordinates. Real deployments plug in a full projection library through the
//! same two-function surface; the built in set here covers the projections the
//! sweep rendering path actually uses.
use std::f64::consts::FRAC_PI_2;

use crate::errors::Error;
use crate::geog::{lon_in_domain, R_EARTH};

const RAD_PER_DEG: f64 = std::f64::consts::PI / 180.0;

/// A map projection selected from a string specifier.
///
/// Specifiers name the projection and its reference point in degrees, e.g.
/// `"CylEqDist 0.0 0.0"`. Angles everywhere else are radians.
/// ```
/// # use rayvol_core::proj::Projection;
/// let proj = Projection::from_spec("CylEqDist 0.0 0.0").unwrap();
/// let (x, y) = proj.lonlat_to_xy(0.01, 0.0).unwrap();
/// assert!(y.abs() < 1e-9);
/// let (lon, lat) = proj.xy_to_lonlat(x, y).unwrap();
/// assert!((lon - 0.01).abs() < 1e-12 && lat.abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Equirectangular (cylindrical equidistant) about a reference point.
    CylEqDist { rlon: f64, rlat: f64 },
    /// Mercator about a reference longitude.
    Mercator { rlon: f64 },
    /// Lambert cylindrical equal area about a reference longitude.
    CylEqArea { rlon: f64 },
}

impl Projection {
    /// Parse a projection specifier.
    pub fn from_spec(spec: &str) -> Result<Self, Error> {
        let bad = || Error::BadProjection { spec: spec.to_string() };
        let mut words = spec.split_whitespace();
        let name = words.next().ok_or_else(bad)?;
        let deg = |w: Option<&str>| -> Result<f64, Error> {
            w.ok_or_else(bad)?.parse::<f64>().map(|d| d * RAD_PER_DEG).map_err(|_| bad())
        };
        let proj = match name {
            "CylEqDist" => {
                let rlon = deg(words.next())?;
                let rlat = deg(words.next())?;
                Projection::CylEqDist { rlon, rlat }
            }
            "Mercator" => Projection::Mercator { rlon: deg(words.next())? },
            "CylEqArea" => Projection::CylEqArea { rlon: deg(words.next())? },
            _ => return Err(bad()),
        };
        if words.next().is_some() {
            return Err(bad());
        }
        Ok(proj)
    }

    /// Forward evaluation. Returns `None` where the projection is undefined.
    pub fn lonlat_to_xy(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match *self {
            Projection::CylEqDist { rlon, rlat } => {
                let x = R_EARTH * rlat.cos() * (lon_in_domain(lon, rlon) - rlon);
                let y = R_EARTH * (lat - rlat);
                Some((x, y))
            }
            Projection::Mercator { rlon } => {
                if lat.abs() >= FRAC_PI_2 {
                    return None;
                }
                let x = R_EARTH * (lon_in_domain(lon, rlon) - rlon);
                let y = R_EARTH * (FRAC_PI_2 / 2.0 + lat / 2.0).tan().ln();
                Some((x, y))
            }
            Projection::CylEqArea { rlon } => {
                let x = R_EARTH * (lon_in_domain(lon, rlon) - rlon);
                let y = R_EARTH * lat.sin();
                Some((x, y))
            }
        }
    }

    /// Inverse evaluation. Returns `None` where the map point has no preimage.
    pub fn xy_to_lonlat(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match *self {
            Projection::CylEqDist { rlon, rlat } => {
                let cos_rlat = rlat.cos();
                if cos_rlat == 0.0 {
                    return None;
                }
                let lon = lon_in_domain(rlon + x / (R_EARTH * cos_rlat), 0.0);
                let lat = rlat + y / R_EARTH;
                if lat.abs() > FRAC_PI_2 {
                    return None;
                }
                Some((lon, lat))
            }
            Projection::Mercator { rlon } => {
                let lon = lon_in_domain(rlon + x / R_EARTH, 0.0);
                let lat = 2.0 * (y / R_EARTH).exp().atan() - FRAC_PI_2;
                Some((lon, lat))
            }
            Projection::CylEqArea { rlon } => {
                let s = y / R_EARTH;
                if s.abs() > 1.0 {
                    return None;
                }
                let lon = lon_in_domain(rlon + x / R_EARTH, 0.0);
                Some((lon, s.asin()))
            }
        }
    }
}

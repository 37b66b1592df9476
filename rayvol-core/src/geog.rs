//! Spherical earth geography.
//!
//! All angles are radians. The functions are pure and operate on a sphere of radius
//! [`R_EARTH`]; beam height computations for RHI sweeps use an effective radius of
//! 4/3 of that to approximate standard atmospheric refraction.
use std::f64::consts::{FRAC_PI_2, PI};

/// Default earth radius in meters.
pub const R_EARTH: f64 = 6.3712e6;

/// Effective radius multiplier for the 4/3 earth refraction model.
pub const FOUR_THIRD: f64 = 4.0 / 3.0;

/// Put `lon` into the interval of one turn centered on `reflon`.
/// ```
/// # use std::f64::consts::PI;
/// # use rayvol_core::geog::lon_in_domain;
/// assert!((lon_in_domain(3.0 * PI, 0.0) - PI).abs() < 1e-12 || (lon_in_domain(3.0 * PI, 0.0) + PI).abs() < 1e-12);
/// assert!((lon_in_domain(-0.25 * PI, PI) - 1.75 * PI).abs() < 1e-12);
/// ```
pub fn lon_in_domain(lon: f64, reflon: f64) -> f64 {
    let d = (lon - reflon + PI).rem_euclid(2.0 * PI) - PI;
    reflon + d
}

/// Wrap a latitude into [-pi/2, pi/2], folding over the poles.
pub fn lat_in_domain(lat: f64) -> f64 {
    let l = lon_in_domain(lat, 0.0);
    if l > FRAC_PI_2 {
        PI - l
    } else if l < -FRAC_PI_2 {
        -PI - l
    } else {
        l
    }
}

/// The great circle forward problem: step from `(lon0, lat0)` along bearing `az` for
/// `arc` radians of arc, returning the destination `(lon, lat)`.
pub fn step(lon0: f64, lat0: f64, az: f64, arc: f64) -> (f64, f64) {
    let sin_lat = lat0.sin() * arc.cos() + lat0.cos() * arc.sin() * az.cos();
    let lat = sin_lat.asin();
    let lon = lon0
        + (az.sin() * arc.sin() * lat0.cos()).atan2(arc.cos() - lat0.sin() * sin_lat);
    (lon_in_domain(lon, 0.0), lat)
}

/// Great circle distance between two points, in radians of arc.
pub fn distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let sin_dlat = ((lat2 - lat1) / 2.0).sin();
    let sin_dlon = ((lon2 - lon1) / 2.0).sin();
    let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * a.sqrt().min(1.0).asin()
}

/// Bearing from point 1 towards point 2, in radians clockwise from north.
pub fn azimuth(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlon = lon2 - lon1;
    (lat2.cos() * dlon.sin()).atan2(lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos())
}

/// Height of a beam above the surface after travelling `range` meters at `tilt`
/// radians of elevation over an earth of effective radius `r_eff` meters.
/// ```
/// # use rayvol_core::geog::{beam_height, R_EARTH, FOUR_THIRD};
/// // A horizontal beam gains height with distance.
/// let h = beam_height(50_000.0, 0.0, FOUR_THIRD * R_EARTH);
/// assert!(h > 100.0 && h < 200.0);
/// // At zero range the beam is at the radar.
/// assert_eq!(beam_height(0.0, 0.1, R_EARTH), 0.0);
/// ```
pub fn beam_height(range: f64, tilt: f64, r_eff: f64) -> f64 {
    (r_eff * r_eff + range * range + 2.0 * r_eff * range * tilt.sin()).sqrt() - r_eff
}

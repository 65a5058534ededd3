//! WGS84 coordinates and base station specifications
use lazy_static::lazy_static;
use nalgebra::{Matrix3, Vector3};
use regex::Regex;

use crate::{
    constants::{WGS84_SEMI_MAJOR_AXIS_M, WGS84_SEMI_MINOR_AXIS_M},
    error::Error,
};

lazy_static! {
    /// meter[XYZ] or degree[NE], height[DU]
    static ref DECIMAL: Regex = Regex::new(r"^([+-]?\d+\.?\d*)([XYZNEDU]?)$").unwrap();
    /// deg_min_sec[NE] or deg_min[NE]
    static ref DEG_MIN_SEC: Regex =
        Regex::new(r"^([+-]?\d+)_(?:(\d+)_(\d+\.?\d*)|(\d+\.?\d*))([NE])$").unwrap();
}

fn eccentricity_sq() -> f64 {
    let (a_sq, b_sq) = (
        WGS84_SEMI_MAJOR_AXIS_M.powi(2),
        WGS84_SEMI_MINOR_AXIS_M.powi(2),
    );
    (a_sq - b_sq) / a_sq
}

/// ECEF [m] to geodetic (latitude [rad], longitude [rad], height [m])
pub fn ecef_to_llh(ecef: &Vector3<f64>) -> Vector3<f64> {
    let (a, b) = (WGS84_SEMI_MAJOR_AXIS_M, WGS84_SEMI_MINOR_AXIS_M);
    let e_sq = eccentricity_sq();
    let ep_sq = (a * a - b * b) / (b * b);

    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let r = (p * p + ecef.z * ecef.z).sqrt();

    let beta = ((b * ecef.z) / (a * p) * (1.0 + ep_sq * (b / r))).atan();

    let latitude = {
        let num = ecef.z + ep_sq * b * beta.sin().powi(3);
        let denom = p - e_sq * a * beta.cos().powi(3);
        (num / denom).atan()
    };
    let longitude = ecef.y.atan2(ecef.x);

    let v = a / (1.0 - e_sq * latitude.sin().powi(2)).sqrt();
    let height = p * latitude.cos() + ecef.z * latitude.sin() - a * a / v;

    Vector3::new(latitude, longitude, height)
}

/// Geodetic (latitude [rad], longitude [rad], height [m]) to ECEF [m]
pub fn llh_to_ecef(llh: &Vector3<f64>) -> Vector3<f64> {
    let (lat, lon, h) = (llh[0], llh[1], llh[2]);
    let e_sq = eccentricity_sq();
    let n = WGS84_SEMI_MAJOR_AXIS_M / (1.0 - e_sq * lat.sin().powi(2)).sqrt();

    Vector3::new(
        (n + h) * lat.cos() * lon.cos(),
        (n + h) * lat.cos() * lon.sin(),
        (n * (1.0 - e_sq) + h) * lat.sin(),
    )
}

/// East, north, up coordinates of `ecef`, relative to `base` (both ECEF)
pub fn relative_enu(ecef: &Vector3<f64>, base: &Vector3<f64>) -> Vector3<f64> {
    let llh = ecef_to_llh(base);
    let (sin_lat, cos_lat) = llh[0].sin_cos();
    let (sin_lon, cos_lon) = llh[1].sin_cos();

    let rotation = Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    );

    rotation * (ecef - base)
}

/// Parses a base station position `a,b,c`, returns its ECEF coordinates.
/// Each item is either `value[XYZNEDU]` or `deg_min[_sec][NE]`. Items
/// without axis default to X, Y, then the height.
pub fn parse_base_station(spec: &str) -> Result<Vector3<f64>, Error> {
    let items = spec.split(',').map(|item| item.trim()).collect::<Vec<_>>();
    if items.len() != 3 {
        return Err(Error::UnknownCoordinate(spec.to_string()));
    }

    let mut crd = [0.0_f64; 3];
    let mut axes = String::with_capacity(3);

    for (i, item) in items.iter().enumerate() {
        let unknown = || Error::UnknownCoordinate(item.to_string());

        if let Some(caps) = DECIMAL.captures(item) {
            crd[i] = caps[1].parse::<f64>().map_err(|_| unknown())?;
            let axis = caps
                .get(2)
                .and_then(|axis| axis.as_str().chars().next())
                .unwrap_or(['X', 'Y', '?'][i]);
            axes.push(axis);
        } else if let Some(caps) = DEG_MIN_SEC.captures(item) {
            let degrees = caps[1].parse::<f64>().map_err(|_| unknown())?;
            let minutes = caps
                .get(2)
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().parse::<f64>())
                .transpose()
                .map_err(|_| unknown())?
                .unwrap_or(0.0);
            let seconds = caps
                .get(3)
                .map(|s| s.as_str().parse::<f64>())
                .transpose()
                .map_err(|_| unknown())?
                .unwrap_or(0.0);

            let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
            crd[i] = if caps[1].starts_with('-') {
                -magnitude
            } else {
                magnitude
            };
            axes.push(caps[5].chars().next().unwrap_or('?'));
        } else {
            return Err(unknown());
        }
    }

    let (lat, lon, height) = match axes.as_str() {
        "XYZ" | "XY?" => return Ok(Vector3::new(crd[0], crd[1], crd[2])),
        "NED" => (crd[0], crd[1], -crd[2]),
        "NEU" | "NE?" => (crd[0], crd[1], crd[2]),
        "ENU" | "EN?" => (crd[1], crd[0], crd[2]),
        _ => return Err(Error::UnknownCoordinate(spec.to_string())),
    };

    Ok(llh_to_ecef(&Vector3::new(
        lat.to_radians(),
        lon.to_radians(),
        height,
    )))
}

use std::cell::OnceCell;

use gnss::prelude::SV;
use hifitime::Epoch;
use nalgebra::{DMatrix, DVector, Vector3};

use super::geometry::Geometry;
use crate::coords::ecef_to_llh;

/// Dilution of precision
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Dop {
    pub gdop: f64,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
    pub tdop: f64,
}

/// Fault detection statistics
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FaultDetection {
    /// Weighted sum of squared residuals
    pub wssr: f64,
    /// WSSR scale factor
    pub wssr_sf: f64,
    pub weight_max: f64,
    pub slope_h_max: f64,
    pub slope_h_max_sv: SV,
    pub slope_v_max: f64,
    pub slope_v_max_sv: SV,
}

/// Fault exclusion candidate
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Exclusion {
    /// WSSR without the excluded vehicle
    pub wssr: f64,
    pub excluded: SV,
}

/// PVT solution.
///
/// `g_enu` is the design matrix (one row per used vehicle, in
/// [Solution::used_satellites] order, first three columns being the
/// satellite to user line of sight in east, north, up components).
/// `s` is the matching least squares sensitivity matrix, `w` the weight
/// matrix and `delta_r` the range residuals.
///
/// [Geometry] is derived from this state on first request and cached,
/// it is not updated by later modifications.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Receiver time
    pub t: Epoch,
    pub position_solved: bool,
    pub velocity_solved: bool,
    /// ECEF position [m]
    pub position_ecef: Vector3<f64>,
    /// Receiver clock error [m]
    pub receiver_error: f64,
    /// Receiver clock error rate [m/s]
    pub receiver_error_rate: f64,
    pub dop: Dop,
    /// North, east, down velocity [m/s]
    pub velocity_ned: Vector3<f64>,
    pub used_satellites: Vec<SV>,
    pub g_enu: DMatrix<f64>,
    pub s: DMatrix<f64>,
    pub w: DMatrix<f64>,
    pub delta_r: DVector<f64>,
    pub fd: Option<FaultDetection>,
    pub fde_min: Option<Exclusion>,
    pub fde_2nd: Option<Exclusion>,
    derived: OnceCell<Geometry>,
}

impl Solution {
    /// Unsolved solution at time `t`
    pub fn new(t: Epoch) -> Self {
        Self {
            t,
            position_solved: false,
            velocity_solved: false,
            position_ecef: Vector3::zeros(),
            receiver_error: 0.0,
            receiver_error_rate: 0.0,
            dop: Dop::default(),
            velocity_ned: Vector3::zeros(),
            used_satellites: Vec::new(),
            g_enu: DMatrix::zeros(0, 4),
            s: DMatrix::zeros(4, 0),
            w: DMatrix::zeros(0, 0),
            delta_r: DVector::zeros(0),
            fd: None,
            fde_min: None,
            fde_2nd: None,
            derived: OnceCell::new(),
        }
    }

    /// Latitude [rad], longitude [rad], height [m]
    pub fn llh(&self) -> Vector3<f64> {
        ecef_to_llh(&self.position_ecef)
    }

    /// Row of this vehicle in the solution matrices
    pub fn satellite_index(&self, sv: SV) -> Option<usize> {
        self.used_satellites.iter().position(|s| *s == sv)
    }

    /// Range residual [m] of a used vehicle
    pub fn range_residual(&self, sv: SV) -> Option<f64> {
        let i = self.satellite_index(sv)?;
        self.delta_r.get(i).copied()
    }

    /// Weight of a used vehicle
    pub fn weight(&self, sv: SV) -> Option<f64> {
        let i = self.satellite_index(sv)?;
        self.w.get((i, i)).copied()
    }

    /// Derived per vehicle geometry, computed once
    pub fn geometry(&self) -> &Geometry {
        self.derived.get_or_init(|| Geometry::new(self))
    }
}

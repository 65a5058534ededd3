//! PVT solver interface
use std::{path::Path, str::FromStr};

use gnss::prelude::SV;
use hifitime::Epoch;

use crate::{
    collecter::{
        brdc::{GpsEphemeris, IonoUtcParameters},
        fd::FileKind,
        observations::MeasurementEpoch,
    },
    error::Error,
};

pub(crate) mod geometry;
mod passthrough;
mod solution;

pub use geometry::Geometry;
pub use passthrough::PassthroughSolver;
pub use solution::{Dop, Exclusion, FaultDetection, Solution};

/// Broadcast navigation data sink
pub trait NavigationStore {
    fn register_ephemeris(&mut self, sv: SV, eph: GpsEphemeris);
    fn update_iono_utc(&mut self, params: IonoUtcParameters);
}

/// Relative weighting of each measurement
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Weighting {
    /// `(sin(el) / 0.8)^2`
    Elevation,
    /// Same weight for every measurement
    #[default]
    Identical,
}

impl Weighting {
    /// Weight of a measurement, `elevation` in radians
    pub fn weight(&self, elevation: f64) -> f64 {
        match self {
            Self::Elevation => (elevation.sin() / 0.8).powi(2),
            Self::Identical => 1.0,
        }
    }
}

impl FromStr for Weighting {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elevation" => Ok(Self::Elevation),
            "identical" => Ok(Self::Identical),
            _ => Err(Error::UnknownWeighting(s.to_string())),
        }
    }
}

/// Options handed to the [Solver] prior processing
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Elevation mask [rad]
    pub elevation_mask: f64,
    /// Residual mask [m]
    pub residual_mask: f64,
    pub weighting: Weighting,
    /// Vehicles forcibly used
    pub include: Vec<SV>,
    /// Vehicles never used
    pub exclude: Vec<SV>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            elevation_mask: 0.0,
            residual_mask: 1.0E4,
            weighting: Weighting::default(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl SolverOptions {
    /// Adds to the include list, removing from the exclude list
    pub fn include(&mut self, sv: SV) {
        self.exclude.retain(|s| *s != sv);
        if !self.include.contains(&sv) {
            self.include.push(sv);
        }
    }

    /// Adds to the exclude list, removing from the include list
    pub fn exclude(&mut self, sv: SV) {
        self.include.retain(|s| *s != sv);
        if !self.exclude.contains(&sv) {
            self.exclude.push(sv);
        }
    }
}

/// Position, velocity & time solver
pub trait Solver: NavigationStore {
    fn configure(&mut self, opts: &SolverOptions);

    /// Solves this measurement epoch, `t` being the approximate receiver time
    fn solve(&mut self, meas: &MeasurementEpoch, t: Epoch) -> Solution;

    /// Loads an auxiliary (navigation, precise orbit, antenna, clock) file,
    /// returns the number of items loaded.
    fn load(&mut self, kind: FileKind, path: &Path) -> Result<usize, Error>;
}

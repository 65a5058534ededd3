use std::{collections::BTreeMap, path::Path};

use gnss::prelude::SV;
use hifitime::Epoch;
use log::{debug, warn};

use super::{NavigationStore, Solution, Solver, SolverOptions};
use crate::{
    collecter::{
        brdc::{GpsEphemeris, IonoUtcParameters},
        fd::FileKind,
        observations::MeasurementEpoch,
    },
    error::Error,
};

/// [Solver] without numerical engine. Navigation data is retained
/// and every epoch resolves to an unsolved [Solution].
#[derive(Debug, Default)]
pub struct PassthroughSolver {
    pub options: SolverOptions,
    pub ephemerides: BTreeMap<SV, GpsEphemeris>,
    pub iono_utc: Option<IonoUtcParameters>,
    loaded: Vec<FileKind>,
}

impl PassthroughSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NavigationStore for PassthroughSolver {
    fn register_ephemeris(&mut self, sv: SV, eph: GpsEphemeris) {
        debug!("{} - new ephemeris (iode={})", sv, eph.iode);
        self.ephemerides.insert(sv, eph);
    }

    fn update_iono_utc(&mut self, params: IonoUtcParameters) {
        self.iono_utc = Some(params);
    }
}

impl Solver for PassthroughSolver {
    fn configure(&mut self, opts: &SolverOptions) {
        self.options = opts.clone();
    }

    fn solve(&mut self, meas: &MeasurementEpoch, _: Epoch) -> Solution {
        Solution::new(meas.t)
    }

    fn load(&mut self, kind: FileKind, path: &Path) -> Result<usize, Error> {
        if kind == FileKind::Antex && !self.loaded.contains(&FileKind::Sp3) {
            return Err(Error::MissingPreciseOrbits(path.to_string_lossy().to_string()));
        }

        kind.check_format(path)?;
        self.loaded.push(kind);

        warn!("{} - {} content is not used by this solver", path.display(), kind);
        Ok(0)
    }
}

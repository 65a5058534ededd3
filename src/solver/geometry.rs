//! Per vehicle geometry derived from the solution matrices
use std::collections::HashMap;

use gnss::prelude::SV;
use log::trace;
use nalgebra::DMatrix;

use super::Solution;

/// Below this, the residual projection is considered singular
const SINGULAR_PROJECTION: f64 = 1.0E-8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Azimuth [rad]
    pub azimuth: HashMap<SV, f64>,
    /// Elevation [rad]
    pub elevation: HashMap<SV, f64>,
    /// Horizontal slope, only when fault detection ran
    pub slope_h: HashMap<SV, f64>,
    /// Vertical slope, only when fault detection ran
    pub slope_v: HashMap<SV, f64>,
    /// Solved parameters beyond position & clock
    pub other_state: Vec<f64>,
}

impl Geometry {
    pub fn new(solution: &Solution) -> Self {
        let mut geometry = Self::default();
        let g = &solution.g_enu;

        if g.ncols() < 3 {
            return geometry;
        }

        for (i, sv) in solution.used_satellites.iter().enumerate().take(g.nrows()) {
            // line of sight is oriented from the vehicle to the user
            let (e, n, u) = (g[(i, 0)], g[(i, 1)], g[(i, 2)]);
            geometry.azimuth.insert(*sv, (-e).atan2(-n));
            geometry.elevation.insert(*sv, (-u).clamp(-1.0, 1.0).asin());
        }

        if solution.fd.is_some() {
            geometry.slopes(solution);
        }

        if solution.position_solved && solution.s.ncols() == solution.delta_r.nrows() {
            let state = &solution.s * &solution.delta_r;
            geometry.other_state = state.iter().skip(4).copied().collect();
        }

        trace!("{} - geometry: {:?}", solution.t, geometry);
        geometry
    }

    fn slopes(&mut self, solution: &Solution) {
        let (g, s, w) = (&solution.g_enu, &solution.s, &solution.w);
        let n = g.nrows();

        if s.nrows() < 3 || s.ncols() != n || g.ncols() != s.nrows() || w.nrows() != n {
            return;
        }

        let p = DMatrix::<f64>::identity(n, n) - g * s;

        for (i, sv) in solution.used_satellites.iter().enumerate().take(n) {
            let (slope_h, slope_v) = if p[(i, i)] < SINGULAR_PROJECTION {
                (0.0, 0.0)
            } else {
                let denom = (p[(i, i)] * w[(i, i)]).sqrt();
                (
                    (s[(0, i)].powi(2) + s[(1, i)].powi(2)).sqrt() / denom,
                    s[(2, i)].abs() / denom,
                )
            };
            self.slope_h.insert(*sv, slope_h);
            self.slope_v.insert(*sv, slope_v);
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::solver::FaultDetection;
    use gnss::prelude::Constellation;
    use hifitime::{Epoch, TimeScale};
    use nalgebra::DVector;
    use std::f64::consts::FRAC_1_SQRT_2;

    /// Line of sight (vehicle to user) for given azimuth & elevation [deg]
    fn line_of_sight(azimuth: f64, elevation: f64) -> [f64; 3] {
        let (az, el) = (azimuth.to_radians(), elevation.to_radians());
        [
            -el.cos() * az.sin(),
            -el.cos() * az.cos(),
            -el.sin(),
        ]
    }

    /// Solved solution with 5 vehicles, unit weights and least squares sensitivity
    pub(crate) fn solution() -> Solution {
        let t = Epoch::from_time_of_week(2190, 100_000_000_000, TimeScale::GPST);
        let mut solution = Solution::new(t);

        let geometry = [(0.0, 90.0), (0.0, 30.0), (90.0, 30.0), (180.0, 30.0), (270.0, 45.0)];
        let n = geometry.len();

        solution.used_satellites = (1..=n as u8)
            .map(|prn| SV::new(Constellation::GPS, prn))
            .collect();

        let mut g = DMatrix::zeros(n, 4);
        for (i, (az, el)) in geometry.iter().enumerate() {
            let los = line_of_sight(*az, *el);
            g[(i, 0)] = los[0];
            g[(i, 1)] = los[1];
            g[(i, 2)] = los[2];
            g[(i, 3)] = 1.0;
        }

        let w = DMatrix::identity(n, n);
        let gtwg = g.transpose() * &w * &g;
        let s = gtwg.try_inverse().unwrap() * g.transpose() * &w;

        solution.position_solved = true;
        solution.g_enu = g;
        solution.s = s;
        solution.w = w;
        solution.delta_r = DVector::from_vec(vec![1.0, -0.5, 0.25, 0.0, 2.0]);
        solution
    }

    #[test]
    fn azimuth_elevation() {
        let solution = solution();
        let geometry = solution.geometry();

        let g01 = SV::new(Constellation::GPS, 1);
        let g03 = SV::new(Constellation::GPS, 3);
        let g05 = SV::new(Constellation::GPS, 5);

        assert!((geometry.elevation[&g01].to_degrees() - 90.0).abs() < 1.0E-9);
        assert!((geometry.azimuth[&g03].to_degrees() - 90.0).abs() < 1.0E-9);
        assert!((geometry.elevation[&g03].to_degrees() - 30.0).abs() < 1.0E-9);
        assert!((geometry.azimuth[&g05].to_degrees() + 90.0).abs() < 1.0E-9);
        assert!((geometry.elevation[&g05].sin() - FRAC_1_SQRT_2).abs() < 1.0E-9);

        assert!(geometry.slope_h.is_empty(), "no fault detection");
        assert!(geometry.other_state.is_empty(), "4 states only");
    }

    #[test]
    fn memoized() {
        let solution = solution();
        let first = solution.geometry() as *const Geometry;
        let second = solution.geometry() as *const Geometry;
        assert_eq!(first, second);
    }

    #[test]
    fn slopes() {
        let mut solution = solution();
        let g01 = SV::new(Constellation::GPS, 1);
        solution.fd = Some(FaultDetection {
            wssr: 1.0,
            wssr_sf: 1.0,
            weight_max: 1.0,
            slope_h_max: 0.0,
            slope_h_max_sv: g01,
            slope_v_max: 0.0,
            slope_v_max_sv: g01,
        });

        let p = DMatrix::<f64>::identity(5, 5) - &solution.g_enu * &solution.s;
        let geometry = solution.geometry();
        assert_eq!(geometry.slope_h.len(), 5);
        assert_eq!(geometry.slope_v.len(), 5);

        for (i, sv) in solution.used_satellites.iter().enumerate() {
            let expected_v = solution.s[(2, i)].abs() / p[(i, i)].sqrt();
            assert!((geometry.slope_v[sv] - expected_v).abs() < 1.0E-9);
            assert!(geometry.slope_h[sv] >= 0.0);
        }
    }

    #[test]
    fn other_states() {
        let mut solution = solution();

        // 5th (inter system bias like) state
        let n = solution.used_satellites.len();
        let mut g = solution.g_enu.clone().resize_horizontally(5, 0.0);
        g[(n - 1, 4)] = 1.0;
        let s = (g.transpose() * &g).try_inverse().unwrap() * g.transpose();
        solution.g_enu = g;
        solution.s = s;

        let geometry = solution.geometry();
        assert_eq!(geometry.other_state.len(), 1);

        let expected = (&solution.s * &solution.delta_r)[4];
        assert!((geometry.other_state[0] - expected).abs() < 1.0E-12);
    }

    #[test]
    fn unsolved() {
        let solution = Solution::new(Epoch::from_time_of_week(2190, 0, TimeScale::GPST));
        let geometry = solution.geometry();
        assert!(geometry.azimuth.is_empty());
        assert!(geometry.other_state.is_empty());
    }
}

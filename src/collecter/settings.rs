use nalgebra::Vector3;

use crate::{
    collecter::window::TimeSpec,
    output::{selection::Selection, MeasurementColumn},
    solver::SolverOptions,
};

/// [Settings] frozen prior processing the first epoch
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Projected systems & vehicles
    pub selection: Selection,

    /// Solver configuration
    pub solver: SolverOptions,

    /// Measurement columns, repeated for each vehicle
    pub measurements: Vec<MeasurementColumn>,

    /// ECEF base station, for relative positioning
    pub base_station: Option<Vector3<f64>>,

    /// Epochs prior this instant are dropped
    pub start: Option<TimeSpec>,

    /// Epochs past this instant are dropped
    pub end: Option<TimeSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            solver: SolverOptions::default(),
            measurements: MeasurementColumn::defaults(),
            base_station: None,
            start: None,
            end: None,
        }
    }
}

pub mod codes;
pub mod epoch;

pub use codes::ObservationTypes;
pub use epoch::{MeasurementEpoch, Observable};

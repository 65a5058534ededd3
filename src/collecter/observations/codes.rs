//! RINEX observation codes to [Observable] mapping
use std::collections::BTreeMap;

use gnss::prelude::{Constellation, SV};
use log::trace;

use rinex::{
    observation::HeaderFields as ObsHeader,
    prelude::obs::{EpochFlag, ObsKey, Observations},
};

use super::epoch::{MeasurementEpoch, Observable};

use crate::numbering::normalize;

/// Identifies the L1 (or equivalent) observation codes we collect.
/// Other codes are ignored.
pub fn observable(code: &str) -> Option<Observable> {
    match code {
        "C1" | "C1C" => Some(Observable::Pseudorange),
        "L1" | "L1C" => Some(Observable::CarrierPhase),
        "D1" | "D1C" => Some(Observable::Doppler),
        "S1" | "S1C" => Some(Observable::SignalStrength),
        _ => None,
    }
}

/// Legacy QZSS numbering may be found in older files
fn to_sv(sv: SV) -> Option<SV> {
    match (sv.constellation, sv.prn) {
        (Constellation::QZSS, 193..=202) => normalize(sv.prn, None).ok(),
        _ => Some(sv),
    }
}

/// Collected codes, per constellation
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObservationTypes {
    codes: BTreeMap<Constellation, BTreeMap<String, Observable>>,
}

impl ObservationTypes {
    pub fn new(header: &ObsHeader) -> Self {
        let codes = header
            .codes
            .iter()
            .map(|(constellation, codes)| {
                let map = codes
                    .iter()
                    .filter_map(|code| {
                        let code = code.to_string();
                        observable(&code).map(|obs| (code, obs))
                    })
                    .collect();
                (*constellation, map)
            })
            .collect();

        Self { codes }
    }

    /// Codes of given [Constellation], falling back to the GPS declaration.
    pub fn codes(&self, constellation: Constellation) -> Option<&BTreeMap<String, Observable>> {
        self.codes
            .get(&constellation)
            .or_else(|| self.codes.get(&Constellation::GPS))
    }

    /// Converts one epoch. Epochs flagged as events carry no measurements
    /// and come out empty.
    pub fn to_measurement(&self, key: &ObsKey, observations: &Observations) -> MeasurementEpoch {
        let mut meas = MeasurementEpoch::new(key.epoch);

        if !matches!(key.flag, EpochFlag::Ok | EpochFlag::PowerFailure) {
            trace!("{} - skipped epoch ({:?})", key.epoch, key.flag);
            return meas;
        }

        for signal in observations.signals.iter() {
            let Some(sv) = to_sv(signal.sv) else {
                trace!("{} - unsupported satellite {}", key.epoch, signal.sv);
                continue;
            };

            let observable = self
                .codes(signal.sv.constellation)
                .and_then(|codes| codes.get(&signal.observable.to_string()));

            if let Some(observable) = observable {
                meas.add(sv, *observable, signal.value);
            }
        }

        meas
    }
}

use std::collections::BTreeMap;

use gnss::prelude::{Constellation, SV};
use hifitime::Epoch;

use crate::constants::{
    B1I_FREQUENCY_HZ, G1_FREQUENCY_HZ, L1_FREQUENCY_HZ, SPEED_OF_LIGHT_M_S,
};

/// Measurement kinds, all tied to the L1 (or equivalent) signal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Observable {
    /// Pseudo range [m]
    Pseudorange,
    /// Carrier phase [cycles]
    CarrierPhase,
    /// Doppler shift [Hz]
    Doppler,
    /// Carrier frequency [Hz]
    CarrierFrequency,
    /// C/N0 [dB.Hz]
    SignalStrength,
    /// Lock duration [s], negative when lock was lost
    LockDuration,
    /// Pseudo range standard deviation [m]
    PseudorangeSigma,
    /// Doppler standard deviation [Hz]
    DopplerSigma,
    /// Carrier phase standard deviation [cycles]
    CarrierPhaseSigma,
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pseudorange => write!(f, "L1_PSEUDORANGE"),
            Self::CarrierPhase => write!(f, "L1_CARRIER_PHASE"),
            Self::Doppler => write!(f, "L1_DOPPLER"),
            Self::CarrierFrequency => write!(f, "L1_FREQUENCY"),
            Self::SignalStrength => write!(f, "L1_SIGNAL_STRENGTH_dBHz"),
            Self::LockDuration => write!(f, "L1_LOCK_SEC"),
            Self::PseudorangeSigma => write!(f, "L1_PSEUDORANGE_SIGMA"),
            Self::DopplerSigma => write!(f, "L1_DOPPLER_SIGMA"),
            Self::CarrierPhaseSigma => write!(f, "L1_CARRIER_PHASE_SIGMA"),
        }
    }
}

/// Default carrier frequency of each [Constellation]
pub fn carrier_frequency(constellation: Constellation) -> f64 {
    match constellation {
        Constellation::Glonass => G1_FREQUENCY_HZ,
        Constellation::BeiDou => B1I_FREQUENCY_HZ,
        _ => L1_FREQUENCY_HZ,
    }
}

/// All measurements sampled at the same instant.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementEpoch {
    /// Receiver time (GPST)
    pub t: Epoch,
    values: BTreeMap<(SV, Observable), f64>,
}

impl MeasurementEpoch {
    pub fn new(t: Epoch) -> Self {
        Self {
            t,
            values: Default::default(),
        }
    }

    /// Stores a new value, replacing any previous one.
    pub fn add(&mut self, sv: SV, observable: Observable, value: f64) {
        self.values.insert((sv, observable), value);
    }

    pub fn get(&self, sv: SV, observable: Observable) -> Option<f64> {
        self.values.get(&(sv, observable)).copied()
    }

    /// True when at least one value of this vehicle is stored
    pub fn contains(&self, sv: SV) -> bool {
        self.values.keys().any(|(stored, _)| *stored == sv)
    }

    /// Iterates all vehicles, in order, each reported once.
    pub fn satellites(&self) -> impl Iterator<Item = SV> + '_ {
        let mut last = None;
        self.values.keys().filter_map(move |(sv, _)| {
            if last == Some(*sv) {
                None
            } else {
                last = Some(*sv);
                Some(*sv)
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (SV, Observable, f64)> + '_ {
        self.values.iter().map(|((sv, obs), value)| (*sv, *obs, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Pseudo range rate [m/s] derived from the doppler shift.
    /// The carrier defaults to the [Constellation] nominal frequency
    /// when not measured.
    pub fn pseudorange_rate(&self, sv: SV) -> Option<f64> {
        let doppler = self.get(sv, Observable::Doppler)?;
        let frequency = self
            .get(sv, Observable::CarrierFrequency)
            .unwrap_or_else(|| carrier_frequency(sv.constellation));
        Some(doppler * SPEED_OF_LIGHT_M_S / frequency)
    }
}

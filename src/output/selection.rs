//! Output selection and `--with` / `--without` directives
use gnss::prelude::{Constellation, SV};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::{
    error::Error,
    numbering::{legacy_prn, normalize, system_from_name, system_name, system_range},
    solver::SolverOptions,
};

lazy_static! {
    /// `SYS` or `SYS:N`
    static ref SYSTEM_INDEX: Regex = Regex::new(r"^([a-zA-Z]+)(?::(-?\d+))?$").unwrap();
    /// legacy PRN
    static ref LEGACY: Regex = Regex::new(r"^-?\d+$").unwrap();
}

/// Systems and vehicles projected into the output records.
/// Frozen once the output registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index set of each system (one visibility bitmask each)
    pub systems: Vec<(Constellation, Vec<u8>)>,
    /// Vehicles with dedicated columns, with optional label
    pub satellites: Vec<(SV, Option<String>)>,
}

impl Default for Selection {
    fn default() -> Self {
        let gps = system_range(Constellation::GPS).collect::<Vec<_>>();
        Self {
            satellites: gps
                .iter()
                .map(|prn| (SV::new(Constellation::GPS, *prn), None))
                .collect(),
            systems: vec![(Constellation::GPS, gps)],
        }
    }
}

/// Column label of a vehicle: legacy PRN when it exists
pub fn default_label(sv: SV) -> String {
    match legacy_prn(sv) {
        Some(prn) => prn.to_string(),
        None => sv.to_string(),
    }
}

impl Selection {
    /// Selected vehicles, with their column label
    pub fn labeled(&self) -> impl Iterator<Item = (SV, String)> + '_ {
        self.satellites.iter().map(|(sv, label)| {
            let label = label.clone().unwrap_or_else(|| default_label(*sv));
            (*sv, label)
        })
    }

    fn update(&mut self, mode: Mode, targets: &[SV], label: Option<&str>) {
        let mut systems = targets.iter().map(|sv| sv.constellation).collect::<Vec<_>>();
        systems.dedup();

        for constellation in systems {
            let indices = match self.systems.iter().position(|(c, _)| *c == constellation) {
                Some(pos) => &mut self.systems[pos].1,
                None => {
                    self.systems.push((constellation, Vec::new()));
                    let last = self.systems.len() - 1;
                    &mut self.systems[last].1
                },
            };

            indices.retain(|prn| {
                !targets
                    .iter()
                    .any(|sv| sv.constellation == constellation && sv.prn == *prn)
            });

            if mode == Mode::Include {
                indices.extend(
                    targets
                        .iter()
                        .filter(|sv| sv.constellation == constellation)
                        .map(|sv| sv.prn),
                );
                indices.sort();
                indices.dedup();
            }
        }

        self.satellites.retain(|(sv, _)| !targets.contains(sv));

        if mode == Mode::Include {
            self.satellites.extend(
                targets
                    .iter()
                    .map(|sv| (*sv, label.map(|label| label.to_string()))),
            );
            self.satellites.sort_by_key(|(sv, _)| *sv);
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Include,
    Exclude,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Include => write!(f, "Include"),
            Self::Exclude => write!(f, "Exclude"),
        }
    }
}

/// Satellite include / exclude directive.
///
/// Grammar: `N`, `-N`, `SYS`, `SYS:N` or `SYS:-N`, optionally followed
/// by `=label`. Bare numbers are legacy PRNs. A negative index swaps the
/// directive mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub mode: Mode,
    pub system: Option<Constellation>,
    pub index: Option<u8>,
    pub label: Option<String>,
    spec: String,
}

impl Directive {
    /// Parses a `--with` (`with` = true) or `--without` directive
    pub fn parse(spec: &str, with: bool) -> Result<Self, Error> {
        let unknown = || Error::UnknownColumnSpec(spec.to_string());

        let (body, label) = match spec.trim().split_once('=') {
            Some((body, label)) => (body.trim(), Some(label.trim().to_string())),
            None => (spec.trim(), None),
        };

        let (system, index) = if let Some(caps) = SYSTEM_INDEX.captures(body) {
            let system = system_from_name(&caps[1]).ok_or_else(unknown)?;
            let index = caps
                .get(2)
                .map(|index| index.as_str().parse::<i32>())
                .transpose()
                .map_err(|_| unknown())?;
            (Some(system), index)
        } else if LEGACY.is_match(body) {
            (None, Some(body.parse::<i32>().map_err(|_| unknown())?))
        } else {
            return Err(unknown());
        };

        let negative = index.is_some_and(|index| index < 0);
        let mode = match (with, negative) {
            (true, false) | (false, true) => Mode::Include,
            _ => Mode::Exclude,
        };

        let index = index
            .map(|index| u8::try_from(index.abs()))
            .transpose()
            .map_err(|_| unknown())?;

        Ok(Self {
            mode,
            system,
            index,
            label,
            spec: spec.to_string(),
        })
    }

    /// Vehicles this directive applies to
    pub fn targets(&self) -> Result<Vec<SV>, Error> {
        let unknown = || Error::UnknownColumnSpec(self.spec.clone());

        match (self.system, self.index) {
            (None, Some(prn)) => Ok(vec![normalize(prn, None).map_err(|_| unknown())?]),
            (Some(constellation), None) => Ok(system_range(constellation)
                .map(|prn| SV::new(constellation, prn))
                .collect()),
            (Some(constellation), Some(index)) => {
                if system_range(constellation).contains(&index) {
                    return Ok(vec![SV::new(constellation, index)]);
                }
                // legacy numbering is tolerated, ex. QZSS:193 or SBAS:120
                match normalize(index, None) {
                    Ok(sv) if sv.constellation == constellation => Ok(vec![sv]),
                    _ => Err(unknown()),
                }
            },
            (None, None) => Err(unknown()),
        }
    }

    /// Applies this directive to both the solver options and the output selection
    pub fn apply(&self, selection: &mut Selection, opts: &mut SolverOptions) -> Result<(), Error> {
        let targets = self.targets()?;

        if self.label.is_some() && targets.len() > 1 {
            return Err(Error::UnknownColumnSpec(self.spec.clone()));
        }

        for sv in targets.iter() {
            match self.mode {
                Mode::Include => opts.include(*sv),
                Mode::Exclude => opts.exclude(*sv),
            }
        }

        selection.update(self.mode, &targets, self.label.as_deref());

        let system = self.system.map(system_name);
        match (system, self.index) {
            (Some(system), Some(index)) => info!("{} satellite: {}:{}", self.mode, system, index),
            (Some(system), None) => info!("{} satellite: {}", self.mode, system),
            (None, Some(index)) => info!("{} satellite: {}", self.mode, index),
            (None, None) => {},
        }

        Ok(())
    }
}

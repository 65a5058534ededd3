//! Debug record projection.
//!
//! The [Registry] is an ordered list of column groups, built once from
//! the [Selection] and the measurement columns. Each group has a fixed
//! set of labels and extracts as many values from a solved epoch.
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use itertools::Itertools;
use nalgebra::Vector3;

use crate::{
    collecter::observations::{MeasurementEpoch, Observable},
    coords::relative_enu,
    error::Error,
    numbering::{legacy_prn, system_name},
    solver::Solution,
};

pub mod bitmask;
pub mod selection;

pub use selection::{Directive, Selection};

/// Output scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(value) => write!(f, "{}", value),
            Self::Real(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1.0E15 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            },
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Real)
    }
}

impl From<SV> for Value {
    /// Legacy PRN when it exists
    fn from(sv: SV) -> Self {
        match legacy_prn(sv) {
            Some(prn) => Self::Int(prn as i64),
            None => Self::Text(sv.to_string()),
        }
    }
}

/// Measurement column, repeated for each selected vehicle
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeasurementColumn {
    Raw(Observable),
    /// Pseudo range rate, derived from the doppler shift
    RangeRate,
}

impl std::fmt::Display for MeasurementColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw(observable) => write!(f, "{}", observable),
            Self::RangeRate => write!(f, "L1_RANGE_RATE"),
        }
    }
}

impl FromStr for MeasurementColumn {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_uppercase();
        let name = name.strip_prefix("L1_").unwrap_or(&name);

        if name == "RANGE_RATE" {
            return Ok(Self::RangeRate);
        }

        [
            Observable::Pseudorange,
            Observable::CarrierPhase,
            Observable::Doppler,
            Observable::CarrierFrequency,
            Observable::SignalStrength,
            Observable::LockDuration,
            Observable::PseudorangeSigma,
            Observable::DopplerSigma,
            Observable::CarrierPhaseSigma,
        ]
        .into_iter()
        .find(|observable| {
            let label = observable.to_string().to_uppercase();
            let label = label.strip_prefix("L1_").unwrap_or(&label);
            label == name || label.strip_suffix("_DBHZ") == Some(name)
        })
        .map(Self::Raw)
        .ok_or(Error::UnknownObservationType(s.to_string()))
    }
}

impl MeasurementColumn {
    /// Pseudo range and range rate
    pub fn defaults() -> Vec<Self> {
        vec![Self::Raw(Observable::Pseudorange), Self::RangeRate]
    }

    fn value(&self, meas: &MeasurementEpoch, sv: SV) -> Value {
        match self {
            Self::Raw(observable) => meas.get(sv, *observable).into(),
            Self::RangeRate => meas.pseudorange_rate(sv).into(),
        }
    }
}

/// Everything a column may read from
pub struct Context<'a> {
    pub solution: &'a Solution,
    pub measurement: &'a MeasurementEpoch,
    /// ECEF base station
    pub base_station: Option<&'a Vector3<f64>>,
}

type Extractor = Box<dyn Fn(&Context<'_>) -> Vec<Value>>;

pub struct ColumnGroup {
    pub labels: Vec<String>,
    extractor: Extractor,
}

impl ColumnGroup {
    fn new<L: ToString>(
        labels: impl IntoIterator<Item = L>,
        extractor: impl Fn(&Context<'_>) -> Vec<Value> + 'static,
    ) -> Self {
        Self {
            labels: labels.into_iter().map(|label| label.to_string()).collect(),
            extractor: Box::new(extractor),
        }
    }

    /// Extracted values, always as many as labels
    pub fn extract(&self, ctx: &Context<'_>) -> Vec<Value> {
        let mut values = (self.extractor)(ctx);
        values.resize(self.labels.len(), Value::Null);
        values
    }
}

fn nulls(n: usize) -> Vec<Value> {
    vec![Value::Null; n]
}

fn receiver_time() -> ColumnGroup {
    ColumnGroup::new(
        [
            "week",
            "itow_rcv",
            "year",
            "month",
            "mday",
            "hour",
            "min",
            "sec_rcv_UTC",
        ],
        |ctx| {
            let t = ctx.solution.t;
            let (week, nanos) = t.to_time_of_week();
            let (y, m, d, hh, mm, ss, ns) = t.to_gregorian_utc();
            vec![
                Value::Int(week as i64),
                Value::Real(nanos as f64 * 1.0E-9),
                Value::Int(y as i64),
                Value::Int(m as i64),
                Value::Int(d as i64),
                Value::Int(hh as i64),
                Value::Int(mm as i64),
                Value::Real(ss as f64 + ns as f64 * 1.0E-9),
            ]
        },
    )
}

fn position() -> ColumnGroup {
    ColumnGroup::new(
        [
            "receiver_clock_error_meter",
            "longitude",
            "latitude",
            "height",
            "rel_E",
            "rel_N",
            "rel_U",
        ],
        |ctx| {
            let solution = ctx.solution;
            if !solution.position_solved {
                return nulls(7);
            }

            let llh = solution.llh();
            let mut values = vec![
                Value::Real(solution.receiver_error),
                Value::Real(llh[1].to_degrees()),
                Value::Real(llh[0].to_degrees()),
                Value::Real(llh[2]),
            ];

            match ctx.base_station {
                Some(base) => {
                    let enu = relative_enu(&solution.position_ecef, base);
                    values.extend(enu.iter().map(|v| Value::Real(*v)));
                },
                None => values.extend(nulls(3)),
            }
            values
        },
    )
}

fn dop() -> ColumnGroup {
    ColumnGroup::new(["gdop", "pdop", "hdop", "vdop", "tdop"], |ctx| {
        let solution = ctx.solution;
        if !solution.position_solved {
            return nulls(5);
        }
        let dop = solution.dop;
        [dop.gdop, dop.pdop, dop.hdop, dop.vdop, dop.tdop]
            .into_iter()
            .map(Value::Real)
            .collect()
    })
}

fn velocity() -> ColumnGroup {
    ColumnGroup::new(
        ["v_north", "v_east", "v_down", "receiver_clock_error_dot_ms"],
        |ctx| {
            let solution = ctx.solution;
            if !solution.velocity_solved {
                return nulls(4);
            }
            let mut values = solution
                .velocity_ned
                .iter()
                .map(|v| Value::Real(*v))
                .collect::<Vec<_>>();
            values.push(Value::Real(solution.receiver_error_rate));
            values
        },
    )
}

fn used_satellites() -> ColumnGroup {
    ColumnGroup::new(["used_satellites"], |ctx| {
        vec![Value::Int(ctx.solution.used_satellites.len() as i64)]
    })
}

fn visibility(constellation: Constellation, indices: Vec<u8>) -> ColumnGroup {
    let label = format!(
        "{}_PRN({})",
        system_name(constellation),
        bitmask::label(&indices)
    );

    ColumnGroup::new([label], move |ctx| {
        let used = ctx
            .solution
            .used_satellites
            .iter()
            .filter(|sv| sv.constellation == constellation)
            .map(|sv| sv.prn);
        vec![Value::Text(bitmask::encode(&indices, used))]
    })
}

fn satellites(selection: &Selection) -> ColumnGroup {
    let labeled = selection.labeled().collect::<Vec<_>>();
    let labels = labeled
        .iter()
        .flat_map(|(_, label)| {
            [
                "range_residual",
                "weight",
                "azimuth",
                "elevation",
                "slopeH",
                "slopeV",
            ]
            .map(|field| format!("{}({})", field, label))
        })
        .collect::<Vec<_>>();

    let svs = labeled.into_iter().map(|(sv, _)| sv).collect::<Vec<_>>();

    ColumnGroup::new(labels, move |ctx| {
        let solution = ctx.solution;
        if !solution.position_solved {
            return nulls(6 * svs.len());
        }

        let geometry = solution.geometry();

        svs.iter()
            .flat_map(|sv| {
                if solution.satellite_index(*sv).is_none() {
                    return nulls(6);
                }
                vec![
                    solution.range_residual(*sv).into(),
                    solution.weight(*sv).into(),
                    geometry.azimuth.get(sv).map(|az| az.to_degrees()).into(),
                    geometry.elevation.get(sv).map(|el| el.to_degrees()).into(),
                    geometry.slope_h.get(sv).copied().into(),
                    geometry.slope_v.get(sv).copied().into(),
                ]
            })
            .collect()
    })
}

fn fault_detection() -> ColumnGroup {
    ColumnGroup::new(
        [
            "wssr",
            "wssr_sf",
            "weight_max",
            "slopeH_max",
            "slopeH_max_PRN",
            "slopeH_max_elevation",
            "slopeV_max",
            "slopeV_max_PRN",
            "slopeV_max_elevation",
        ],
        |ctx| {
            let Some(fd) = ctx.solution.fd else {
                return nulls(9);
            };
            let elevation = |sv: SV| -> Value {
                ctx.solution
                    .geometry()
                    .elevation
                    .get(&sv)
                    .map(|el| el.to_degrees())
                    .into()
            };
            vec![
                Value::Real(fd.wssr),
                Value::Real(fd.wssr_sf),
                Value::Real(fd.weight_max),
                Value::Real(fd.slope_h_max),
                fd.slope_h_max_sv.into(),
                elevation(fd.slope_h_max_sv),
                Value::Real(fd.slope_v_max),
                fd.slope_v_max_sv.into(),
                elevation(fd.slope_v_max_sv),
            ]
        },
    )
}

fn fault_exclusion() -> ColumnGroup {
    ColumnGroup::new(
        [
            "wssr_FDE_min",
            "wssr_FDE_min_PRN",
            "wssr_FDE_2nd",
            "wssr_FDE_2nd_PRN",
        ],
        |ctx| {
            [ctx.solution.fde_min, ctx.solution.fde_2nd]
                .into_iter()
                .flat_map(|fde| match fde {
                    Some(fde) => vec![Value::Real(fde.wssr), fde.excluded.into()],
                    None => nulls(2),
                })
                .collect()
        },
    )
}

fn measurements(selection: &Selection, columns: &[MeasurementColumn]) -> ColumnGroup {
    let labeled = selection.labeled().collect::<Vec<_>>();
    let labels = labeled
        .iter()
        .flat_map(|(_, label)| {
            columns
                .iter()
                .map(move |column| format!("{}({})", column, label))
        })
        .collect::<Vec<_>>();

    let svs = labeled.into_iter().map(|(sv, _)| sv).collect::<Vec<_>>();
    let columns = columns.to_vec();

    ColumnGroup::new(labels, move |ctx| {
        svs.iter()
            .flat_map(|sv| {
                columns
                    .iter()
                    .map(|column| column.value(ctx.measurement, *sv))
            })
            .collect()
    })
}

/// Ordered column groups, frozen at build time
pub struct Registry {
    groups: Vec<ColumnGroup>,
}

impl Registry {
    pub fn new(selection: &Selection, columns: &[MeasurementColumn]) -> Self {
        let mut groups = vec![
            receiver_time(),
            position(),
            dop(),
            velocity(),
            used_satellites(),
        ];

        groups.extend(
            selection
                .systems
                .iter()
                .filter(|(_, indices)| !indices.is_empty())
                .map(|(constellation, indices)| visibility(*constellation, indices.clone())),
        );

        groups.push(satellites(selection));
        groups.push(fault_detection());
        groups.push(fault_exclusion());
        groups.push(measurements(selection, columns));

        Self { groups }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.groups.iter().map(|group| group.labels.len()).sum()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups
            .iter()
            .flat_map(|group| group.labels.iter().map(|label| label.as_str()))
    }

    /// Comma separated column labels
    pub fn header(&self) -> String {
        self.labels().join(",")
    }

    pub fn values(&self, ctx: &Context<'_>) -> Vec<Value> {
        self.groups
            .iter()
            .flat_map(|group| group.extract(ctx))
            .collect()
    }

    /// Comma separated values, empty when null
    pub fn row(&self, ctx: &Context<'_>) -> String {
        self.values(ctx).iter().join(",")
    }
}

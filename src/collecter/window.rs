//! Start / end time filtering of measurement epochs
use std::str::FromStr;

use hifitime::{Epoch, TimeScale};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{error::Error, ublox::gpst};

lazy_static! {
    /// `[week:]seconds`
    static ref WEEK_SECONDS: Regex = Regex::new(r"^(?:(\d+):)??(\d+(?:\.\d*)?)$").unwrap();
}

/// Time bound
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimeSpec {
    /// Seconds in the week of the first processed epoch
    Relative(f64),
    /// GPST instant
    Absolute(Epoch),
}

impl FromStr for TimeSpec {
    type Err = Error;

    /// Parses `[week:]seconds` or a calendar date time (UTC unless
    /// specified otherwise)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(caps) = WEEK_SECONDS.captures(s) {
            let seconds = caps[2]
                .parse::<f64>()
                .map_err(|_| Error::UnknownTimeFormat(s.to_string()))?;

            return match caps.get(1) {
                Some(week) => {
                    let week = week
                        .as_str()
                        .parse::<u32>()
                        .map_err(|_| Error::UnknownTimeFormat(s.to_string()))?;
                    Ok(Self::Absolute(gpst(week, seconds)))
                },
                None => Ok(Self::Relative(seconds)),
            };
        }

        let t = Epoch::from_str(s).map_err(|_| Error::UnknownTimeFormat(s.to_string()))?;
        Ok(Self::Absolute(t.to_time_scale(TimeScale::GPST)))
    }
}

impl std::fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relative(seconds) => write!(f, "(current) week {}", seconds),
            Self::Absolute(t) => {
                let (week, nanos) = t.to_time_of_week();
                write!(
                    f,
                    "{} week {} (a.k.a {})",
                    week,
                    nanos as f64 * 1.0E-9,
                    t.to_time_scale(TimeScale::UTC)
                )
            },
        }
    }
}

impl TimeSpec {
    fn resolve(&self, week: u32) -> Epoch {
        match self {
            Self::Relative(seconds) => gpst(week, *seconds),
            Self::Absolute(t) => *t,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Stage {
    /// Relative bounds are yet to be resolved
    Resolve,
    /// Waiting for the start bound
    Start,
    /// Start bound passed
    End,
}

/// Epoch filter. Relative bounds are anchored to the week of the first
/// epoch presented. The start bound is no longer checked once an epoch
/// passed it.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    start: Option<TimeSpec>,
    end: Option<TimeSpec>,
    bounds: (Option<Epoch>, Option<Epoch>),
    stage: Stage,
}

impl TimeWindow {
    pub fn new(start: Option<TimeSpec>, end: Option<TimeSpec>) -> Self {
        Self {
            start,
            end,
            bounds: (None, None),
            stage: Stage::Resolve,
        }
    }

    /// Returns true if this epoch should be processed
    pub fn accept(&mut self, t: Epoch) -> bool {
        if self.stage == Stage::Resolve {
            let (week, _) = t.to_time_of_week();
            self.bounds = (
                self.start.map(|spec| spec.resolve(week)),
                self.end.map(|spec| spec.resolve(week)),
            );
            debug!("time window: {:?}", self.bounds);
            self.stage = Stage::Start;
        }

        if self.stage == Stage::Start {
            if self.bounds.0.is_some_and(|start| start > t) {
                return false;
            }
            self.stage = Stage::End;
        }

        !self.bounds.1.is_some_and(|end| end < t)
    }
}

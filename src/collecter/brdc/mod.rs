//! Broadcast ephemeris collection: GPS LNAV subframes are latched
//! per vehicle until a consistent ephemeris set is gathered.
use std::collections::BTreeMap;

use gnss::prelude::{Constellation, SV};
use hifitime::Epoch;
use log::{debug, trace};

use crate::{error::Error, solver::NavigationStore, ublox::Subframe};

pub mod ephemeris;
pub mod subframe;

pub use ephemeris::{GpsEphemeris, IonoUtcParameters};

use subframe::{LnavSubframe, Subframe1, Subframe2, Subframe3};

/// GPS week counter rollover
const WEEK_ROLLOVER: u32 = 1024;

/// Per vehicle accumulation state
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Empty,
    Accumulating,
    /// Subframes 1, 2 & 3 latched with matching issues of data
    Ready,
}

#[derive(Debug, Default, Clone)]
struct Accumulator {
    sf1: Option<Subframe1>,
    sf2: Option<Subframe2>,
    sf3: Option<Subframe3>,
}

impl Accumulator {
    fn state(&self) -> State {
        match (&self.sf1, &self.sf2, &self.sf3) {
            (None, None, None) => State::Empty,
            (Some(sf1), Some(sf2), Some(sf3))
                if sf2.iode == sf3.iode && (sf1.iodc & 0xff) as u8 == sf2.iode =>
            {
                State::Ready
            },
            _ => State::Accumulating,
        }
    }

    /// Latches a new subframe, replacing the previous one of same number.
    /// Subframes from different issues of data never make a [State::Ready] set.
    fn latch(&mut self, subframe: LnavSubframe) {
        match subframe {
            LnavSubframe::Clock(sf1) => self.sf1 = Some(sf1),
            LnavSubframe::Orbit1(sf2) => self.sf2 = Some(sf2),
            LnavSubframe::Orbit2(sf3) => self.sf3 = Some(sf3),
            LnavSubframe::Special { .. } => {},
        }
    }

    /// Builds the [GpsEphemeris], reconciling its week number with the
    /// current full week. Buffers are emptied on success.
    fn release(&mut self, current_week: u32) -> Option<GpsEphemeris> {
        if self.state() != State::Ready {
            return None;
        }

        let (sf1, sf2, sf3) = (self.sf1.take()?, self.sf2.take()?, self.sf3.take()?);

        let week = (current_week / WEEK_ROLLOVER) * WEEK_ROLLOVER
            + (sf1.week as u32 % WEEK_ROLLOVER);

        Some(GpsEphemeris::new(&sf1, &sf2, &sf3, week))
    }
}

/// Ephemeris reassembler
#[derive(Debug, Default)]
pub struct Reassembler {
    buffers: BTreeMap<SV, Accumulator>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, sv: SV) -> State {
        self.buffers
            .get(&sv)
            .map(|acc| acc.state())
            .unwrap_or_default()
    }

    /// Latches a new navigation [Subframe].
    /// Ionospheric & UTC parameters are forwarded right away.
    /// A completed ephemeris is committed to the store when the
    /// current time `t` is known, otherwise it waits in ready state.
    pub fn latch<N: NavigationStore + ?Sized>(
        &mut self,
        subframe: &Subframe,
        t: Option<Epoch>,
        store: &mut N,
    ) -> Result<(), Error> {
        let sv = subframe.sv;

        if sv.constellation != Constellation::GPS {
            trace!("{} - subframe not supported", sv);
            return Ok(());
        }

        let decoded = LnavSubframe::decode(&subframe.words)
            .map_err(|reason| Error::InvalidSubframe { sv, reason })?;

        trace!(
            "{} - subframe #{} (iod={})",
            sv,
            decoded.subframe_id(),
            decoded.issue_of_data()
        );

        if decoded.issue_of_data() < 0 {
            if let LnavSubframe::Special {
                iono_utc: Some(params),
                ..
            } = decoded
            {
                debug!("{} - iono/utc parameters update", sv);
                store.update_iono_utc(params);
            }
            return Ok(());
        }

        let acc = self.buffers.entry(sv).or_default();
        acc.latch(decoded);

        if let Some(t) = t {
            Self::commit(sv, acc, t, store);
        }

        Ok(())
    }

    /// Commits all ephemerides in ready state, returns how many were released.
    pub fn commit_ready<N: NavigationStore + ?Sized>(&mut self, t: Epoch, store: &mut N) -> usize {
        let mut committed = 0;
        for (sv, acc) in self.buffers.iter_mut() {
            if Self::commit(*sv, acc, t, store) {
                committed += 1;
            }
        }
        committed
    }

    fn commit<N: NavigationStore + ?Sized>(
        sv: SV,
        acc: &mut Accumulator,
        t: Epoch,
        store: &mut N,
    ) -> bool {
        let (week, _) = t.to_time_of_week();
        match acc.release(week) {
            Some(eph) => {
                debug!("{} - {} new ephemeris (iodc={})", t, sv, eph.iodc);
                store.register_ephemeris(sv, eph);
                true
            },
            None => false,
        }
    }
}

use std::collections::BTreeMap;

use hifitime::Epoch;
use log::{debug, info, warn};
use ublox_lib::{PacketRef, ParserError};

pub mod brdc;
pub mod fd;
pub mod observations;
pub mod settings;
pub mod window;

use brdc::Reassembler;
use observations::MeasurementEpoch;

use crate::{
    error::Error,
    solver::NavigationStore,
    ublox::Message,
};

/// Progress is reported every so many packets
const PROGRESS_PERIOD: usize = 1000;

/// Packet counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Framed packets, per (class, id)
    pub packets: BTreeMap<(u8, u8), usize>,
    pub malformed: usize,
    pub unknown: usize,
    pub total: usize,
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} packets", self.total)?;
        for ((class, id), count) in self.packets.iter() {
            write!(f, ", {:02x}-{:02x}: {}", class, id, count)?;
        }
        write!(f, " (malformed: {}, unknown: {})", self.malformed, self.unknown)
    }
}

/// Turns UBX packets into [MeasurementEpoch]s, feeding the navigation
/// subframes to the [Reassembler] on the side.
/// One [Collecter] serves the whole run: partially gathered
/// ephemerides survive from one stream to the next.
#[derive(Debug, Default)]
pub struct Collecter {
    reassembler: Reassembler,
    /// Latest receiver time
    t_meas: Option<Epoch>,
    /// Current stream counters
    pub stats: Statistics,
}

impl Collecter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares a new input stream: the time reference
    /// and the counters are reset, the [Reassembler] is not.
    pub fn new_stream(&mut self) {
        self.t_meas = None;
        self.stats = Statistics::default();
    }

    /// Latest receiver time
    pub fn time(&self) -> Option<Epoch> {
        self.t_meas
    }

    /// Consumes one framing result, returns new measurements if any.
    pub fn consume<N: NavigationStore + ?Sized>(
        &mut self,
        packet: Result<PacketRef, ParserError>,
        store: &mut N,
    ) -> Option<MeasurementEpoch> {
        self.stats.total += 1;
        if self.stats.total % PROGRESS_PERIOD == 0 {
            info!("{} packets processed", self.stats.total);
        }

        let packet = match packet {
            Ok(packet) => packet,
            Err(e) => {
                self.stats.malformed += 1;
                warn!("{}", Error::from(e));
                return None;
            },
        };

        *self
            .stats
            .packets
            .entry(packet.class_and_msg_id())
            .or_default() += 1;

        match Message::decode(&packet) {
            Ok(Message::Measurement(meas)) => {
                self.t_meas = Some(meas.t);
                let committed = self.reassembler.commit_ready(meas.t, store);
                if committed > 0 {
                    debug!("{} - {} pending ephemeris committed", meas.t, committed);
                }
                Some(meas)
            },
            Ok(Message::Subframe(subframe)) => {
                if let Err(e) = self.reassembler.latch(&subframe, self.t_meas, store) {
                    debug!("{}", e);
                }
                None
            },
            Err(Error::UnknownMessage { .. }) => {
                self.stats.unknown += 1;
                None
            },
            Err(e) => {
                self.stats.malformed += 1;
                debug!("{}", e);
                None
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collecter::brdc::{
        subframe::test::{subframe1, subframe2, subframe3},
        GpsEphemeris, IonoUtcParameters, State,
    };
    use crate::ublox::{
        gpst,
        test::{frame, rawx, rawx_block, sfrbx},
        Framer, RXM_RAW, RXM_RAWX,
    };
    use gnss::prelude::{Constellation, SV};

    #[derive(Default)]
    struct Store {
        ephemerides: Vec<(SV, GpsEphemeris)>,
    }

    impl NavigationStore for Store {
        fn register_ephemeris(&mut self, sv: SV, eph: GpsEphemeris) {
            self.ephemerides.push((sv, eph));
        }
        fn update_iono_utc(&mut self, _: IonoUtcParameters) {}
    }

    /// Feeds a byte stream, returns the measurements
    fn feed(collecter: &mut Collecter, store: &mut Store, bytes: &[u8]) -> Vec<MeasurementEpoch> {
        let mut epochs = Vec::new();
        Framer::new(bytes)
            .consume_all(|packet| {
                epochs.extend(collecter.consume(packet, store));
                Ok(())
            })
            .unwrap();
        epochs
    }

    #[test]
    fn statistics() {
        let mut collecter = Collecter::new();
        let mut store = Store::default();

        let mut bytes = rawx(2190, 100.0, &[rawx_block(0, 5, 2.0E7, 0.0, 0.0, 0x01)]);
        bytes.extend(frame(0x01, 0x77, &[0; 12]));
        // legacy raw measurements, length mismatch
        bytes.extend(frame(RXM_RAW.0, RXM_RAW.1, &[0; 3]));

        let mut corrupt = frame(0x01, 0x77, &[0; 12]);
        let last = corrupt.len() - 1;
        corrupt[last] ^= 0xff;
        bytes.extend(corrupt);

        let epochs = feed(&mut collecter, &mut store, &bytes);
        assert_eq!(epochs.len(), 1);
        assert_eq!(epochs[0].t, gpst(2190, 100.0));
        assert_eq!(collecter.time(), Some(gpst(2190, 100.0)));

        assert_eq!(collecter.stats.total, 4);
        assert_eq!(collecter.stats.unknown, 1);
        assert_eq!(collecter.stats.malformed, 2);
        assert_eq!(collecter.stats.packets[&RXM_RAWX], 1);
        assert_eq!(collecter.stats.packets[&RXM_RAW], 1);
        assert_eq!(collecter.stats.packets[&(0x01, 0x77)], 1);

        collecter.new_stream();
        assert_eq!(collecter.stats, Statistics::default());
        assert!(collecter.time().is_none());
    }

    #[test]
    fn deferred_ephemeris() {
        let mut collecter = Collecter::new();
        let mut store = Store::default();
        let g05 = SV::new(Constellation::GPS, 5);

        let mut bytes = Vec::new();
        for words in [subframe1(100, 10), subframe2(10), subframe3(10)] {
            bytes.extend(sfrbx(5, &words));
        }
        assert!(feed(&mut collecter, &mut store, &bytes).is_empty());

        // no time reference yet
        assert!(store.ephemerides.is_empty());
        assert_eq!(collecter.reassembler.state(g05), State::Ready);

        feed(&mut collecter, &mut store, &rawx(2190, 100.0, &[]));

        assert_eq!(store.ephemerides.len(), 1);
        assert_eq!(store.ephemerides[0].0, g05);
        assert_eq!(store.ephemerides[0].1.week, 2048 + 100);
        assert_eq!(collecter.reassembler.state(g05), State::Empty);
    }

    #[test]
    fn subframes_span_streams() {
        let mut collecter = Collecter::new();
        let mut store = Store::default();
        let g05 = SV::new(Constellation::GPS, 5);

        let mut first = rawx(2190, 100.0, &[]);
        first.extend(sfrbx(5, &subframe1(2190 % 1024, 7)));
        first.extend(sfrbx(5, &subframe2(7)));
        feed(&mut collecter, &mut store, &first);
        assert_eq!(collecter.reassembler.state(g05), State::Accumulating);

        collecter.new_stream();
        assert!(collecter.time().is_none());

        let mut second = rawx(2190, 106.0, &[]);
        second.extend(sfrbx(5, &subframe3(7)));
        feed(&mut collecter, &mut store, &second);

        assert_eq!(store.ephemerides.len(), 1);
        assert_eq!(store.ephemerides[0].1.week, 2190);
        assert_eq!(store.ephemerides[0].1.iodc, 7);
    }
}

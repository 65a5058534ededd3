//! Processing pipeline: measurements in, debug records out.
use std::{
    io::{BufReader, Read, Write},
    path::Path,
};

use log::{debug, info, warn};
use nalgebra::Vector3;
use rinex::prelude::Rinex;

use crate::{
    collecter::{
        fd::{FileDescriptor, FileKind},
        observations::{MeasurementEpoch, ObservationTypes},
        settings::Settings,
        window::TimeWindow,
        Collecter,
    },
    coords::ecef_to_llh,
    error::Error,
    output::{Context, Registry},
    solver::Solver,
    ublox::Framer,
};

pub struct Receiver<S: Solver> {
    solver: S,
    /// Serves every UBX stream of this run
    collecter: Collecter,
    registry: Registry,
    window: TimeWindow,
    base_station: Option<Vector3<f64>>,
}

impl<S: Solver> Receiver<S> {
    /// Builds a new [Receiver], `settings` are frozen from now on.
    pub fn new(settings: &Settings, mut solver: S) -> Self {
        let opts = &settings.solver;
        info!(
            "elevation mask: {} deg, weighting: {:?}",
            opts.elevation_mask.to_degrees(),
            opts.weighting
        );

        solver.configure(opts);

        if let Some(base) = settings.base_station {
            let llh = ecef_to_llh(&base);
            info!(
                "base station (LLH): [{}, {}, {}]",
                llh[0].to_degrees(),
                llh[1].to_degrees(),
                llh[2]
            );
        }

        if let Some(start) = settings.start {
            info!("start time: {}", start);
        }
        if let Some(end) = settings.end {
            info!("end time: {}", end);
        }

        let registry = Registry::new(&settings.selection, &settings.measurements);
        debug!("{} output columns", registry.width());

        Self {
            solver,
            collecter: Collecter::new(),
            registry,
            window: TimeWindow::new(settings.start, settings.end),
            base_station: settings.base_station,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Comma separated column labels
    pub fn header(&self) -> String {
        self.registry.header()
    }

    /// Solves this epoch and returns its record, unless it is
    /// outside the time window.
    pub fn run(&mut self, meas: &MeasurementEpoch) -> Option<String> {
        if !self.window.accept(meas.t) {
            debug!("{} - out of time window", meas.t);
            return None;
        }

        let solution = self.solver.solve(meas, meas.t);

        let ctx = Context {
            solution: &solution,
            measurement: meas,
            base_station: self.base_station.as_ref(),
        };

        Some(self.registry.row(&ctx))
    }

    /// Processes a UBX stream, returns the number of records written.
    /// Subframes pending from previous streams still count.
    pub fn parse_ubx<R: Read, W: Write>(&mut self, reader: R, writer: &mut W) -> Result<usize, Error> {
        self.collecter.new_stream();
        let mut records = 0;

        Framer::new(reader).consume_all(|packet| {
            let Some(meas) = self.collecter.consume(packet, &mut self.solver) else {
                return Ok(());
            };

            if let Some(record) = self.run(&meas) {
                writeln!(writer, "{}", record)?;
                records += 1;
            }
            Ok(())
        })?;

        info!("{}", self.collecter.stats);
        Ok(records)
    }

    /// Processes a RINEX observation stream, returns the number of records written.
    pub fn parse_rinex_obs<R: Read, W: Write>(&mut self, reader: R, writer: &mut W) -> Result<usize, Error> {
        let rinex = Rinex::parse(&mut BufReader::new(reader))?;
        self.process_rinex_obs(&rinex, writer)
    }

    /// Processes parsed RINEX observations, returns the number of records written.
    pub fn process_rinex_obs<W: Write>(&mut self, rinex: &Rinex, writer: &mut W) -> Result<usize, Error> {
        let (Some(header), Some(record)) = (rinex.header.obs.as_ref(), rinex.record.as_obs()) else {
            warn!("not an observation file");
            return Ok(0);
        };

        let types = ObservationTypes::new(header);
        let mut records = 0;

        for (key, observations) in record.iter() {
            let meas = types.to_measurement(key, observations);
            if meas.is_empty() {
                continue;
            }

            if let Some(record) = self.run(&meas) {
                writeln!(writer, "{}", record)?;
                records += 1;
            }
        }

        Ok(records)
    }

    /// Loads a file of any kind. Auxiliary files are handed to the
    /// solver, observation files produce records.
    pub fn load<W: Write>(&mut self, kind: FileKind, path: &Path, writer: &mut W) -> Result<usize, Error> {
        let name = path.to_string_lossy().to_string();

        match kind {
            FileKind::Ubx => {
                let records = self.parse_ubx(FileDescriptor::open(path)?, writer)?;
                info!("{} - {} records", name, records);
                Ok(records)
            },
            FileKind::RinexObs => {
                kind.check_format(path)?;
                let records = self.parse_rinex_obs(FileDescriptor::open(path)?, writer)?;
                info!("{} - {} records", name, records);
                Ok(records)
            },
            kind => {
                let items = self.solver.load(kind, path)?;
                info!("{} - {} items loaded ({})", name, items, kind);
                Ok(items)
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        collecter::{
            brdc::{
                subframe::test::{subframe1, subframe2, subframe3},
                GpsEphemeris, IonoUtcParameters,
            },
            observations::codes::test::{header, key, obs_rinex, signal, t0},
            window::TimeSpec,
        },
        solver::{NavigationStore, Solution, SolverOptions, Weighting},
        ublox::test::{rawx, rawx_block, sfrbx},
    };
    use gnss::prelude::{Constellation, SV};
    use hifitime::{Epoch, Unit};
    use rinex::prelude::obs::EpochFlag;
    use std::io::Cursor;

    /// Uses every measured vehicle, never converges
    #[derive(Default)]
    struct MockSolver {
        options: Option<SolverOptions>,
        ephemerides: Vec<(SV, GpsEphemeris)>,
    }

    impl NavigationStore for MockSolver {
        fn register_ephemeris(&mut self, sv: SV, eph: GpsEphemeris) {
            self.ephemerides.push((sv, eph));
        }
        fn update_iono_utc(&mut self, _: IonoUtcParameters) {}
    }

    impl Solver for MockSolver {
        fn configure(&mut self, opts: &SolverOptions) {
            self.options = Some(opts.clone());
        }

        fn solve(&mut self, meas: &MeasurementEpoch, t: Epoch) -> Solution {
            let mut solution = Solution::new(t);
            solution.used_satellites = meas.satellites().collect();
            solution
        }

        fn load(&mut self, _: FileKind, _: &Path) -> Result<usize, Error> {
            Ok(1)
        }
    }

    fn column(receiver: &Receiver<MockSolver>, label: &str) -> usize {
        receiver
            .header()
            .split(',')
            .position(|l| l == label)
            .unwrap_or_else(|| panic!("no column {}", label))
    }

    #[test]
    fn configuration() {
        let mut settings = Settings::default();
        settings.solver.weighting = Weighting::Elevation;

        let receiver = Receiver::new(&settings, MockSolver::default());
        assert_eq!(
            receiver.solver().options.as_ref().map(|opts| opts.weighting),
            Some(Weighting::Elevation)
        );
    }

    #[test]
    fn ubx_end_to_end() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());

        let header = receiver.header();
        assert!(header.contains("PSEUDORANGE"));

        let mut bytes = rawx(2190, 100.0, &[rawx_block(0, 5, 2.0E7, 0.0, 0.0, 0x01)]);
        // garbage in between is skipped
        bytes.extend([0x00, 0xb5, 0x00]);

        let mut output = Vec::new();
        let records = receiver.parse_ubx(Cursor::new(bytes), &mut output).unwrap();
        assert_eq!(records, 1);

        let output = String::from_utf8(output).unwrap();
        let fields = output.trim_end().split(',').collect::<Vec<_>>();
        assert_eq!(fields.len(), header.split(',').count());

        assert!(output.contains("20000000.0"));
        assert_eq!(fields[column(&receiver, "L1_PSEUDORANGE(5)")], "20000000.0");
        assert_eq!(fields[column(&receiver, "L1_PSEUDORANGE(4)")], "");
        assert_eq!(fields[column(&receiver, "week")], "2190");
        assert_eq!(fields[column(&receiver, "used_satellites")], "1");
        assert_eq!(fields[column(&receiver, "longitude")], "");

        let mask = fields[column(&receiver, "GPS_PRN(32..1)")];
        let bits = crate::output::bitmask::decode(mask, 32).unwrap();
        for (i, bit) in bits.iter().enumerate() {
            assert_eq!(*bit, i == 4, "bit #{}", i + 1);
        }
    }

    #[test]
    fn invalid_pseudorange() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());
        let bytes = rawx(2190, 100.0, &[rawx_block(0, 5, 2.0E7, 0.0, 0.0, 0x00)]);

        let mut output = Vec::new();
        receiver.parse_ubx(Cursor::new(bytes), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        let fields = output.trim_end().split(',').collect::<Vec<_>>();
        assert_eq!(fields[column(&receiver, "L1_PSEUDORANGE(5)")], "");
    }

    #[test]
    fn time_window() {
        let settings = Settings {
            start: Some(TimeSpec::Relative(50.0)),
            end: Some(TimeSpec::Relative(200.0)),
            ..Default::default()
        };
        let mut receiver = Receiver::new(&settings, MockSolver::default());

        let mut bytes = Vec::new();
        for tow in [10.0, 60.0, 120.0, 300.0] {
            bytes.extend(rawx(2190, tow, &[rawx_block(0, 5, 2.0E7, 0.0, 0.0, 0x01)]));
        }

        let mut output = Vec::new();
        let records = receiver.parse_ubx(Cursor::new(bytes), &mut output).unwrap();
        assert_eq!(records, 2);

        let output = String::from_utf8(output).unwrap();
        let itow = output
            .lines()
            .map(|line| line.split(',').nth(1).unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(itow, vec!["60.0", "120.0"]);
    }

    #[test]
    fn ephemeris_spans_ubx_files() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());
        let block = rawx_block(0, 5, 2.0E7, 0.0, 0.0, 0x01);
        let mut output = Vec::new();

        let mut first = rawx(2190, 100.0, &[block.clone()]);
        first.extend(sfrbx(5, &subframe1(142, 7)));
        first.extend(sfrbx(5, &subframe2(7)));

        let mut second = rawx(2190, 106.0, &[block]);
        second.extend(sfrbx(5, &subframe3(7)));

        receiver.parse_ubx(Cursor::new(first), &mut output).unwrap();
        assert!(receiver.solver().ephemerides.is_empty());

        receiver.parse_ubx(Cursor::new(second), &mut output).unwrap();

        let ephemerides = &receiver.solver().ephemerides;
        assert_eq!(ephemerides.len(), 1);
        assert_eq!(ephemerides[0].0, SV::new(Constellation::GPS, 5));
        assert_eq!(ephemerides[0].1.iodc, 7);
        assert_eq!(ephemerides[0].1.week, 2190);
    }

    #[test]
    fn rinex_end_to_end() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());

        let g05 = SV::new(Constellation::GPS, 5);
        let g12 = SV::new(Constellation::GPS, 12);
        let t1 = t0() + 42.0 * Unit::Second;

        let rinex = obs_rinex(
            header(&[(Constellation::GPS, &["C1C", "L1C", "S1C"])]),
            vec![
                (
                    key(t0(), EpochFlag::Ok),
                    vec![signal(g05, "C1C", 20000000.0), signal(g05, "S1C", 42.0)],
                ),
                (
                    key(t0() + 30.0 * Unit::Second, EpochFlag::ExternalEvent),
                    vec![],
                ),
                (key(t1, EpochFlag::Ok), vec![signal(g12, "C1C", 21000000.0)]),
            ],
        );

        let mut output = Vec::new();
        let records = receiver.process_rinex_obs(&rinex, &mut output).unwrap();
        assert_eq!(records, 2);

        let output = String::from_utf8(output).unwrap();
        let lines = output.lines().collect::<Vec<_>>();
        let first = lines[0].split(',').collect::<Vec<_>>();
        let second = lines[1].split(',').collect::<Vec<_>>();

        assert_eq!(first[column(&receiver, "L1_PSEUDORANGE(5)")], "20000000.0");
        assert_eq!(second[column(&receiver, "L1_PSEUDORANGE(5)")], "");
        assert_eq!(second[column(&receiver, "L1_PSEUDORANGE(12)")], "21000000.0");
        assert_eq!(first[column(&receiver, "week")], "2189");
    }

    #[test]
    fn not_an_observation_file() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());
        let mut output = Vec::new();
        let records = receiver
            .process_rinex_obs(&Rinex::basic_nav(), &mut output)
            .unwrap();
        assert_eq!(records, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn auxiliary_files() {
        let mut receiver = Receiver::new(&Settings::default(), MockSolver::default());
        let mut output = Vec::new();
        assert_eq!(
            receiver
                .load(FileKind::RinexNav, Path::new("brdc.22n"), &mut output)
                .unwrap(),
            1
        );
        assert!(output.is_empty());
    }
}

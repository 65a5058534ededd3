use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};

mod files;
use files::*;

mod solver;
use solver::*;

use crate::{
    collecter::{fd::FileKind, settings::Settings, window::TimeSpec},
    coords::parse_base_station,
    output::{Directive, MeasurementColumn},
    solver::Weighting,
};

use std::{path::PathBuf, str::FromStr};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    fn command() -> Command {
        let cmd = Command::new("rxdebug")
            .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
            .version(env!("CARGO_PKG_VERSION"))
            .about("GNSS receiver debugging: PVT records from U-Blox or RINEX measurements")
            .color(ColorChoice::Always)
            .arg_required_else_help(true)
            .next_help_heading("Input files")
            .arg(
                Arg::new("files")
                    .value_name("FILE")
                    .action(ArgAction::Append)
                    .help(
                        "Input files, format guessed from their extension (.ubx, .??o, .??n, .sp3, .atx, .clk),
optionally gzip compressed (.gz). Auxiliary files (navigation, orbits, antenna, clock) are always loaded first."
                    ),
            );

        let cmd = cmd
            .next_help_heading("Input files (explicit format)")
            .args(FILES_ARGS.iter());

        let cmd = cmd
            .next_help_heading("Solver options")
            .args(SOLVER_ARGS.iter());

        cmd.next_help_heading("Output options")
            .args(OUTPUT_ARGS.iter())
    }

    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: Self::command().get_matches(),
        }
    }

    #[cfg(test)]
    fn from_args(args: &[&str]) -> Self {
        Self {
            matches: Self::command()
                .try_get_matches_from(args)
                .unwrap_or_else(|e| panic!("{}", e)),
        }
    }

    /// Returns all input files, with their format
    pub fn files(&self) -> Vec<(FileKind, PathBuf)> {
        let mut files = Vec::new();

        for kind in [
            FileKind::Ubx,
            FileKind::RinexObs,
            FileKind::RinexNav,
            FileKind::Sp3,
            FileKind::Antex,
            FileKind::RinexClk,
        ] {
            let id = kind.to_string().replace('_', "-");
            if let Some(paths) = self.matches.get_many::<String>(&id) {
                files.extend(paths.map(|path| (kind, PathBuf::from(path))));
            }
        }

        if let Some(paths) = self.matches.get_many::<String>("files") {
            for path in paths {
                let path = PathBuf::from(path);
                let kind =
                    FileKind::guess(&path).unwrap_or_else(|e| panic!("Invalid input file: {}", e));
                files.push((kind, path));
            }
        }

        files
    }

    /// Satellite directives, in command line order
    fn directives(&self) -> Vec<Directive> {
        let mut directives = Vec::new();

        for (id, with) in [("with", true), ("without", false)] {
            let (Some(specs), Some(indices)) = (
                self.matches.get_many::<String>(id),
                self.matches.indices_of(id),
            ) else {
                continue;
            };

            for (spec, index) in specs.zip(indices) {
                let directive = Directive::parse(spec, with)
                    .unwrap_or_else(|e| panic!("Invalid --{} option: {}", id, e));
                directives.push((index, directive));
            }
        }

        directives.sort_by_key(|(index, _)| *index);
        directives
            .into_iter()
            .map(|(_, directive)| directive)
            .collect()
    }

    fn time_spec(&self, id: &str) -> Option<TimeSpec> {
        let spec = self.matches.get_one::<String>(id)?;
        let spec =
            TimeSpec::from_str(spec).unwrap_or_else(|e| panic!("Invalid --{} option: {}", id, e));
        Some(spec)
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();

        if let Some(mask) = self.matches.get_one::<String>("elevation-mask-deg") {
            let mask = mask
                .trim()
                .parse::<f64>()
                .unwrap_or_else(|e| panic!("Unknown elevation mask angle: {}", e));
            settings.solver.elevation_mask = mask.to_radians();
        }

        if let Some(weight) = self.matches.get_one::<String>("weight") {
            settings.solver.weighting =
                Weighting::from_str(weight).unwrap_or_else(|e| panic!("{}", e));
        }

        for directive in self.directives() {
            directive
                .apply(&mut settings.selection, &mut settings.solver)
                .unwrap_or_else(|e| panic!("Unknown satellite: {}", e));
        }

        if let Some(base) = self.matches.get_one::<String>("base-station") {
            let base = parse_base_station(base).unwrap_or_else(|e| panic!("{}", e));
            settings.base_station = Some(base);
        }

        settings.start = self.time_spec("start-time");
        settings.end = self.time_spec("end-time");

        if let Some(columns) = self.matches.get_many::<String>("meas") {
            settings.measurements = columns
                .map(|column| {
                    MeasurementColumn::from_str(column).unwrap_or_else(|e| panic!("{}", e))
                })
                .collect();
        }

        settings
    }
}

#![doc(html_logo_url = "https://raw.githubusercontent.com/rtk-rs/.github/master/logos/logo2.jpg")]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;
extern crate ublox as ublox_lib;

use std::io::Write;

use env_logger::{Builder, Target};

use log::{error, info};

mod cli;
mod collecter;
mod constants;
mod coords;
mod error;
mod numbering;
mod output;
mod receiver;
mod solver;
mod ublox;

use crate::{cli::Cli, receiver::Receiver, solver::PassthroughSolver};

pub fn main() {
    // stdout carries the records
    let mut builder = Builder::from_default_env();

    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    // cli
    let cli = Cli::new();

    // Settings
    let settings = cli.settings();

    let mut files = cli.files();
    if files.is_empty() {
        panic!("No input file");
    }

    // auxiliary files are loaded first, order being preserved otherwise
    files.sort_by_key(|(kind, _)| !kind.is_auxiliary());

    let mut receiver = Receiver::new(&settings, PassthroughSolver::new());

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    writeln!(stdout, "{}", receiver.header())
        .unwrap_or_else(|e| panic!("Failed to write header: {}", e));

    for (kind, path) in files.iter() {
        info!("{} - loading ({})", path.display(), kind);

        if let Err(e) = receiver.load(*kind, path, &mut stdout) {
            error!("{} - {}", path.display(), e);
        }
    }

    if let Err(e) = stdout.flush() {
        error!("failed to flush records: {}", e);
    }

    let solver = receiver.solver();
    info!(
        "{} ephemerides collected, iono/utc parameters: {}",
        solver.ephemerides.len(),
        if solver.iono_utc.is_some() {
            "available"
        } else {
            "missing"
        }
    );
}

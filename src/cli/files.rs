use clap::{Arg, ArgAction};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref FILES_ARGS: Vec<Arg> = vec![
        Arg::new("ubx")
            .long("ubx")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("U-Blox binary file (.ubx)"),
        Arg::new("rinex-obs")
            .long("rinex-obs")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("RINEX observation file (V2 or V3)"),
        Arg::new("rinex-nav")
            .long("rinex-nav")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("RINEX navigation file, handed to the solver"),
        Arg::new("sp3")
            .long("sp3")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("SP3 precise orbits, handed to the solver"),
        Arg::new("antex")
            .long("antex")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("ANTEX antenna corrections, handed to the solver. Requires --sp3."),
        Arg::new("rinex-clk")
            .long("rinex-clk")
            .value_name("FILE")
            .action(ArgAction::Append)
            .help("RINEX clock file, handed to the solver"),
    ];
}

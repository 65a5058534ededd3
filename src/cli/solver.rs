use clap::{Arg, ArgAction};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref SOLVER_ARGS: Vec<Arg> = vec![
        Arg::new("elevation-mask-deg")
            .long("elevation-mask-deg")
            .value_name("DEG")
            .action(ArgAction::Set)
            .help("Elevation mask angle, in degrees. Default is 0 (over horizon)."),
        Arg::new("weight")
            .long("weight")
            .value_name("SCHEME")
            .action(ArgAction::Set)
            .help("Measurement weighting: \"elevation\" or \"identical\" (default)."),
        Arg::new("with")
            .long("with")
            .value_name("SAT")
            .action(ArgAction::Append)
            .allow_hyphen_values(true)
            .help(
                "Include satellite(s): N (legacy PRN), SYS, SYS:N, optionally followed by =label.
A negative index excludes instead. Example: --with QZSS:1=QZS1"
            ),
        Arg::new("without")
            .long("without")
            .value_name("SAT")
            .action(ArgAction::Append)
            .allow_hyphen_values(true)
            .help("Exclude satellite(s), same syntax as --with. A negative index includes instead."),
    ];
}

lazy_static! {
    pub static ref OUTPUT_ARGS: Vec<Arg> = vec![
        Arg::new("base-station")
            .long("base-station")
            .value_name("a,b,c")
            .action(ArgAction::Set)
            .allow_hyphen_values(true)
            .help(
                "Base station, for relative positioning. Each item is value[XYZNEDU] or deg_min_sec[NE].
Examples: \"-3961904.9,3348993.8,3698211.8\" (ECEF) or \"35_30_0N,139_15_0E,50U\""
            ),
        Arg::new("start-time")
            .long("start-time")
            .value_name("TIME")
            .action(ArgAction::Set)
            .help("Drops epochs prior this time: [week:]seconds or calendar date time (UTC by default)"),
        Arg::new("end-time")
            .long("end-time")
            .value_name("TIME")
            .action(ArgAction::Set)
            .help("Drops epochs past this time, same syntax as --start-time"),
        Arg::new("meas")
            .long("meas")
            .value_name("OBSERVABLE")
            .value_delimiter(',')
            .action(ArgAction::Append)
            .help("Measurement columns, for each satellite. Default is \"L1_PSEUDORANGE,L1_RANGE_RATE\"."),
    ];
}

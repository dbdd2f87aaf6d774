use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("reflekt")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("reflekt")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl seed URLs for hidden form fields and generate parameterized \
                candidate URLs.",
                )
                .arg(
                    arg!(-i --"input" <PATH>)
                        .required(true)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("File to write generated URLs to")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .default_value("output.txt"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"drop-depth" <DEPTH>)
                        .required(false)
                        .help("Omit one (1) or also every pair (2) of hidden fields when mutating")
                        .value_parser(clap::value_parser!(u8).range(1..=2))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"max-urls" <NUM>)
                        .required(false)
                        .help("Maximum generated URLs per page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("500"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print a JSON summary after the report")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("probe")
                .about(
                    "Probe URLs read from stdin for reflected injection, one query parameter \
                at a time.",
                )
                .arg(
                    arg!(-v --"verbose")
                        .required(false)
                        .help("Log skips, per-URL parameters and elapsed time")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("15"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print a JSON summary after the report")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}

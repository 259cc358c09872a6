pub mod config;

pub use config::DaemonConfig;

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

pub fn build_command() -> Command {
    Command::new("detachd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run detached from the controlling terminal, reporting through a headless UI")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Load settings from a TOML file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("strategy")
                .long("strategy")
                .short('s')
                .help("Detach strategy: native daemon(3), manual fork/setsid, or auto")
                .value_name("STRATEGY")
                .value_parser(["auto", "native", "manual"]),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .short('l')
                .help("Diagnostic log that standard streams are bound to on cleanup")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("pid-file")
                .long("pid-file")
                .short('p')
                .help("Write the daemon pid to this file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("flush-interval-ms")
                .long("flush-interval-ms")
                .help("Milliseconds between message queue flushes")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("flush-batch")
                .long("flush-batch")
                .help("Maximum queued messages drained per flush")
                .value_name("N")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("foreground")
                .long("foreground")
                .short('f')
                .help("Do not detach from the terminal")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Parse command line arguments and return ArgMatches.
pub fn parse_args() -> ArgMatches {
    build_command().get_matches()
}

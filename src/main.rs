use detachd::{boot, cli};

fn main() {
    boot::init_logging();
    let matches = cli::parse_args();

    let result = cli::DaemonConfig::from_matches(&matches).and_then(|config| {
        log::debug!("effective configuration: {config:?}");
        boot::run_daemon(config)
    });

    if let Err(err) = result {
        // errors from after detachment were already written to the diagnostic log
        if boot::needs_report(&err) {
            log::error!("{err:#}");
            eprintln!("Error: {err:#}");
        }
        std::process::exit(1);
    }
}

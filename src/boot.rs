use anyhow::{Context, Result};
use chrono::Local;
use derive_more::{Display, Error};
use log::LevelFilter;
use std::io::{self, Write};

use env_logger::{Builder, Target};

use crate::{
    cli::DaemonConfig,
    core::UiContext,
    daemon::{pidfile, Daemonizer, HeadlessUi, Libc},
};

/// Environment variable naming a file that receives the debug log.
pub const LOG_FILE_ENV: &str = "DETACHD_LOG_FILE";

/// Logger setup shared by every entrypoint.
///
/// Once detached, stderr points at `/dev/null`, so set `DETACHD_LOG_FILE` to
/// keep traces from the daemon.
pub fn init_logging() {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        if let Err(err) = init_file_logger(&path) {
            eprintln!("Failed to initialize file logger at '{path}': {err}");
            env_logger::init();
        }
    } else {
        env_logger::init();
    }
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}

/// An error that [`UiContext::fatal_error`] has already written to the bound
/// stderr. The binary only turns it into an exit status.
#[derive(Debug, Display, Error)]
#[display("{message}")]
pub struct AlreadyReported {
    message: String,
}

impl AlreadyReported {
    fn report(ctx: &UiContext, message: String) -> anyhow::Error {
        ctx.fatal_error(&message);
        AlreadyReported { message }.into()
    }
}

/// Whether `err` still has to be printed by the caller.
pub fn needs_report(err: &anyhow::Error) -> bool {
    err.downcast_ref::<AlreadyReported>().is_none()
}

/// Detach, idle until SIGINT/SIGTERM, then exit.
///
/// Failures before detachment are returned to the caller, which still has the
/// original terminal. Failures after it go through the fatal-error path so
/// they end up in the diagnostic log, and come back as [`AlreadyReported`].
pub fn run_daemon(config: DaemonConfig) -> Result<()> {
    let ctx = UiContext::new();
    ctx.register(HeadlessUi::new(config.clone()));

    ctx.init()
        .with_context(|| format!("Failed to daemonize {}", config.program))?;

    // ctrlc runs its handler on a helper thread, so it must be installed
    // after the fork or the thread would stay behind in the parent.
    let shutdown = ctx.shutdown_handle();
    if let Err(err) = ctrlc::set_handler(move || shutdown.cancel()) {
        return Err(AlreadyReported::report(
            &ctx,
            format!("Failed to install shutdown handler: {err}"),
        ));
    }
    if !config.foreground {
        let daemonizer = Daemonizer::new(&config.program, config.strategy);
        if let Err(err) = daemonizer.keep_hangup_ignored(&Libc) {
            return Err(AlreadyReported::report(&ctx, err.to_string()));
        }
    }

    // written only once a signal can no longer kill us without removing it
    if let Some(path) = &config.pid_file {
        if let Err(err) = pidfile::write(path) {
            log::warn!("{err:#}");
        }
    }

    let result = ctx.start();

    if let Some(path) = &config.pid_file {
        pidfile::remove(path);
    }

    if let Err(err) = result {
        return Err(AlreadyReported::report(&ctx, err.to_string()));
    }

    log::info!("{} shutting down", config.program);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DaemonError;

    #[test]
    fn test_reported_errors_are_not_printed_again() {
        let fresh = anyhow::Error::from(DaemonError::NotRegistered)
            .context("Failed to daemonize detachd");
        assert!(needs_report(&fresh));

        let ctx = UiContext::new();
        let reported = AlreadyReported::report(&ctx, "run loop failed".to_string());
        assert!(!needs_report(&reported));
        assert_eq!(reported.to_string(), "run loop failed");
        assert!(!needs_report(&reported.context("while shutting down")));
    }
}

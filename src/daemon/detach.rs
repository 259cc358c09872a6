/// Terminal detachment
///
/// Two strategies reach the same end state (no controlling terminal, own
/// session, inert standard descriptors):
/// - [`NativeDaemon`] hands the job to the platform `daemon(3)` call.
/// - [`ManualDetach`] ignores TTY signals, forks, calls `setsid()` and points
///   stdin/stdout/stderr at `/dev/null`.
///
/// Which one runs is decided by [`DetachStrategy`] from the configuration.
use serde::{Deserialize, Serialize};
use std::{
    io::{self, Write},
    os::unix::io::AsRawFd,
};
use strum::{Display, EnumString};

use super::sys::{Fork, ProcessControl, NATIVE_DAEMON_AVAILABLE};
use crate::core::{DaemonError, DaemonResult};

/// Signals that would stop or kill a background process through TTY job
/// control.
pub const TTY_SIGNALS: [(libc::c_int, &str); 4] = [
    (libc::SIGTTOU, "SIGTTOU"),
    (libc::SIGTTIN, "SIGTTIN"),
    (libc::SIGTSTP, "SIGTSTP"),
    (libc::SIGHUP, "SIGHUP"),
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DetachStrategy {
    /// Native when the platform has `daemon(3)`, manual otherwise.
    #[default]
    Auto,
    Native,
    Manual,
}

impl DetachStrategy {
    pub fn resolve(self) -> Self {
        match self {
            DetachStrategy::Auto if NATIVE_DAEMON_AVAILABLE => DetachStrategy::Native,
            DetachStrategy::Auto => DetachStrategy::Manual,
            other => other,
        }
    }
}

/// Where execution continues after a detach attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetachOutcome {
    /// We are the detached process.
    Daemon,
    /// We are the original process; the daemon is `child`.
    Parent { child: libc::pid_t },
}

pub trait Detach {
    fn detach(&self, sys: &dyn ProcessControl) -> DaemonResult<DetachOutcome>;
}

pub struct NativeDaemon {
    pub program: String,
}

impl Detach for NativeDaemon {
    fn detach(&self, sys: &dyn ProcessControl) -> DaemonResult<DetachOutcome> {
        // keep the working directory, let daemon(3) point 0/1/2 at /dev/null
        sys.daemon(true, false)
            .map_err(|source| DaemonError::NativeDaemon {
                program: self.program.clone(),
                source,
            })?;
        Ok(DetachOutcome::Daemon)
    }
}

pub struct ManualDetach;

impl Detach for ManualDetach {
    fn detach(&self, sys: &dyn ProcessControl) -> DaemonResult<DetachOutcome> {
        for (signal, name) in TTY_SIGNALS {
            sys.ignore_signal(signal)
                .map_err(|source| DaemonError::SignalIgnore {
                    signal: name,
                    source,
                })?;
        }

        match sys.fork().map_err(|source| DaemonError::Fork { source })? {
            Fork::Parent(child) => return Ok(DetachOutcome::Parent { child }),
            Fork::Child => {}
        }

        sys.setsid().map_err(|source| DaemonError::Setsid { source })?;

        let null = sys
            .open_null()
            .map_err(|source| DaemonError::NullDevice { source })?;
        sys.redirect_stdio(null.as_raw_fd())
            .map_err(|source| DaemonError::Redirect { source })?;
        // dropping `null` closes the original descriptor; 0/1/2 keep theirs
        drop(null);

        Ok(DetachOutcome::Daemon)
    }
}

/// Runs the configured strategy and finishes the parent side of a fork.
pub struct Daemonizer {
    program: String,
    strategy: DetachStrategy,
}

impl Daemonizer {
    pub fn new(program: impl Into<String>, strategy: DetachStrategy) -> Self {
        Self {
            program: program.into(),
            strategy,
        }
    }

    pub fn strategy(&self) -> DetachStrategy {
        self.strategy.resolve()
    }

    /// Detach the calling process.
    ///
    /// Only the detached process returns `Ok`. The original process of a
    /// manual fork exits with status 0 inside this call.
    pub fn run(&self, sys: &dyn ProcessControl) -> DaemonResult<()> {
        self.announce();

        let strategy = self.strategy();
        log::debug!("daemon_init: strategy={strategy}");

        let outcome = match strategy {
            DetachStrategy::Native => NativeDaemon {
                program: self.program.clone(),
            }
            .detach(sys)?,
            _ => ManualDetach.detach(sys)?,
        };

        match outcome {
            DetachOutcome::Daemon => Ok(()),
            DetachOutcome::Parent { child } => {
                log::debug!("detached into pid {child}, parent exiting");
                sys.exit(0)
            }
        }
    }

    /// Put `SIG_IGN` back on SIGHUP after a manual detach.
    ///
    /// Installing the shutdown handler claims SIGHUP along with SIGINT and
    /// SIGTERM. A manually detached process keeps ignoring hangups for its
    /// whole lifetime; `daemon(3)` never touched the disposition.
    pub fn keep_hangup_ignored(&self, sys: &dyn ProcessControl) -> DaemonResult<()> {
        if self.strategy() != DetachStrategy::Manual {
            return Ok(());
        }
        sys.ignore_signal(libc::SIGHUP)
            .map_err(|source| DaemonError::SignalIgnore {
                signal: "SIGHUP",
                source,
            })
    }

    fn announce(&self) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "Daemonizing {}...\n\n", self.program);
        let _ = out.flush();
    }
}

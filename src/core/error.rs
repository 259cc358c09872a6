/// Error taxonomy for the headless front-end
///
/// Every variant is fatal at this layer: a failed detachment leaves the process
/// in a partially detached state, so callers report the error on whatever
/// stream is bound and terminate.
use std::{io, path::PathBuf};

use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum DaemonError {
    /// Installing `SIG_IGN` for a terminal-control signal failed.
    #[display("signal(): cannot ignore {signal}: {source}")]
    SignalIgnore {
        signal: &'static str,
        source: io::Error,
    },
    #[display("fork(): {source}")]
    Fork { source: io::Error },
    #[display("setsid(): cannot set the session id: {source}")]
    Setsid { source: io::Error },
    /// The platform `daemon(3)` call reported an error.
    #[display("Can't daemonize {program}: {source}")]
    NativeDaemon {
        program: String,
        source: io::Error,
    },
    /// `dup2()` onto one of the standard descriptors failed.
    #[display("dup2(): cannot rebind standard descriptors: {source}")]
    Redirect { source: io::Error },
    #[display("Can't open /dev/null: {source}")]
    NullDevice { source: io::Error },
    #[display("Can't open exit file {}: {source}", path.display())]
    DiagnosticLog {
        path: PathBuf,
        source: io::Error,
    },
    #[display("no UI implementation registered")]
    NotRegistered,
}

impl DaemonError {
    /// Fork, session, signal, rebinding and native-daemonize failures.
    pub fn is_process_control(&self) -> bool {
        matches!(
            self,
            DaemonError::SignalIgnore { .. }
                | DaemonError::Fork { .. }
                | DaemonError::Setsid { .. }
                | DaemonError::NativeDaemon { .. }
                | DaemonError::Redirect { .. }
        )
    }

    /// File-open failures for the null device or the diagnostic log.
    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            DaemonError::NullDevice { .. } | DaemonError::DiagnosticLog { .. }
        )
    }
}

pub type DaemonResult<T> = std::result::Result<T, DaemonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let fork = DaemonError::Fork {
            source: io::Error::from_raw_os_error(libc::EAGAIN),
        };
        assert!(fork.is_process_control());
        assert!(!fork.is_resource());

        let log = DaemonError::DiagnosticLog {
            path: PathBuf::from("/nonexistent/x.log"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(log.is_resource());
        assert!(!log.is_process_control());

        assert!(!DaemonError::NotRegistered.is_resource());
        assert!(!DaemonError::NotRegistered.is_process_control());
    }

    #[test]
    fn test_display_names_the_failing_call() {
        let err = DaemonError::SignalIgnore {
            signal: "SIGTTOU",
            source: io::Error::from_raw_os_error(libc::EINVAL),
        };
        let text = err.to_string();
        assert!(text.starts_with("signal(): cannot ignore SIGTTOU"));

        let err = DaemonError::DiagnosticLog {
            path: PathBuf::from("/tmp/detachd.log"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/tmp/detachd.log"));
    }

    #[test]
    fn test_source_is_exposed() {
        use std::error::Error as _;
        let err = DaemonError::Setsid {
            source: io::Error::from_raw_os_error(libc::EPERM),
        };
        assert!(err.source().is_some());
        assert!(DaemonError::NotRegistered.source().is_none());
    }
}

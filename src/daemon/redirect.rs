use once_cell::sync::OnceCell;
use std::{
    fs::{File, OpenOptions},
    io::Write,
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::{Path, PathBuf},
};

use super::sys::ProcessControl;
use crate::core::{DaemonError, DaemonResult};

/// Rebinds stdin/stdout/stderr to the diagnostic log so errors reported after
/// detachment are not lost in `/dev/null`.
///
/// The log is created (truncated) on the first successful
/// [`redirect`](Self::redirect) and kept open for the rest of the process;
/// later calls do nothing. A call whose rebinding failed leaves nothing
/// behind, so the next one starts over.
pub struct OutputRedirector {
    path: PathBuf,
    program: String,
    file: OnceCell<File>,
}

impl OutputRedirector {
    pub fn new(path: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            program: program.into(),
            file: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_redirected(&self) -> bool {
        self.file.get().is_some()
    }

    pub fn redirect(&self, sys: &dyn ProcessControl) -> DaemonResult<()> {
        if self.is_redirected() {
            log::debug!("diagnostic log already bound: {}", self.path.display());
            return Ok(());
        }

        // the cell is only filled once 0/1/2 point at the log, so a failed
        // dup2 leaves the next cleanup free to retry
        let file = self.open()?;
        sys.redirect_stdio(file.as_raw_fd())
            .map_err(|source| DaemonError::Redirect { source })?;

        let banner = format!(
            "\n{} errors during daemonization are reported below:\n\n",
            self.program
        );
        let mut out = &file;
        if let Err(err) = out.write_all(banner.as_bytes()).and_then(|_| out.flush()) {
            log::warn!("failed to write diagnostic banner: {err}");
        }

        if self.file.set(file).is_err() {
            log::debug!("diagnostic log bound concurrently: {}", self.path.display());
        }
        Ok(())
    }

    fn open(&self) -> DaemonResult<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&self.path)
            .map_err(|source| DaemonError::DiagnosticLog {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::sys::testing::{Call, FakeSys};

    #[test]
    fn test_creates_log_with_banner() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("diag.log");
        std::fs::write(&path, "stale content from a previous run")?;

        let sys = FakeSys::default();
        let redirector = OutputRedirector::new(&path, "detachd");
        redirector.redirect(&sys)?;

        assert!(redirector.is_redirected());
        assert_eq!(sys.calls(), vec![Call::RedirectStdio]);
        assert_eq!(
            std::fs::read_to_string(&path)?,
            "\ndetachd errors during daemonization are reported below:\n\n"
        );
        Ok(())
    }

    #[test]
    fn test_second_cleanup_does_not_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("diag.log");

        let sys = FakeSys::default();
        let redirector = OutputRedirector::new(&path, "detachd");
        redirector.redirect(&sys)?;
        redirector.redirect(&sys)?;

        assert_eq!(sys.calls(), vec![Call::RedirectStdio]);
        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.matches("errors during daemonization").count(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_rebind_is_retried() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("diag.log");
        let redirector = OutputRedirector::new(&path, "detachd");

        let broken = FakeSys {
            fail_redirect: true,
            ..FakeSys::default()
        };
        let err = redirector.redirect(&broken).unwrap_err();
        assert!(matches!(err, DaemonError::Redirect { .. }));
        assert!(!redirector.is_redirected());

        let sys = FakeSys::default();
        redirector.redirect(&sys)?;
        assert_eq!(sys.calls(), vec![Call::RedirectStdio]);
        assert!(redirector.is_redirected());

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.matches("errors during daemonization").count(), 1);
        Ok(())
    }

    #[test]
    fn test_unopenable_log_is_resource_error() {
        let sys = FakeSys::default();
        let redirector = OutputRedirector::new("/nonexistent-dir/detachd/diag.log", "detachd");
        let err = redirector.redirect(&sys).unwrap_err();
        assert!(err.is_resource());
        assert!(!redirector.is_redirected());
        assert!(sys.calls().is_empty());
    }
}

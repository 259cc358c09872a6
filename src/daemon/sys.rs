//! Process-control primitives
//!
//! The detach state machine talks to the OS only through [`ProcessControl`],
//! so it can be driven by a recording double in tests instead of forking the
//! test harness.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    os::unix::io::RawFd,
};

/// Whether the platform ships a `daemon(3)` call.
pub const NATIVE_DAEMON_AVAILABLE: bool = cfg!(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
));

pub const NULL_DEVICE: &str = "/dev/null";

/// Which side of a `fork()` the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fork {
    Parent(libc::pid_t),
    Child,
}

pub trait ProcessControl: Send + Sync {
    /// Install `SIG_IGN` for `signal`.
    fn ignore_signal(&self, signal: libc::c_int) -> io::Result<()>;

    fn fork(&self) -> io::Result<Fork>;

    /// Start a new session with the caller as leader.
    fn setsid(&self) -> io::Result<()>;

    /// Platform `daemon(nochdir, noclose)`.
    fn daemon(&self, nochdir: bool, noclose: bool) -> io::Result<()>;

    fn open_null(&self) -> io::Result<File>;

    /// `dup2(fd, 0/1/2)`.
    fn redirect_stdio(&self, fd: RawFd) -> io::Result<()>;

    /// Terminate the current process immediately.
    fn exit(&self, code: i32) -> !;
}

/// The real thing, backed by `libc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Libc;

impl ProcessControl for Libc {
    fn ignore_signal(&self, signal: libc::c_int) -> io::Result<()> {
        // SAFETY: SIG_IGN installs no Rust code as a handler.
        let prev = unsafe { libc::signal(signal, libc::SIG_IGN) };
        if prev == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn fork(&self) -> io::Result<Fork> {
        // Anything still buffered would otherwise be written twice.
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        // SAFETY: called before any helper thread is spawned; the child only
        // continues with the single calling thread.
        match unsafe { libc::fork() } {
            -1 => Err(io::Error::last_os_error()),
            0 => Ok(Fork::Child),
            pid => Ok(Fork::Parent(pid)),
        }
    }

    fn setsid(&self) -> io::Result<()> {
        if unsafe { libc::setsid() } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    fn daemon(&self, nochdir: bool, noclose: bool) -> io::Result<()> {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        if unsafe { libc::daemon(nochdir as libc::c_int, noclose as libc::c_int) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    fn daemon(&self, _nochdir: bool, _noclose: bool) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "daemon(3) is not available on this platform",
        ))
    }

    fn open_null(&self) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(NULL_DEVICE)
    }

    fn redirect_stdio(&self, fd: RawFd) -> io::Result<()> {
        for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
            if unsafe { libc::dup2(fd, target) } == -1 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    fn exit(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}

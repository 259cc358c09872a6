/// Headless (daemon) front-end
///
/// Bundles terminal detachment, diagnostic redirection, progress rendering
/// and the idle run loop behind the [`UiOps`](crate::core::UiOps) contract.
pub mod detach;
pub mod headless;
pub mod pidfile;
pub mod progress;
pub mod redirect;
pub mod run_loop;
pub mod sys;

pub use detach::{Daemonizer, Detach, DetachOutcome, DetachStrategy, ManualDetach, NativeDaemon};
pub use headless::HeadlessUi;
pub use progress::ProgressRenderer;
pub use redirect::OutputRedirector;
pub use sys::{Libc, ProcessControl};

/// Front-end agnostic core
///
/// The engine reports through a [`UiContext`], which forwards to whichever
/// [`UiOps`] implementation is registered. Nothing in here knows about a
/// concrete front-end.
pub mod cancel;
pub mod context;
pub mod error;
pub mod ops;
pub mod queue;

pub use cancel::CancellationToken;
pub use context::UiContext;
pub use error::{DaemonError, DaemonResult};
pub use ops::UiOps;
pub use queue::MessageQueue;

/// UI operation contract
///
/// Every front-end (interactive terminal, graphical, headless) implements this
/// trait. The engine only ever talks to a [`UiContext`](super::UiContext),
/// which dispatches to whichever implementation is registered.
///
/// Methods take `&self` because the engine reports progress and messages from
/// its own threads while `start` is running the front-end's main loop.
use super::{cancel::CancellationToken, error::DaemonResult, queue::MessageQueue};

pub trait UiOps: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Prepare the front-end. Called once before `start`.
    fn init(&self) -> DaemonResult<()>;

    /// Run the front-end's main loop until `cancel` fires.
    ///
    /// Queued engine messages are drained from `queue` by the loop.
    fn start(&self, queue: &MessageQueue, cancel: &CancellationToken) -> DaemonResult<()>;

    /// Restore or redirect output so a subsequent error report is visible.
    fn cleanup(&self) -> DaemonResult<()>;

    /// Display a free-form message. Must not fail and must not block.
    fn message(&self, msg: &str);

    /// Display progress of a long-running task. `max` must be non-zero.
    fn progress(&self, value: u64, max: u64);
}

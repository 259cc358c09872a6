/// Front-end registry
///
/// `UiContext` holds the one active [`UiOps`] implementation and routes every
/// engine call to it. It is cheap to clone and is passed explicitly to the
/// components that report progress or messages, so several contexts (each
/// with its own front-end) can coexist, e.g. in tests.
use parking_lot::RwLock;
use std::sync::Arc;

use super::{
    cancel::CancellationToken,
    error::{DaemonError, DaemonResult},
    ops::UiOps,
    queue::MessageQueue,
};

#[derive(Clone, Default)]
pub struct UiContext {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    active: RwLock<Option<Arc<dyn UiOps>>>,
    queue: MessageQueue,
    cancel: CancellationToken,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `ops` as the active front-end, replacing any previous one.
    pub fn register(&self, ops: impl UiOps + 'static) {
        self.register_arc(Arc::new(ops));
    }

    pub fn register_arc(&self, ops: Arc<dyn UiOps>) {
        let mut slot = self.inner.active.write();
        if let Some(prev) = slot.as_ref() {
            log::debug!("replacing UI '{}' with '{}'", prev.name(), ops.name());
        } else {
            log::debug!("registering UI '{}'", ops.name());
        }
        *slot = Some(ops);
    }

    /// The currently registered front-end, if any.
    pub fn active(&self) -> Option<Arc<dyn UiOps>> {
        self.inner.active.read().clone()
    }

    fn require(&self) -> DaemonResult<Arc<dyn UiOps>> {
        self.active().ok_or(DaemonError::NotRegistered)
    }

    pub fn init(&self) -> DaemonResult<()> {
        let ops = self.require()?;
        log::debug!("ui init ({})", ops.name());
        ops.init()
    }

    /// Enter the active front-end's main loop. Blocks until the context's
    /// cancellation token fires.
    ///
    /// The registry lock is not held while the loop runs.
    pub fn start(&self) -> DaemonResult<()> {
        let ops = self.require()?;
        log::debug!("ui start ({})", ops.name());
        ops.start(&self.inner.queue, &self.inner.cancel)
    }

    pub fn cleanup(&self) -> DaemonResult<()> {
        let ops = self.require()?;
        log::debug!("ui cleanup ({})", ops.name());
        ops.cleanup()
    }

    /// Deliver a message to the active front-end right away.
    pub fn message(&self, msg: &str) {
        if let Some(ops) = self.active() {
            ops.message(msg);
        }
    }

    pub fn progress(&self, value: u64, max: u64) {
        if let Some(ops) = self.active() {
            ops.progress(value, max);
        }
    }

    /// Queue a message; it is shown on the front-end's next flush.
    pub fn enqueue_message(&self, msg: impl Into<String>) {
        self.inner.queue.push(msg);
    }

    pub fn queue(&self) -> &MessageQueue {
        &self.inner.queue
    }

    /// Deliver up to `max` queued messages to the active front-end.
    pub fn flush_messages(&self, max: usize) -> usize {
        match self.active() {
            Some(ops) => self.inner.queue.flush(max, |m| ops.message(m)),
            None => 0,
        }
    }

    /// Token that stops `start` when cancelled.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Fatal error path: let the front-end restore/redirect its output, then
    /// report `msg` on whatever stderr is bound afterwards.
    pub fn fatal_error(&self, msg: &str) {
        if let Err(err) = self.cleanup() {
            eprintln!("{err}");
        }
        log::error!("{msg}");
        eprintln!("FATAL: {msg}");
    }
}

/// Engine message queue
///
/// The engine enqueues user-facing messages from any thread; the active
/// front-end drains them in bounded batches from its main loop.
use flume::{Receiver, Sender};

#[derive(Debug, Clone)]
pub struct MessageQueue {
    tx: Sender<String>,
    rx: Receiver<String>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    /// Queue a message for the next flush.
    pub fn push(&self, msg: impl Into<String>) {
        // We hold a receiver ourselves, so the channel cannot be disconnected.
        let _ = self.tx.send(msg.into());
    }

    /// Cloneable producer handle for engine threads.
    pub fn sender(&self) -> Sender<String> {
        self.tx.clone()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Pop up to `max` messages in FIFO order and hand each to `sink`.
    /// Returns how many were delivered.
    pub fn flush(&self, max: usize, mut sink: impl FnMut(&str)) -> usize {
        let mut delivered = 0;
        while delivered < max {
            match self.rx.try_recv() {
                Ok(msg) => {
                    sink(&msg);
                    delivered += 1;
                }
                Err(_) => break,
            }
        }
        delivered
    }
}

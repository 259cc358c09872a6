use std::time::Duration;

use crate::core::{CancellationToken, MessageQueue};

/// Keep the daemon alive: sleep `interval`, then hand at most `batch` queued
/// messages to `sink`. Returns once `cancel` fires, with the number of
/// messages delivered.
pub fn run(
    queue: &MessageQueue,
    cancel: &CancellationToken,
    interval: Duration,
    batch: usize,
    mut sink: impl FnMut(&str),
) -> usize {
    log::debug!("daemon_interface: flushing every {interval:?}, batch {batch}");

    let mut delivered = 0;
    while !cancel.sleep(interval) {
        delivered += queue.flush(batch, &mut sink);
    }

    log::debug!("daemon_interface: cancelled after {delivered} message(s)");
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drains_in_batches_until_cancelled() {
        let queue = MessageQueue::new();
        for i in 0..35 {
            queue.push(format!("m{i}"));
        }
        let cancel = CancellationToken::new();

        let worker = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                let n = run(&queue, &cancel, Duration::from_millis(5), 10, |m| {
                    seen.push(m.to_string())
                });
                (n, seen)
            })
        };

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !queue.is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        cancel.cancel();

        let (n, seen) = worker.join().unwrap();
        assert_eq!(n, 35);
        assert_eq!(seen.first().map(String::as_str), Some("m0"));
        assert_eq!(seen.last().map(String::as_str), Some("m34"));
    }

    #[test]
    fn test_already_cancelled_returns_immediately() {
        let queue = MessageQueue::new();
        queue.push("never delivered");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let n = run(&queue, &cancel, Duration::from_secs(60), 10, |_| {
            panic!("sink must not be called")
        });
        assert_eq!(n, 0);
        assert_eq!(queue.len(), 1);
    }
}

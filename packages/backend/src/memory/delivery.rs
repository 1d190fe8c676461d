//! Ordered delivery to one listener.
//!
//! Every event is stamped with a sequence number taken under the state lock
//! that produced it. A [`Mailbox`] hands events to its callback one at a time,
//! in sequence order, and drops an event older than one it already accepted.
//! Whoever finds the mailbox idle drains it; concurrent or re-entrant posters
//! only enqueue. Callbacks never run under a backend lock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::lock;

pub(super) struct Mailbox<T> {
    callback: Arc<dyn Fn(T) + Send + Sync>,
    queue: Mutex<Queue<T>>,
}

struct Queue<T> {
    pending: VecDeque<T>,
    last_seq: Option<u64>,
    draining: bool,
}

/// Resets the queue if a callback panics mid-drain, so later posts still deliver.
struct DrainGuard<'a, T> {
    mailbox: &'a Mailbox<T>,
    finished: bool,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut queue = lock(&self.mailbox.queue);
        queue.draining = false;
        queue.pending.clear();
    }
}

impl<T> Mailbox<T> {
    pub(super) fn new(callback: Arc<dyn Fn(T) + Send + Sync>) -> Arc<Self> {
        Arc::new(Self {
            callback,
            queue: Mutex::new(Queue {
                pending: VecDeque::new(),
                last_seq: None,
                draining: false,
            }),
        })
    }

    /// Deliver `event`, stamped `seq`, after everything accepted before it.
    pub(super) fn post(&self, seq: u64, event: T) {
        {
            let mut queue = lock(&self.queue);
            if queue.last_seq.is_some_and(|last| seq <= last) {
                tracing::trace!(seq, "stale event dropped");
                return;
            }
            queue.last_seq = Some(seq);
            queue.pending.push_back(event);
            if queue.draining {
                return;
            }
            queue.draining = true;
        }

        let mut guard = DrainGuard {
            mailbox: self,
            finished: false,
        };
        loop {
            let next = {
                let mut queue = lock(&self.queue);
                match queue.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        queue.draining = false;
                        break;
                    }
                }
            };
            (self.callback)(next);
        }
        guard.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (Arc<Mutex<Vec<u32>>>, Arc<Mailbox<u32>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mailbox: Arc<Mailbox<u32>> =
            Mailbox::new(Arc::new(move |event: u32| sink.lock().unwrap().push(event)));
        (seen, mailbox)
    }

    #[test]
    fn test_older_event_is_dropped() {
        let (seen, mailbox) = recording();
        mailbox.post(1, 10);
        mailbox.post(3, 30);
        mailbox.post(2, 20);
        mailbox.post(3, 31);
        assert_eq!(*seen.lock().unwrap(), vec![10, 30]);
    }

    #[test]
    fn test_delivery_resumes_after_panicking_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mailbox: Arc<Mailbox<u32>> = Mailbox::new(Arc::new(move |event: u32| {
            if event == 0 {
                panic!("listener failed");
            }
            sink.lock().unwrap().push(event);
        }));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mailbox.post(1, 0)));
        assert!(result.is_err());
        mailbox.post(2, 7);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }
}

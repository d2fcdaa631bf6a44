//! Bounded-wait FIFO work queue: `Mutex<VecDeque<T>>` + `Condvar`.
//!
//! `pop` blocks while the queue is empty and not stopped; `push` wakes one
//! waiter; `stop` is idempotent and wakes every waiter. Once stopped, `pop`
//! drains whatever remains and then returns `None` (the terminal sentinel)
//! forever after — workers treat `None` as their exit signal.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct State<T> {
    items: VecDeque<T>,
    stopped: bool,
}

/// A queue of `T` shared between one producer (the acceptor) and many
/// consumers (the worker pool). No capacity bound is enforced here — the
/// only real bound in the system is the fixed worker count draining it.
pub struct Queue<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Queue {
            state: Mutex::new(State {
                items: VecDeque::new(),
                stopped: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Enqueue an item and wake one blocked consumer. No-op on a stopped
    /// queue's underlying storage is still appended, but a stopped queue
    /// will hand it out (or drop it unread) as part of the drain.
    pub fn push(&self, item: T) {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        state.items.push_back(item);
        self.condvar.notify_one();
    }

    /// Block until an item is available or the queue is stopped and drained.
    /// Returns `None` exactly once the queue is stopped and empty.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.stopped {
                return None;
            }
            state = self.condvar.wait(state).expect("queue condvar poisoned");
        }
    }

    /// Set the terminal flag and wake every blocked consumer. Safe to call
    /// more than once; subsequent calls are no-ops.
    pub fn stop(&self) {
        let mut state = self.state.lock().expect("queue mutex poisoned");
        if state.stopped {
            return;
        }
        state.stopped = true;
        self.condvar.notify_all();
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("queue mutex poisoned").items.len()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().expect("queue mutex poisoned").stopped
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Queue::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn push_then_pop_returns_item_in_order() {
        let q: Queue<i32> = Queue::new();
        q.push(1);
        q.push(2);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
    }

    #[test]
    fn pop_blocks_until_push_wakes_it() {
        let q = Arc::new(Queue::<i32>::new());
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.pop());

        thread::sleep(Duration::from_millis(50));
        q.push(42);

        assert_eq!(handle.join().unwrap(), Some(42));
    }

    #[test]
    fn stop_wakes_all_waiters_with_none() {
        let q = Arc::new(Queue::<i32>::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                thread::spawn(move || q.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        q.stop();

        for h in handles {
            assert_eq!(h.join().unwrap(), None);
        }
    }

    #[test]
    fn stop_drains_remaining_items_before_returning_none() {
        let q: Queue<i32> = Queue::new();
        q.push(1);
        q.push(2);
        q.stop();

        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn stop_is_idempotent() {
        let q: Queue<i32> = Queue::new();
        q.stop();
        q.stop();
        assert!(q.is_stopped());
        assert_eq!(q.pop(), None);
    }
}

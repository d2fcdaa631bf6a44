//! Fixed-size worker pool draining a [`Queue`] of accepted sockets.
//!
//! Each worker is a named OS thread looping `queue.pop()` → handle →
//! repeat, until it observes the terminal sentinel. Workers do not share
//! any per-request state with one another; whatever state a handler needs
//! across requests lives behind the `Arc<H>` it was built from.

use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::queue::Queue;

/// Services one accepted connection to completion. Implementations are
/// expected to loop internally over however many requests the client sends
/// on that connection before it closes, disconnects, or errors out.
pub trait ConnectionHandler: Send + Sync {
    fn handle(&self, stream: TcpStream);
}

/// Spawn `count` worker threads named `"{name_prefix}-{n}"`, each draining
/// `queue` via `handler` until the queue is stopped and drained.
///
/// Returns the join handles; the caller joins them during shutdown after
/// calling [`Queue::stop`].
pub fn spawn_workers<H: ConnectionHandler + 'static>(
    queue: Arc<Queue<TcpStream>>,
    handler: Arc<H>,
    count: usize,
    name_prefix: &str,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|n| {
            let queue = Arc::clone(&queue);
            let handler = Arc::clone(&handler);
            thread::Builder::new()
                .name(format!("{name_prefix}-{n}"))
                .spawn(move || loop {
                    match queue.pop() {
                        Some(stream) => handler.handle(stream),
                        None => break,
                    }
                })
                .expect("failed to spawn worker thread")
        })
        .collect()
}

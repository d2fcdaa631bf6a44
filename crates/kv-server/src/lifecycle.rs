//! Interrupt handling and the accept loop.
//!
//! Only the shutdown flag is touched from the interrupt handler itself;
//! everything else (notifying live sockets, stopping the queue, joining
//! workers, flushing state) is sequenced by each binary's own `main` after
//! [`run_accept_loop`] returns — this module only owns getting the accept
//! loop to return promptly once asked to.
//!
//! `TcpListener::accept` has no portable way to be woken from another
//! thread short of platform-specific socket options, so the loop polls a
//! non-blocking listener against the shutdown flag instead of blocking
//! indefinitely. This is the one place this crate departs from a literal
//! "close the listening fd from the signal handler" design.

use std::io;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::queue::Queue;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Install a Ctrl-C/SIGINT handler that flips a shared flag and nothing
/// else. Returns the flag so the caller can hand it to [`run_accept_loop`]
/// and check it again after the loop returns.
pub fn install_interrupt_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;
    Ok(shutdown)
}

/// Accept connections onto `queue` until `shutdown` is set. Blocks the
/// calling thread; returns once the flag is observed. Errors other than
/// "would block" are logged and treated as transient unless the flag is
/// already set, in which case the loop exits immediately.
pub fn run_accept_loop(
    listener: &TcpListener,
    queue: &Queue<std::net::TcpStream>,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    listener.set_nonblocking(true)?;

    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }

        match listener.accept() {
            Ok((stream, _addr)) => {
                queue.push(stream);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                if shutdown.load(Ordering::SeqCst) {
                    return Ok(());
                }
                eprintln!("accept failed: {e}");
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn accept_loop_enqueues_connections_and_exits_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let queue = Queue::<TcpStream>::new();
        let shutdown = AtomicBool::new(false);

        let client_thread = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let _ = TcpStream::connect(addr).unwrap();
            thread::sleep(Duration::from_millis(150));
        });

        thread::scope(|scope| {
            let queue_ref = &queue;
            let shutdown_ref = &shutdown;
            let handle = scope.spawn(move || {
                run_accept_loop(&listener, queue_ref, shutdown_ref).unwrap();
            });

            thread::sleep(Duration::from_millis(100));
            assert_eq!(queue.len(), 1);

            shutdown.store(true, Ordering::SeqCst);
            handle.join().unwrap();
        });

        client_thread.join().unwrap();
    }
}

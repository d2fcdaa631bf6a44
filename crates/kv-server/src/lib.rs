//! Connection-handling scaffolding shared by the kv-tier frontend and backend:
//! a bounded thread-safe work queue, a fixed-size worker pool driven by it,
//! a live-sockets registry for shutdown notification, and the accept-loop /
//! interrupt-handler plumbing that ties them together.
//!
//! Neither binary's request semantics live here — only the concurrency shape
//! both share, generalized over a [`ConnectionHandler`].

pub mod lifecycle;
pub mod live_sockets;
pub mod queue;
pub mod workers;

pub use lifecycle::{install_interrupt_handler, run_accept_loop};
pub use live_sockets::LiveSockets;
pub use queue::Queue;
pub use workers::{spawn_workers, ConnectionHandler};

mod config;
mod handler;

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use kv_cache::{CacheEngine, PersistentStore, StoreClient};
use kv_server::{install_interrupt_handler, run_accept_loop, spawn_workers, LiveSockets, Queue};

use crate::config::Args;
use crate::handler::FrontendHandler;

fn main() {
    let args = Args::parse_cli();

    let shutdown = match install_interrupt_handler() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("[FATAL] failed to install interrupt handler: {e}");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn PersistentStore> = match StoreClient::connect(&args.backend_addr) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("[FATAL] failed to connect to backend at {}: {e}", args.backend_addr);
            std::process::exit(1);
        }
    };

    let engine = Arc::new(CacheEngine::new(args.cache_capacity, store));
    let live_sockets = Arc::new(LiveSockets::new());

    let listener = match TcpListener::bind(&args.listen_addr) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("[FATAL] failed to bind {}: {e}", args.listen_addr);
            std::process::exit(1);
        }
    };
    println!("[INFO] kv-frontend listening on {}", args.listen_addr);

    let queue = Arc::new(Queue::<TcpStream>::new());
    let handler = Arc::new(FrontendHandler::new(Arc::clone(&engine), Arc::clone(&live_sockets)));
    let workers = spawn_workers(Arc::clone(&queue), Arc::clone(&handler), args.worker_count, "kv-frontend-worker");

    if let Err(e) = run_accept_loop(&listener, &queue, &shutdown) {
        eprintln!("[ERROR] accept loop exited with error: {e}");
    }
    shutdown.store(true, Ordering::SeqCst);

    println!("[INFO] shutting down: notifying live connections");
    live_sockets.broadcast_shutdown_notice();

    println!("[INFO] shutting down: stopping work queue");
    queue.stop();

    for w in workers {
        let _ = w.join();
    }

    println!("[INFO] shutting down: flushing dirty entries to backend");
    engine.flush_all();

    let (total_access, cache_hits) = engine.metrics().snapshot();
    let ratio = if total_access == 0 { 0.0 } else { cache_hits as f64 / total_access as f64 };
    println!(
        "[METRICS] total_access={total_access} cache_hits={cache_hits} hit_ratio={ratio:.4}"
    );

    println!("[INFO] kv-frontend shutdown complete");
}

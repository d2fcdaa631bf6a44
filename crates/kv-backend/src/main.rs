mod config;
mod handler;

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use kv_server::{install_interrupt_handler, run_accept_loop, spawn_workers, Queue};
use kv_store::{KvStore, SledStore};

use crate::config::Args;
use crate::handler::BackendHandler;

fn main() {
    let args = Args::parse_cli();

    let shutdown = match install_interrupt_handler() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("[FATAL] failed to install interrupt handler: {e}");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn KvStore> = match SledStore::open(&args.data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("[FATAL] failed to open store at {}: {e}", args.data_dir);
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(&args.listen_addr) {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("[FATAL] failed to bind {}: {e}", args.listen_addr);
            std::process::exit(1);
        }
    };
    println!("[INFO] kv-backend listening on {}", args.listen_addr);

    let queue = Arc::new(Queue::<TcpStream>::new());
    let handler = Arc::new(BackendHandler::new(store));
    let workers = spawn_workers(Arc::clone(&queue), Arc::clone(&handler), args.worker_count, "kv-backend-worker");

    if let Err(e) = run_accept_loop(&listener, &queue, &shutdown) {
        eprintln!("[ERROR] accept loop exited with error: {e}");
    }
    shutdown.store(true, Ordering::SeqCst);

    println!("[INFO] shutting down: stopping work queue");
    queue.stop();

    for w in workers {
        let _ = w.join();
    }

    println!("[INFO] kv-backend shutdown complete");
}

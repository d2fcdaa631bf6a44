//! Command-line configuration. Every setting can also come from an
//! environment variable; an explicit flag always wins over the
//! environment, which in turn wins over the compiled-in default.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "kv-frontend", about = "Write-back LRU cache fronting the kv-tier backend")]
pub struct Args {
    /// Address to listen on for client connections.
    #[arg(long, env = "KV_FRONTEND_ADDR", default_value = "0.0.0.0:6969")]
    pub listen_addr: String,

    /// Address of the backend's persistent-store connection.
    #[arg(long, env = "KV_BACKEND_ADDR", default_value = "127.0.0.1:7000")]
    pub backend_addr: String,

    /// Maximum number of resident cache entries (N in the design notes).
    #[arg(long, env = "KV_CACHE_CAPACITY", default_value_t = 100)]
    pub cache_capacity: usize,

    /// Number of worker threads servicing accepted connections (W).
    #[arg(long, env = "KV_WORKER_COUNT", default_value_t = 8)]
    pub worker_count: usize,
}

impl Args {
    pub fn parse_cli() -> Self {
        Args::parse()
    }
}

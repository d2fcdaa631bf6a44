//! Command-line configuration. Every setting can also come from an
//! environment variable; an explicit flag always wins, matching the
//! frontend's precedence.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "kv-backend", about = "Durable store for the kv-tier frontend")]
pub struct Args {
    /// Address to listen on for frontend connections.
    #[arg(long, env = "KV_BACKEND_LISTEN_ADDR", default_value = "0.0.0.0:7000")]
    pub listen_addr: String,

    /// Number of worker threads servicing accepted connections.
    #[arg(long, env = "KV_BACKEND_WORKER_COUNT", default_value_t = 8)]
    pub worker_count: usize,

    /// Directory holding the embedded on-disk store.
    #[arg(long, env = "KV_BACKEND_DATA_DIR", default_value = "./kv-backend-data")]
    pub data_dir: String,
}

impl Args {
    pub fn parse_cli() -> Self {
        Args::parse()
    }
}

//! The bounded write-back LRU cache engine: an arena-indexed access list,
//! an entry table, a persistent-store client, and the metrics that tie
//! them together. This is the core of the frontend.

pub mod engine;
pub mod list;
pub mod metrics;
pub mod store_client;

pub use engine::{CacheEngine, DeleteOutcome, GetOutcome, SetOutcome};
pub use metrics::Metrics;
pub use store_client::{PersistentStore, StoreClient, StoreError};

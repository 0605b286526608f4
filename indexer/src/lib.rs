//! Campaign transfer indexer for Arbitrum and Polygon.
//!
//! Discovers campaigns from the registry, pulls their Transfer logs from the
//! block explorer (or an RPC node), caches them in Redis and keeps a rollup
//! of statistics up to date for the frontend.

pub mod aggregator;
pub mod chain_time;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod explorer;
pub mod fetcher;
pub mod registry;
pub mod rpc;
pub mod scheduler;
pub mod service;
pub mod utils;

pub use error::AppError;

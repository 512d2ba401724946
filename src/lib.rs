//! # tibber-price - cached Tibber electricity prices
//!
//! Hourly electricity prices for home-automation sensors and chart
//! renderers, served from a read-through cache so the rate-limited Tibber
//! API is asked for each day at most once.
//!
//! ## Architecture
//!
//! - `tibber`: home resolution state machine, tiered cache (memory, disk,
//!   remote), remote fetcher and price derivation
//! - `persistence`: one JSON file per calendar day
//! - `sensor`: price, relative-price and gauge sensors over the client
//! - `chart`: chart series rebuilt once per local hour
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `error`: crate error type

pub mod chart;
pub mod config;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod sensor;
pub mod tibber;


// Re-export commonly used types
pub use config::Config;
pub use error::{PriceError, Result};
pub use tibber::{CachedPriceClient, ClientOptions, ClientState};

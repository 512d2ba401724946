//! Tibber price core
//!
//! Home resolution, the memory/disk/remote price cache, the remote fetcher
//! and the derived display values.

pub mod api;
pub mod cache;
pub mod client;
pub mod clock;
pub mod derive;
pub mod fetcher;
pub mod types;

pub use api::{PriceApi, TibberApi};
pub use cache::{MemoryCache, Tier, TieredCache};
pub use client::{CachedPriceClient, ClientOptions, ClientState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use fetcher::RemoteFetcher;
pub use types::{ChartSeries, DailyPriceSeries, DayKey, Home, HomeId, PriceDay, PriceRecord};

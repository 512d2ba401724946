//! Read-through price cache: memory, then disk, then the Tibber API
//!
//! Tiers are tried in a fixed order and the first hit wins. A disk hit is
//! copied into memory; a remote hit is copied into memory and written to
//! disk. Concurrent misses on the same day wait on a per-day gate, so one
//! remote fetch and one file write serve all of them.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{PriceError, Result};
use crate::logging::get_logger;
use crate::persistence::DayStore;
use crate::tibber::fetcher::RemoteFetcher;
use crate::tibber::types::{DailyPriceSeries, DayKey, HomeId};

/// Process-lifetime map of day series
#[derive(Default)]
pub struct MemoryCache {
    days: Mutex<HashMap<DayKey, Arc<DailyPriceSeries>>>,
}

impl MemoryCache {
    pub async fn get(&self, day: DayKey) -> Option<Arc<DailyPriceSeries>> {
        self.days.lock().await.get(&day).cloned()
    }

    pub async fn insert(&self, series: Arc<DailyPriceSeries>) {
        self.days.lock().await.insert(series.day(), series);
    }

    pub async fn contains(&self, day: DayKey) -> bool {
        self.days.lock().await.contains_key(&day)
    }

    pub async fn len(&self) -> usize {
        self.days.lock().await.len()
    }
}

/// Cache tiers in lookup order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Memory,
    Disk,
    Remote,
}

impl Tier {
    pub const ORDER: [Tier; 3] = [Tier::Memory, Tier::Disk, Tier::Remote];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Remote => "remote",
        }
    }
}

enum TierOutcome {
    Hit(Arc<DailyPriceSeries>),
    Miss,
    Failed(PriceError),
}

/// Memory/disk/remote read-through cache for one client
pub struct TieredCache {
    memory: MemoryCache,
    store: DayStore,
    fetcher: RemoteFetcher,
    inflight: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
    logger: crate::logging::StructuredLogger,
}

impl TieredCache {
    pub fn new(store: DayStore, fetcher: RemoteFetcher) -> Self {
        Self {
            memory: MemoryCache::default(),
            store,
            fetcher,
            inflight: Mutex::new(HashMap::new()),
            logger: get_logger("cache"),
        }
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn store(&self) -> &DayStore {
        &self.store
    }

    /// Series of `date`, from the first tier that has it
    pub async fn get_daily_series(
        &self,
        home: &HomeId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Arc<DailyPriceSeries>> {
        let day = DayKey::new(date);
        if let Some(hit) = self.memory.get(day).await {
            self.logger.trace(&format!("Prices for {} served from memory", day));
            return Ok(hit);
        }

        let gate = self.gate(day).await;
        let result = {
            let _held = gate.lock().await;
            self.read_through(day, home, today).await
        };
        self.release_gate(day, &gate).await;
        result
    }

    async fn read_through(
        &self,
        day: DayKey,
        home: &HomeId,
        today: NaiveDate,
    ) -> Result<Arc<DailyPriceSeries>> {
        let mut last_failure = None;
        for tier in Tier::ORDER {
            match self.try_tier(tier, day, home, today).await {
                TierOutcome::Hit(series) => {
                    self.logger
                        .debug(&format!("Prices for {} served from {}", day, tier.as_str()));
                    return Ok(series);
                }
                TierOutcome::Miss => {}
                TierOutcome::Failed(e) => {
                    self.logger
                        .debug(&format!("{} tier failed for {}: {}", tier.as_str(), day, e));
                    last_failure = Some(e);
                }
            }
        }
        Err(last_failure
            .unwrap_or_else(|| PriceError::remote_fetch(format!("No tier had prices for {}", day))))
    }

    async fn try_tier(
        &self,
        tier: Tier,
        day: DayKey,
        home: &HomeId,
        today: NaiveDate,
    ) -> TierOutcome {
        match tier {
            Tier::Memory => match self.memory.get(day).await {
                Some(series) => TierOutcome::Hit(series),
                None => TierOutcome::Miss,
            },
            Tier::Disk => match self.store.read_day(day).await {
                Ok(series) => {
                    let series = Arc::new(series);
                    self.memory.insert(series.clone()).await;
                    TierOutcome::Hit(series)
                }
                Err(e) => TierOutcome::Failed(e),
            },
            Tier::Remote => match self.fetcher.fetch_daily_series(home, day.date(), today).await {
                Ok(series) => {
                    let series = Arc::new(series);
                    self.memory.insert(series.clone()).await;
                    if let Err(e) = self.store.write_day(&series).await {
                        self.logger
                            .error(&format!("Failed to persist prices for {}: {}", day, e));
                    }
                    TierOutcome::Hit(series)
                }
                Err(e) => TierOutcome::Failed(e),
            },
        }
    }

    async fn gate(&self, day: DayKey) -> Arc<Mutex<()>> {
        self.inflight
            .lock()
            .await
            .entry(day)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_gate(&self, day: DayKey, gate: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // Waiters still hold a clone; only the last one out removes the entry
        if let Some(current) = inflight.get(&day)
            && Arc::ptr_eq(current, gate)
            && Arc::strong_count(gate) <= 2
        {
            inflight.remove(&day);
        }
    }
}

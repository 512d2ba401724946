#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tibber_price::error::{PriceError, Result};
use tibber_price::tibber::{
    CachedPriceClient, ClientOptions, Clock, FixedClock, Home, HomeId, PriceApi, PriceDay,
    PriceRecord,
};
use tokio::sync::Notify;

/// In-memory `PriceApi` that counts calls
#[derive(Default)]
pub struct MockApi {
    pub homes: Mutex<Option<Result<Vec<Home>>>>,
    pub prices: Mutex<HashMap<PriceDay, Vec<PriceRecord>>>,
    pub home_calls: AtomicUsize,
    pub price_calls: Mutex<Vec<(HomeId, PriceDay)>>,
    /// When set, `fetch_homes` waits for a notification
    pub hold_homes: Option<Arc<Notify>>,
    /// Artificial latency of `fetch_prices`
    pub price_delay: Option<Duration>,
}

impl MockApi {
    pub fn with_homes(ids: &[&str]) -> Self {
        let homes = ids
            .iter()
            .map(|id| Home {
                id: HomeId::from(*id),
                app_nickname: None,
            })
            .collect();
        Self {
            homes: Mutex::new(Some(Ok(homes))),
            ..Self::default()
        }
    }

    pub fn failing_homes(message: &str) -> Self {
        Self {
            homes: Mutex::new(Some(Err(PriceError::remote_fetch(message)))),
            ..Self::default()
        }
    }

    pub fn set_prices(&self, day: PriceDay, records: Vec<PriceRecord>) {
        self.prices.lock().unwrap().insert(day, records);
    }

    pub fn home_call_count(&self) -> usize {
        self.home_calls.load(Ordering::SeqCst)
    }

    pub fn price_call_count(&self) -> usize {
        self.price_calls.lock().unwrap().len()
    }

    pub fn price_calls(&self) -> Vec<(HomeId, PriceDay)> {
        self.price_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceApi for MockApi {
    async fn fetch_homes(&self) -> Result<Vec<Home>> {
        self.home_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(notify) = &self.hold_homes {
            notify.notified().await;
        }
        match self.homes.lock().unwrap().take() {
            Some(Ok(homes)) => Ok(homes),
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_prices(&self, home: &HomeId, day: PriceDay) -> Result<Vec<PriceRecord>> {
        self.price_calls.lock().unwrap().push((home.clone(), day));
        if let Some(delay) = self.price_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .prices
            .lock()
            .unwrap()
            .get(&day)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Instant in UTC
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// 24 hourly UTC records for `day`; hour `h` costs `base + h / 100` with 20 % tax
pub fn hourly_records(day: NaiveDate, base: f64) -> Vec<PriceRecord> {
    (0..24)
        .map(|h| {
            let starts_at = Utc
                .from_utc_datetime(&day.and_hms_opt(h, 0, 0).unwrap())
                .fixed_offset();
            let total = base + f64::from(h) / 100.0;
            PriceRecord::new(starts_at, total, total * 0.2)
        })
        .collect()
}

pub fn options(storage_root: &Path, home_id: Option<&str>) -> ClientOptions {
    ClientOptions {
        home_id: home_id.map(HomeId::from),
        price_inc_tax: true,
        timezone: chrono_tz::UTC,
        storage_root: storage_root.to_path_buf(),
    }
}

pub fn client(
    api: Arc<MockApi>,
    storage_root: &Path,
    home_id: Option<&str>,
    now: DateTime<Utc>,
) -> Arc<CachedPriceClient> {
    Arc::new(CachedPriceClient::new(
        options(storage_root, home_id),
        api,
        Arc::new(FixedClock(now)),
    ))
}

/// Clock the test moves forward by hand
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn client_with_clock(
    api: Arc<MockApi>,
    storage_root: &Path,
    clock: Arc<ManualClock>,
) -> Arc<CachedPriceClient> {
    Arc::new(CachedPriceClient::new(
        options(storage_root, None),
        api,
        clock,
    ))
}

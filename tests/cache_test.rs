mod common;

use common::{MockApi, date, hourly_records};
use std::sync::Arc;
use std::time::Duration;
use tibber_price::error::PriceError;
use tibber_price::persistence::DayStore;
use tibber_price::tibber::{
    DailyPriceSeries, DayKey, HomeId, PriceDay, RemoteFetcher, TieredCache,
};

fn cache(api: &Arc<MockApi>, root: &std::path::Path) -> TieredCache {
    TieredCache::new(
        DayStore::new(root),
        RemoteFetcher::new(api.clone(), chrono_tz::UTC),
    )
}

#[tokio::test]
async fn memory_hit_skips_disk_and_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let cache = cache(&api, tmp.path());
    let today = date(2024, 1, 15);
    let key = DayKey::new(today);

    let in_memory = Arc::new(DailyPriceSeries::new(key, hourly_records(today, 1.0)));
    cache.memory().insert(in_memory.clone()).await;
    // A different series on disk must not be read
    cache
        .store()
        .write_day(&DailyPriceSeries::new(key, hourly_records(today, 9.0)))
        .await
        .unwrap();

    let got = cache
        .get_daily_series(&HomeId::from("H1"), today, today)
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&got, &in_memory));
    assert_eq!(api.price_call_count(), 0);
}

#[tokio::test]
async fn disk_hit_populates_memory_without_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let cache = cache(&api, tmp.path());
    let today = date(2024, 1, 15);
    let key = DayKey::new(today);

    let on_disk = DailyPriceSeries::new(key, hourly_records(today, 3.0));
    cache.store().write_day(&on_disk).await.unwrap();
    assert!(!cache.memory().contains(key).await);

    let got = cache
        .get_daily_series(&HomeId::from("H1"), today, today)
        .await
        .unwrap();
    assert_eq!(*got, on_disk);
    assert!(cache.memory().contains(key).await);
    assert_eq!(api.price_call_count(), 0);
}

#[tokio::test]
async fn remote_hit_populates_disk_and_memory() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let today = date(2024, 1, 15);
    let tomorrow = date(2024, 1, 16);
    api.set_prices(PriceDay::Tomorrow, hourly_records(tomorrow, 1.5));
    let cache = cache(&api, tmp.path());

    let got = cache
        .get_daily_series(&HomeId::from("H1"), tomorrow, today)
        .await
        .unwrap();
    assert_eq!(got.len(), 24);
    assert_eq!(api.price_call_count(), 1);
    assert!(cache.memory().contains(DayKey::new(tomorrow)).await);

    let persisted = cache.store().read_day(DayKey::new(tomorrow)).await.unwrap();
    assert_eq!(persisted, *got);

    // Second read comes from memory
    cache
        .get_daily_series(&HomeId::from("H1"), tomorrow, today)
        .await
        .unwrap();
    assert_eq!(api.price_call_count(), 1);
}

#[tokio::test]
async fn corrupt_file_falls_through_to_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let today = date(2024, 1, 15);
    api.set_prices(PriceDay::Today, hourly_records(today, 1.0));
    let cache = cache(&api, tmp.path());
    let key = DayKey::new(today);

    std::fs::create_dir_all(cache.store().dir()).unwrap();
    std::fs::write(cache.store().path_for(key), b"not json").unwrap();

    let got = cache
        .get_daily_series(&HomeId::from("H1"), today, today)
        .await
        .unwrap();
    assert_eq!(got.len(), 24);
    assert_eq!(api.price_call_count(), 1);
    // The broken file was replaced
    assert_eq!(cache.store().read_day(key).await.unwrap(), *got);
}

#[tokio::test]
async fn all_tiers_missing_surfaces_remote_reason() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let cache = cache(&api, tmp.path());
    let today = date(2024, 1, 15);

    // Tomorrow not yet published upstream
    let err = cache
        .get_daily_series(&HomeId::from("H1"), date(2024, 1, 16), today)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::RemoteFetch { .. }));

    // Historical day without a file: the remote tier refuses it
    let err = cache
        .get_daily_series(&HomeId::from("H1"), date(2024, 1, 10), today)
        .await
        .unwrap_err();
    assert!(matches!(err, PriceError::UnsupportedDateRange { .. }));
    assert_eq!(api.price_call_count(), 1);
}

#[tokio::test]
async fn historical_day_on_disk_is_still_served() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::default());
    let cache = cache(&api, tmp.path());
    let old = date(2024, 1, 10);
    let series = DailyPriceSeries::new(DayKey::new(old), hourly_records(old, 1.0));
    cache.store().write_day(&series).await.unwrap();

    let got = cache
        .get_daily_series(&HomeId::from("H1"), old, date(2024, 1, 15))
        .await
        .unwrap();
    assert_eq!(*got, series);
}

#[tokio::test]
async fn concurrent_misses_share_one_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let today = date(2024, 1, 15);
    let api = Arc::new(MockApi {
        price_delay: Some(Duration::from_millis(50)),
        ..MockApi::default()
    });
    api.set_prices(PriceDay::Today, hourly_records(today, 1.0));
    let cache = Arc::new(cache(&api, tmp.path()));
    let home = HomeId::from("H1");

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let cache = cache.clone();
            let home = home.clone();
            tokio::spawn(async move { cache.get_daily_series(&home, today, today).await })
        })
        .collect();

    for task in tasks {
        let series = task.await.unwrap().unwrap();
        assert_eq!(series.len(), 24);
    }
    assert_eq!(api.price_call_count(), 1);
    assert_eq!(cache.memory().len().await, 1);
}

#[tokio::test]
async fn failed_write_keeps_fetched_series() {
    // A regular file as storage root makes every disk write fail
    let root = tempfile::NamedTempFile::new().unwrap();
    let api = Arc::new(MockApi::default());
    let today = date(2024, 1, 15);
    api.set_prices(PriceDay::Today, hourly_records(today, 1.1));
    let cache = cache(&api, root.path());
    let home = HomeId::from("H1");

    let first = cache.get_daily_series(&home, today, today).await.unwrap();
    assert_eq!(first.len(), 24);
    assert!(cache.memory().contains(DayKey::new(today)).await);
    assert!(cache.store().read_day(DayKey::new(today)).await.is_err());

    let second = cache.get_daily_series(&home, today, today).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(api.price_call_count(), 1);
}

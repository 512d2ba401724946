mod common;

use common::{MockApi, at, client, date, hourly_records};
use std::sync::Arc;
use tibber_price::config::SensorsConfig;
use tibber_price::sensor::{PriceSensor, SensorKind, SensorReading};
use tibber_price::tibber::PriceDay;

#[tokio::test]
async fn ready_client_yields_values() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::with_homes(&["H1"]));
    api.set_prices(PriceDay::Today, hourly_records(date(2024, 1, 15), 1.0));
    let client = client(api, tmp.path(), None, at(2024, 1, 15, 23, 10));
    client.initialize().await.unwrap();

    let price = PriceSensor::new(SensorKind::Price, client.clone());
    let relative = PriceSensor::new(SensorKind::RelativePrice, client.clone());
    let gauge = PriceSensor::new(SensorKind::Gauge, client);

    let value = price.read().await.value().unwrap();
    assert!((value - 123.0).abs() < 1e-9);
    assert_eq!(relative.read().await, SensorReading::Value(100.0));
    assert_eq!(gauge.read().await, SensorReading::Value(100.0));
    assert_eq!(gauge.kind().display_name(), "Electricity price gauge");
}

#[tokio::test]
async fn uninitialized_client_reads_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::with_homes(&["H1"]));
    let client = client(api.clone(), tmp.path(), None, at(2024, 1, 15, 12, 0));

    let sensor = PriceSensor::new(SensorKind::Price, client);
    assert_eq!(sensor.read().await, SensorReading::Unavailable);
    assert_eq!(api.price_call_count(), 0);
}

#[tokio::test]
async fn failed_client_reads_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let api = Arc::new(MockApi::with_homes(&[]));
    let client = client(api, tmp.path(), None, at(2024, 1, 15, 12, 0));
    client.initialize().await.unwrap_err();

    let sensor = PriceSensor::new(SensorKind::RelativePrice, client);
    assert_eq!(sensor.read().await.value(), None);
}

#[tokio::test]
async fn missing_hour_reads_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let mut records = hourly_records(date(2024, 1, 15), 1.0);
    records.truncate(6);
    let api = Arc::new(MockApi::with_homes(&["H1"]));
    api.set_prices(PriceDay::Today, records);
    let client = client(api, tmp.path(), None, at(2024, 1, 15, 20, 0));
    client.initialize().await.unwrap();

    let sensor = PriceSensor::new(SensorKind::Price, client);
    assert_eq!(sensor.read().await, SensorReading::Unavailable);
}

#[tokio::test]
async fn from_config_honours_activation_flags() {
    let tmp = tempfile::tempdir().unwrap();
    let client = client(
        Arc::new(MockApi::default()),
        tmp.path(),
        None,
        at(2024, 1, 15, 12, 0),
    );

    let all = PriceSensor::from_config(&SensorsConfig::default(), &client);
    let kinds: Vec<_> = all.iter().map(PriceSensor::kind).collect();
    assert_eq!(kinds, vec![SensorKind::Price, SensorKind::RelativePrice]);

    let only_relative = SensorsConfig {
        activate_price_sensor: false,
        activate_relative_price_sensor: true,
        activate_gauge_price_sensor: false,
    };
    let sensors = PriceSensor::from_config(&only_relative, &client);
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0].kind(), SensorKind::RelativePrice);

    let with_gauge = SensorsConfig {
        activate_gauge_price_sensor: true,
        ..SensorsConfig::default()
    };
    let kinds: Vec<_> = PriceSensor::from_config(&with_gauge, &client)
        .iter()
        .map(PriceSensor::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![SensorKind::Price, SensorKind::RelativePrice, SensorKind::Gauge]
    );

    let none = SensorsConfig {
        activate_price_sensor: false,
        activate_relative_price_sensor: false,
        activate_gauge_price_sensor: false,
    };
    assert!(PriceSensor::from_config(&none, &client).is_empty());
}

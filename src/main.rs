use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tibber_price::chart::ChartRefresher;
use tibber_price::config::Config;
use tibber_price::logging::init_logging;
use tibber_price::sensor::{PriceSensor, SensorReading};
use tibber_price::tibber::{CachedPriceClient, ClientOptions, SystemClock, TibberApi};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    info!("tibber-price {} starting up", env!("APP_VERSION"));

    let options = ClientOptions::from_config(&config).context("Invalid configuration")?;
    let api = TibberApi::new(config.tibber.access_token.clone())
        .context("Failed to create Tibber API client")?;
    let client = CachedPriceClient::spawn(options, Arc::new(api), Arc::new(SystemClock));
    info!("Prices keyed on time zone {}", client.options().timezone);

    let sensors = PriceSensor::from_config(&config.sensors, &client);
    let chart = config
        .chart
        .activate_price_graphing
        .then(|| ChartRefresher::new(Arc::clone(&client)));
    if sensors.is_empty() && chart.is_none() {
        warn!("No sensors and no price graphing activated; nothing to poll");
    }

    // Home resolution usually finishes well within the boot delay
    tokio::time::sleep(Duration::from_secs(config.scheduler.boot_delay_secs)).await;

    let mut ticker =
        tokio::time::interval(Duration::from_secs(config.scheduler.poll_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => poll(&client, &sensors, chart.as_ref()).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }
    Ok(())
}

async fn poll(
    client: &CachedPriceClient,
    sensors: &[PriceSensor],
    chart: Option<&ChartRefresher>,
) {
    if client.is_in_error_state() {
        error!("Tibber client is in error state; restart after fixing the configuration");
        return;
    }
    if !client.is_ready() {
        info!("Tibber client not ready yet");
        return;
    }

    for sensor in sensors {
        match sensor.read().await {
            SensorReading::Value(v) => info!("{}: {:.2}", sensor.kind().display_name(), v),
            SensorReading::Unavailable => {
                warn!("{}: unavailable", sensor.kind().display_name())
            }
        }
    }

    if let Some(chart) = chart
        && let Some(series) = chart.refresh().await
    {
        info!(
            "Chart series: {} hours today, tomorrow {}",
            series.today.len(),
            series.tomorrow.as_ref().map_or(0, Vec::len)
        );
    }
}

//! Price sensors
//!
//! Thin adapters between the cached client and whatever displays the
//! values. A sensor never surfaces a price error; it reports
//! `Unavailable` and leaves retrying to the next poll.

use std::sync::Arc;

use crate::config::SensorsConfig;
use crate::logging::{LogContext, get_logger_with_context};
use crate::tibber::CachedPriceClient;

/// What a sensor shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Current hour's display price
    Price,
    /// Current hour relative to today's maximum, 0-100
    RelativePrice,
    /// Same value as `RelativePrice`, shown as a gauge
    Gauge,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::RelativePrice => "relative-price",
            Self::Gauge => "gauge-price",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Price => "Electricity price",
            Self::RelativePrice => "Relative electricity price",
            Self::Gauge => "Electricity price gauge",
        }
    }
}

/// A sensor value or the "communication failure" signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Value(f64),
    Unavailable,
}

impl SensorReading {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unavailable => None,
        }
    }
}

/// Sensor bound to a shared client
pub struct PriceSensor {
    kind: SensorKind,
    client: Arc<CachedPriceClient>,
    logger: crate::logging::StructuredLogger,
}

impl PriceSensor {
    pub fn new(kind: SensorKind, client: Arc<CachedPriceClient>) -> Self {
        let logger =
            get_logger_with_context(LogContext::new("sensor").with_field("kind", kind.as_str().into()));
        Self {
            kind,
            client,
            logger,
        }
    }

    /// Sensors enabled in the configuration
    pub fn from_config(config: &SensorsConfig, client: &Arc<CachedPriceClient>) -> Vec<Self> {
        let mut sensors = Vec::new();
        if config.activate_price_sensor {
            sensors.push(Self::new(SensorKind::Price, Arc::clone(client)));
        }
        if config.activate_relative_price_sensor {
            sensors.push(Self::new(SensorKind::RelativePrice, Arc::clone(client)));
        }
        if config.activate_gauge_price_sensor {
            sensors.push(Self::new(SensorKind::Gauge, Arc::clone(client)));
        }
        sensors
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Current reading
    pub async fn read(&self) -> SensorReading {
        let result = match self.kind {
            SensorKind::Price => self.client.get_current_price().await,
            SensorKind::RelativePrice | SensorKind::Gauge => {
                self.client.get_current_price_relatively().await
            }
        };
        match result {
            Ok(value) => {
                self.logger
                    .debug(&format!("{}: {:.2}", self.kind.display_name(), value));
                SensorReading::Value(value)
            }
            Err(e) => {
                self.logger
                    .warn(&format!("{} unavailable: {}", self.kind.display_name(), e));
                SensorReading::Unavailable
            }
        }
    }
}

//! Hourly chart series refresh
//!
//! The chart changes at most once per local hour, so the series is rebuilt
//! at most once per date and hour. Until tomorrow's prices are published
//! each rebuild asks upstream for them; the hourly gate keeps that to one
//! request per hour instead of one per poll.

use chrono::{NaiveDate, Timelike};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::logging::{StructuredLogger, get_logger};
use crate::tibber::{CachedPriceClient, ChartSeries};

/// Rebuilds the chart series once per local hour
pub struct ChartRefresher {
    client: Arc<CachedPriceClient>,
    last_render: Mutex<Option<(NaiveDate, u32)>>,
    logger: StructuredLogger,
}

impl ChartRefresher {
    pub fn new(client: Arc<CachedPriceClient>) -> Self {
        Self {
            client,
            last_render: Mutex::new(None),
            logger: get_logger("chart"),
        }
    }

    /// Fresh series, or `None` when this hour is already rendered, the
    /// client is not ready or today's prices are unavailable
    pub async fn refresh(&self) -> Option<ChartSeries> {
        let mut last_render = self.last_render.lock().await;
        let now = self.client.local_now();
        let slot = (now.date_naive(), now.hour());
        if *last_render == Some(slot) {
            self.logger
                .trace(&format!("Chart for {} {:02}:00 already rendered", slot.0, slot.1));
            return None;
        }
        if !self.client.is_ready() {
            self.logger.debug("Tibber client not ready; chart postponed");
            return None;
        }

        match self.client.get_chart_series().await {
            Ok(series) => {
                *last_render = Some(slot);
                self.logger.info(&format!(
                    "Chart series refreshed for {} {:02}:00 (tomorrow {})",
                    slot.0,
                    slot.1,
                    if series.tomorrow.is_some() {
                        "published"
                    } else {
                        "pending"
                    }
                ));
                Some(series)
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Chart series unavailable: {}", e));
                None
            }
        }
    }
}

use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;

use crate::error::{PriceError, Result};
use crate::logging::get_logger;
use crate::tibber::api::PriceApi;
use crate::tibber::types::{DailyPriceSeries, DayKey, HomeId, PriceDay};

/// Remote tier: fetches one day of prices, today or tomorrow only
pub struct RemoteFetcher {
    api: Arc<dyn PriceApi>,
    timezone: Tz,
    logger: crate::logging::StructuredLogger,
}

impl RemoteFetcher {
    pub fn new(api: Arc<dyn PriceApi>, timezone: Tz) -> Self {
        Self {
            api,
            timezone,
            logger: get_logger("fetcher"),
        }
    }

    /// Fetch the series of `date` for `home`
    ///
    /// Fails with `UnsupportedDateRange`, without any network call, unless
    /// `date` is `today` or the day after. An empty answer, or one with
    /// records outside `date`, is a `RemoteFetch` failure.
    pub async fn fetch_daily_series(
        &self,
        home: &HomeId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<DailyPriceSeries> {
        let day = PriceDay::for_date(date, today)
            .ok_or(PriceError::UnsupportedDateRange { date })?;
        let key = DayKey::new(date);

        self.logger.info(&format!(
            "Fetching {} prices ({}) for home {}",
            day.as_str(),
            key,
            home
        ));
        let records = self.api.fetch_prices(home, day).await?;

        if records.is_empty() {
            return Err(PriceError::remote_fetch(format!(
                "Tibber returned no {} prices for {}",
                day.as_str(),
                key
            )));
        }
        if let Some(stray) = records
            .iter()
            .find(|r| DayKey::of(&r.starts_at, &self.timezone) != key)
        {
            return Err(PriceError::remote_fetch(format!(
                "Tibber returned a record starting {} for {}",
                stray.starts_at.to_rfc3339(),
                key
            )));
        }

        Ok(DailyPriceSeries::new(key, records))
    }
}

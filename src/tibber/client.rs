use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{PriceError, Result};
use crate::logging::{LogContext, get_logger, get_logger_with_context};
use crate::persistence::DayStore;
use crate::tibber::api::PriceApi;
use crate::tibber::cache::TieredCache;
use crate::tibber::clock::Clock;
use crate::tibber::derive;
use crate::tibber::fetcher::RemoteFetcher;
use crate::tibber::types::{ChartSeries, DailyPriceSeries, HomeId};

/// Home resolution state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// Constructed, resolution not started
    Uninitialized,
    /// Home list request in flight
    Resolving,
    /// Home resolved; price queries allowed
    Ready(HomeId),
    /// Resolution failed for good
    Error(String),
}

impl ClientState {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Error(_))
    }
}

/// Validated settings the client is built from
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Home to validate; the account's first home is used when absent
    pub home_id: Option<HomeId>,
    /// Display prices including tax
    pub price_inc_tax: bool,
    /// Zone defining calendar days and hours
    pub timezone: Tz,
    /// Storage root; day files go to `<root>/tibber-price/`
    pub storage_root: PathBuf,
}

impl ClientOptions {
    /// Build from a configuration, validating it first
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            home_id: config.home_id().map(HomeId::from),
            price_inc_tax: config.tibber.price_inc_tax,
            timezone: config.time_zone()?,
            storage_root: PathBuf::from(&config.storage.path),
        })
    }
}

/// Cached Tibber price client
///
/// Resolves the account's home once, then answers price queries from the
/// tiered cache. Queries fail fast with `NotReady` while resolution is
/// pending and with `Client` once it has failed.
pub struct CachedPriceClient {
    options: ClientOptions,
    api: Arc<dyn PriceApi>,
    clock: Arc<dyn Clock>,
    cache: TieredCache,
    state: watch::Sender<ClientState>,
    logger: crate::logging::StructuredLogger,
}

impl CachedPriceClient {
    /// Create a client in `Uninitialized` state
    pub fn new(options: ClientOptions, api: Arc<dyn PriceApi>, clock: Arc<dyn Clock>) -> Self {
        let store = DayStore::new(&options.storage_root);
        let fetcher = RemoteFetcher::new(api.clone(), options.timezone);
        let (state, _) = watch::channel(ClientState::Uninitialized);
        Self {
            options,
            api,
            clock,
            cache: TieredCache::new(store, fetcher),
            state,
            logger: get_logger("client"),
        }
    }

    /// Create a client and start home resolution in the background
    pub fn spawn(
        options: ClientOptions,
        api: Arc<dyn PriceApi>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let client = Arc::new(Self::new(options, api, clock));
        client.start();
        client
    }

    /// Start home resolution on the runtime
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let client = Arc::clone(self);
        tokio::spawn(async move {
            let _ = client.initialize().await;
        })
    }

    /// Resolve the home once; later calls report the settled outcome
    pub async fn initialize(&self) -> Result<HomeId> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == ClientState::Uninitialized {
                *state = ClientState::Resolving;
                true
            } else {
                false
            }
        });
        if !claimed {
            return match self.wait_until_settled().await {
                ClientState::Ready(home) => Ok(home),
                ClientState::Error(reason) => Err(PriceError::client(reason)),
                ClientState::Uninitialized | ClientState::Resolving => Err(PriceError::NotReady),
            };
        }

        match self.resolve_home().await {
            Ok(home) => {
                get_logger_with_context(LogContext::new("client").with_home_id(home.as_str()))
                    .info("Using Tibber home");
                self.state.send_replace(ClientState::Ready(home.clone()));
                Ok(home)
            }
            Err(e) => {
                let reason = e.to_string();
                self.logger
                    .error(&format!("Tibber home resolution failed: {}", reason));
                self.state.send_replace(ClientState::Error(reason.clone()));
                Err(PriceError::client(reason))
            }
        }
    }

    async fn resolve_home(&self) -> Result<HomeId> {
        let homes = self.api.fetch_homes().await?;
        self.logger
            .info(&format!("Received {} home(s) from Tibber", homes.len()));
        if homes.is_empty() {
            return Err(PriceError::client(
                "No homes returned from Tibber API. Is the access token correct?",
            ));
        }

        match &self.options.home_id {
            Some(wanted) => homes
                .into_iter()
                .find(|h| &h.id == wanted)
                .map(|h| h.id)
                .ok_or_else(|| {
                    PriceError::client(format!("Unable to find specified home via ID: {}", wanted))
                }),
            None => homes
                .into_iter()
                .next()
                .map(|h| h.id)
                .ok_or_else(|| PriceError::client("No homes returned from Tibber API")),
        }
    }

    /// Wait for resolution to finish and return the outcome
    ///
    /// Never returns while the client is still `Uninitialized`; pair with
    /// `start`/`spawn`.
    pub async fn wait_until_settled(&self) -> ClientState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(ClientState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    pub fn state(&self) -> ClientState {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ClientState::Ready(_))
    }

    pub fn is_in_error_state(&self) -> bool {
        matches!(*self.state.borrow(), ClientState::Error(_))
    }

    pub fn current_home_id(&self) -> Option<HomeId> {
        match &*self.state.borrow() {
            ClientState::Ready(home) => Some(home.clone()),
            _ => None,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn ensure_ready(&self) -> Result<HomeId> {
        match &*self.state.borrow() {
            ClientState::Ready(home) => Ok(home.clone()),
            ClientState::Uninitialized | ClientState::Resolving => Err(PriceError::NotReady),
            ClientState::Error(reason) => Err(PriceError::client(reason.clone())),
        }
    }

    /// Clock time in the configured zone
    pub fn local_now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.options.timezone)
    }

    fn tomorrow_of(today: NaiveDate) -> Result<NaiveDate> {
        today
            .succ_opt()
            .ok_or(PriceError::UnsupportedDateRange { date: today })
    }

    /// Series of `date` through the memory/disk/remote tiers
    pub async fn get_daily_series(&self, date: NaiveDate) -> Result<Arc<DailyPriceSeries>> {
        let home = self.ensure_ready()?;
        let today = self.local_now().date_naive();
        self.cache.get_daily_series(&home, date, today).await
    }

    /// Display price of the current hour
    pub async fn get_current_price(&self) -> Result<f64> {
        let home = self.ensure_ready()?;
        let now = self.local_now();
        let series = self
            .cache
            .get_daily_series(&home, now.date_naive(), now.date_naive())
            .await?;
        derive::current_hour_price(&series, &now, self.options.price_inc_tax)
    }

    /// Current hour as a percentage of today's highest price
    pub async fn get_current_price_relatively(&self) -> Result<f64> {
        let home = self.ensure_ready()?;
        let now = self.local_now();
        let series = self
            .cache
            .get_daily_series(&home, now.date_naive(), now.date_naive())
            .await?;
        derive::relative_percent(&series, &now, self.options.price_inc_tax)
    }

    /// Today's display prices, index 0 = first hour
    pub async fn get_todays_prices(&self) -> Result<Vec<f64>> {
        let home = self.ensure_ready()?;
        let today = self.local_now().date_naive();
        let series = self.cache.get_daily_series(&home, today, today).await?;
        Ok(derive::hourly_values(&series, self.options.price_inc_tax))
    }

    /// Tomorrow's display prices; fails until upstream publishes them
    pub async fn get_tomorrows_prices(&self) -> Result<Vec<f64>> {
        let home = self.ensure_ready()?;
        let today = self.local_now().date_naive();
        let tomorrow = Self::tomorrow_of(today)?;
        let series = self.cache.get_daily_series(&home, tomorrow, today).await?;
        Ok(derive::hourly_values(&series, self.options.price_inc_tax))
    }

    /// Series for the chart renderer; tomorrow is omitted while unavailable
    pub async fn get_chart_series(&self) -> Result<ChartSeries> {
        let now = self.local_now();
        let today = self.get_todays_prices().await?;
        let tomorrow = match self.get_tomorrows_prices().await {
            Ok(values) => Some(values),
            Err(e) => {
                self.logger
                    .debug(&format!("Tomorrow's prices not available: {}", e));
                None
            }
        };
        Ok(ChartSeries {
            labels: derive::hour_labels(),
            today,
            tomorrow,
            now_label: now.format("%H").to_string(),
        })
    }
}

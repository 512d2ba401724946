use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{PriceError, Result};
use crate::logging::get_logger;
use crate::tibber::types::{Home, HomeId, PriceDay, PriceRecord};

/// Tibber GraphQL endpoint
pub const TIBBER_API_URL: &str = "https://api.tibber.com/v1-beta/gql";

const HOMES_QUERY: &str = r#"
query HomesQuery {
    viewer {
        homes { id appNickname }
    }
}
"#;

const PRICE_INFO_QUERY: &str = r#"
query PriceInfoQuery($homeId: ID!) {
    viewer {
        home(id: $homeId) {
            currentSubscription {
                priceInfo {
                    today { total tax startsAt }
                    tomorrow { total tax startsAt }
                }
            }
        }
    }
}
"#;

/// Upstream price source
#[async_trait]
pub trait PriceApi: Send + Sync {
    /// Homes associated with the access token
    async fn fetch_homes(&self) -> Result<Vec<Home>>;

    /// Hourly prices of `home` for `day`; may be empty when not yet published
    async fn fetch_prices(&self, home: &HomeId, day: PriceDay) -> Result<Vec<PriceRecord>>;
}

/// Tibber GraphQL client
pub struct TibberApi {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
    logger: crate::logging::StructuredLogger,
}

impl TibberApi {
    /// Client against the public Tibber endpoint
    pub fn new<S: Into<String>>(access_token: S) -> Result<Self> {
        Self::with_endpoint(TIBBER_API_URL, access_token)
    }

    pub fn with_endpoint<E: Into<String>, S: Into<String>>(
        endpoint: E,
        access_token: S,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("tibber-price/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            logger: get_logger("tibber-api"),
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.access_token.trim()),
            )
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            self.logger.error(&format!("Tibber API error: {}", status));
            return Err(PriceError::remote_fetch(format!(
                "Tibber API error: {}",
                status
            )));
        }

        let body: GraphQlResponse<T> = resp.json().await?;
        if let Some(first) = body.errors.as_ref().and_then(|e| e.first()) {
            self.logger
                .error(&format!("Tibber API GraphQL error: {}", first.message));
            return Err(PriceError::remote_fetch(format!(
                "Tibber API GraphQL error: {}",
                first.message
            )));
        }
        body.data
            .ok_or_else(|| PriceError::remote_fetch("Tibber API response carried no data"))
    }
}

#[async_trait]
impl PriceApi for TibberApi {
    async fn fetch_homes(&self) -> Result<Vec<Home>> {
        let data: HomesData = self.query(HOMES_QUERY, json!({})).await?;
        Ok(data.viewer.homes)
    }

    async fn fetch_prices(&self, home: &HomeId, day: PriceDay) -> Result<Vec<PriceRecord>> {
        let data: PriceData = self
            .query(PRICE_INFO_QUERY, json!({ "homeId": home.as_str() }))
            .await?;
        let info = data
            .viewer
            .home
            .and_then(|h| h.current_subscription)
            .and_then(|s| s.price_info)
            .ok_or_else(|| {
                PriceError::remote_fetch(format!("No price info for home {}", home))
            })?;
        let records = match day {
            PriceDay::Today => info.today,
            PriceDay::Tomorrow => info.tomorrow,
        };
        Ok(records.unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct HomesData {
    viewer: HomesViewer,
}

#[derive(Debug, Deserialize)]
struct HomesViewer {
    homes: Vec<Home>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    viewer: PriceViewer,
}

#[derive(Debug, Deserialize)]
struct PriceViewer {
    home: Option<PriceHome>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceHome {
    current_subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    price_info: Option<PriceInfo>,
}

#[derive(Debug, Deserialize)]
struct PriceInfo {
    today: Option<Vec<PriceRecord>>,
    tomorrow: Option<Vec<PriceRecord>>,
}

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account-scoped identifier of a metering point ("home")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomeId(String);

impl HomeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HomeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A home as listed for the access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub id: HomeId,
    #[serde(default)]
    pub app_nickname: Option<String>,
}

/// Cost of one hour; `total` includes `tax`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub starts_at: DateTime<FixedOffset>,
    pub total: f64,
    pub tax: f64,
}

impl PriceRecord {
    pub fn new(starts_at: DateTime<FixedOffset>, total: f64, tax: f64) -> Self {
        Self {
            starts_at,
            total,
            tax,
        }
    }

    /// Pre-tax cost
    pub fn energy(&self) -> f64 {
        self.total - self.tax
    }
}

/// Calendar day in local time, rendered `YYYY-MM-DD`; cache and file key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day of `ts` as seen in `tz`
    pub fn of<T: TimeZone, U: TimeZone>(ts: &DateTime<U>, tz: &T) -> Self {
        Self(ts.with_timezone(tz).date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DayKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Self)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Hourly records of one day, ordered by `starts_at`
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPriceSeries {
    day: DayKey,
    records: Vec<PriceRecord>,
}

impl DailyPriceSeries {
    pub fn new(day: DayKey, mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|r| r.starts_at);
        Self { day, records }
    }

    pub fn day(&self) -> DayKey {
        self.day
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The two days the price API publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceDay {
    Today,
    Tomorrow,
}

impl PriceDay {
    /// Map `date` onto the API's window relative to `today`
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Option<Self> {
        if date == today {
            Some(Self::Today)
        } else if today.succ_opt() == Some(date) {
            Some(Self::Tomorrow)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
        }
    }
}

/// Derived series handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Hour labels "00" through "24"
    pub labels: Vec<String>,
    pub today: Vec<f64>,
    /// Absent until upstream publishes tomorrow's prices
    pub tomorrow: Option<Vec<f64>>,
    /// Label of the current hour, for the "now" marker
    pub now_label: String,
}

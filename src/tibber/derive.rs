//! Display values derived from raw price records
//!
//! Prices are scaled by 100 so a currency-per-kWh value reads as the
//! sub-unit (öre, cents) consumers display.

use chrono::{DateTime, TimeZone, Timelike};

use crate::error::{PriceError, Result};
use crate::tibber::types::{DailyPriceSeries, PriceRecord};

/// Price of one record, with or without tax, in display units
pub fn tax_adjusted(record: &PriceRecord, include_tax: bool) -> f64 {
    let value = if include_tax {
        record.total
    } else {
        record.energy()
    };
    value * 100.0
}

/// Display values for every record of the series, in order
pub fn hourly_values(series: &DailyPriceSeries, include_tax: bool) -> Vec<f64> {
    series
        .records()
        .iter()
        .map(|r| tax_adjusted(r, include_tax))
        .collect()
}

/// Record whose start shares `now`'s local date and hour
///
/// On the repeated hour of a DST fall-back both records match; the latest
/// one that has already started wins.
pub fn current_hour_record<'a, T: TimeZone>(
    series: &'a DailyPriceSeries,
    now: &DateTime<T>,
) -> Result<&'a PriceRecord> {
    let tz = now.timezone();
    let date = now.date_naive();
    let hour = now.hour();

    let mut matching = series.records().iter().filter(|r| {
        let local = r.starts_at.with_timezone(&tz);
        local.date_naive() == date && local.hour() == hour
    });

    let first = matching.next();
    let started = first
        .into_iter()
        .chain(matching)
        .filter(|r| r.starts_at <= *now)
        .last();

    started.or(first).ok_or_else(|| {
        PriceError::no_data_for_hour(now.naive_local().format("%Y-%m-%d %H:00").to_string())
    })
}

/// Display price of the current hour
pub fn current_hour_price<T: TimeZone>(
    series: &DailyPriceSeries,
    now: &DateTime<T>,
    include_tax: bool,
) -> Result<f64> {
    current_hour_record(series, now).map(|r| tax_adjusted(r, include_tax))
}

/// Current hour as a percentage (0-100) of the day's highest price
///
/// A day whose highest price is zero or negative scores 0.
pub fn relative_percent<T: TimeZone>(
    series: &DailyPriceSeries,
    now: &DateTime<T>,
    include_tax: bool,
) -> Result<f64> {
    let current = current_hour_price(series, now, include_tax)?;
    let max = hourly_values(series, include_tax)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);

    if max.is_nan() || max <= 0.0 {
        return Ok(0.0);
    }
    Ok((current / max * 100.0).clamp(0.0, 100.0))
}

/// Two-digit hour labels "00" through "24" for chart axes
pub fn hour_labels() -> Vec<String> {
    (0..=24).map(|h| format!("{:02}", h)).collect()
}

//! Error types and handling for tibber-price
//!
//! One error enum covers the price core (state machine, cache tiers, remote
//! fetches, derivation) and the ambient concerns around it (configuration,
//! file I/O, serialization).

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for tibber-price operations
pub type Result<T> = std::result::Result<T, PriceError>;

/// Main error type for tibber-price
#[derive(Debug, Error)]
pub enum PriceError {
    /// Home resolution has not finished yet
    #[error("Client not ready: home resolution still in progress")]
    NotReady,

    /// Home resolution failed permanently; sticky until restart
    #[error("Client in error state: {message}")]
    Client { message: String },

    /// A remote fetch was requested for a date other than today or tomorrow
    #[error("Unsupported date range: {date} is neither today nor tomorrow")]
    UnsupportedDateRange { date: NaiveDate },

    /// Network/API failure or an empty/malformed response
    #[error("Remote fetch failed: {message}")]
    RemoteFetch { message: String },

    /// Day file could not be read, parsed or written
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// The series has no record for the requested hour
    #[error("No price data for hour {hour}")]
    NoDataForHour { hour: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl PriceError {
    /// Create a new client (home resolution) error
    pub fn client<S: Into<String>>(message: S) -> Self {
        PriceError::Client {
            message: message.into(),
        }
    }

    /// Create a new remote fetch error
    pub fn remote_fetch<S: Into<String>>(message: S) -> Self {
        PriceError::RemoteFetch {
            message: message.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        PriceError::Persistence {
            message: message.into(),
        }
    }

    /// Create a new missing-hour error
    pub fn no_data_for_hour<S: Into<String>>(hour: S) -> Self {
        PriceError::NoDataForHour { hour: hour.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        PriceError::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        PriceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        PriceError::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PriceError {
    fn from(err: std::io::Error) -> Self {
        PriceError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for PriceError {
    fn from(err: serde_yaml::Error) -> Self {
        PriceError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PriceError {
    fn from(err: serde_json::Error) -> Self {
        PriceError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PriceError {
    fn from(err: reqwest::Error) -> Self {
        PriceError::remote_fetch(err.to_string())
    }
}

//! Error types for the Redfish client.

use thiserror::Error;

/// Errors that can occur when reading a temperature from a BMC.
#[derive(Debug, Error)]
pub enum RedfishError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse the thermal resource.
    #[error("Failed to parse thermal resource: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the BMC.
    #[error("Request timed out")]
    Timeout,

    /// The thermal resource contained no usable sensor reading.
    #[error("No temperature sensor reported a reading")]
    NoReading,

    /// The calibrated reading fell outside the accepted range.
    #[error("Reading {0:.1} C is outside the accepted range {1:.0}-{2:.0} C")]
    OutOfRange(f64, f64, f64),
}

impl From<reqwest::Error> for RedfishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RedfishError::Timeout
        } else if err.is_connect() {
            RedfishError::Connection(err.to_string())
        } else {
            RedfishError::Http(err.to_string())
        }
    }
}

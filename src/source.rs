//! Sensor-fetch boundary.
//!
//! The poller does not care where a temperature comes from; it talks to a
//! [`TemperatureSource`]. The production implementation is the Redfish
//! client, tests use in-memory sources.

use async_trait::async_trait;
use thiserror::Error;

use thermwatch_redfish::{RedfishClient, RedfishError};

/// Failure to obtain a reading from the sensor.
///
/// Fetch failures short-circuit a poll: no history write, no alert
/// evaluation, no state mutation. A timeout is a fetch failure, never a
/// partial status.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The Redfish client failed.
    #[error(transparent)]
    Redfish(#[from] RedfishError),

    /// A non-Redfish source was unable to produce a reading.
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),
}

/// A source of calibrated, range-validated temperatures.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Fetch one temperature in Celsius.
    async fn fetch(&self) -> Result<f64, FetchError>;

    /// A human-readable label for the source, used in logs and reports.
    fn description(&self) -> &str;
}

#[async_trait]
impl TemperatureSource for RedfishClient {
    async fn fetch(&self) -> Result<f64, FetchError> {
        Ok(self.read_celsius().await?)
    }

    fn description(&self) -> &str {
        self.endpoint()
    }
}

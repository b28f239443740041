//! Redfish thermal client.
//!
//! Queries the chassis Thermal resource over the Redfish REST API with
//! HTTP Basic authentication. BMCs almost universally serve self-signed
//! TLS certificates, so certificate verification is disabled by default
//! and can be re-enabled through the builder for deployments with a
//! proper PKI.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::RedfishError;

/// Lower bound of the accepted calibrated range, in Celsius.
const RANGE_MIN_C: f64 = 0.0;

/// Upper bound of the accepted calibrated range, in Celsius.
const RANGE_MAX_C: f64 = 100.0;

/// Client for reading chassis temperature from a Redfish BMC.
#[derive(Debug, Clone)]
pub struct RedfishClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
    chassis: String,
    calibration_offset: f64,
}

impl RedfishClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> RedfishClientBuilder {
        RedfishClientBuilder::default()
    }

    /// The configured endpoint, e.g. `https://10.0.0.120`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read one calibrated, range-validated temperature in Celsius.
    ///
    /// Fetches the chassis Thermal resource and returns the first sensor
    /// that reports a reading, with the calibration offset applied. A
    /// calibrated value outside 0–100 °C is rejected as
    /// [`RedfishError::OutOfRange`] rather than returned.
    pub async fn read_celsius(&self) -> Result<f64, RedfishError> {
        let thermal = self.fetch_thermal().await?;

        let raw = thermal
            .temperatures
            .iter()
            .find_map(|sensor| sensor.reading_celsius)
            .ok_or(RedfishError::NoReading)?;

        let calibrated = raw + self.calibration_offset;
        if !(RANGE_MIN_C..=RANGE_MAX_C).contains(&calibrated) {
            return Err(RedfishError::OutOfRange(calibrated, RANGE_MIN_C, RANGE_MAX_C));
        }

        Ok(calibrated)
    }

    async fn fetch_thermal(&self) -> Result<ThermalResource, RedfishError> {
        let url = format!("{}/redfish/v1/Chassis/{}/Thermal", self.endpoint, self.chassis);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RedfishError::Auth("Invalid credentials".to_string()));
        }

        if !response.status().is_success() {
            return Err(RedfishError::Http(format!(
                "BMC returned status {}",
                response.status()
            )));
        }

        let thermal: ThermalResource = response
            .json()
            .await
            .map_err(|e| RedfishError::Parse(e.to_string()))?;

        Ok(thermal)
    }
}

/// Builder for [`RedfishClient`].
#[derive(Debug)]
pub struct RedfishClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    chassis: Option<String>,
    calibration_offset: f64,
    timeout: Option<Duration>,
    verify_certs: bool,
}

impl Default for RedfishClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            username: None,
            password: None,
            chassis: None,
            calibration_offset: 0.0,
            timeout: None,
            verify_certs: false,
        }
    }
}

impl RedfishClientBuilder {
    /// Set the BMC base URL (e.g. "https://10.0.0.120").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the username and password for basic authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the chassis identifier (default: "System.Embedded.1", Dell iDRAC).
    pub fn chassis(mut self, chassis: impl Into<String>) -> Self {
        self.chassis = Some(chassis.into());
        self
    }

    /// Set the calibration offset added to the raw sensor value (default: 0).
    pub fn calibration_offset(mut self, offset: f64) -> Self {
        self.calibration_offset = offset;
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Verify the BMC's TLS certificate (default: off, self-signed certs).
    pub fn verify_certs(mut self, verify: bool) -> Self {
        self.verify_certs = verify;
        self
    }

    /// Build the client.
    pub fn build(self) -> RedfishClient {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!self.verify_certs)
            .user_agent("thermwatch/0.1")
            .build()
            .expect("Failed to build HTTP client");

        RedfishClient {
            client,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "https://localhost".to_string()),
            username: self.username.unwrap_or_else(|| "root".to_string()),
            password: self.password.unwrap_or_default(),
            chassis: self
                .chassis
                .unwrap_or_else(|| "System.Embedded.1".to_string()),
            calibration_offset: self.calibration_offset,
        }
    }
}

/// Chassis Thermal resource, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ThermalResource {
    #[serde(rename = "Temperatures", default)]
    temperatures: Vec<TemperatureSensor>,
}

#[derive(Debug, Deserialize)]
struct TemperatureSensor {
    #[serde(rename = "ReadingCelsius")]
    reading_celsius: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ThermalResource {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn builder_defaults() {
        let client = RedfishClient::builder().build();
        assert_eq!(client.endpoint, "https://localhost");
        assert_eq!(client.username, "root");
        assert_eq!(client.chassis, "System.Embedded.1");
        assert_eq!(client.calibration_offset, 0.0);
    }

    #[test]
    fn builder_custom() {
        let client = RedfishClient::builder()
            .endpoint("https://idrac.local")
            .credentials("admin", "secret")
            .chassis("1U")
            .calibration_offset(-62.0)
            .build();

        assert_eq!(client.endpoint, "https://idrac.local");
        assert_eq!(client.username, "admin");
        assert_eq!(client.password, "secret");
        assert_eq!(client.chassis, "1U");
        assert_eq!(client.calibration_offset, -62.0);
    }

    #[test]
    fn thermal_resource_parses_idrac_payload() {
        let thermal = parse(
            r##"{
                "@odata.type": "#Thermal.v1_5_0.Thermal",
                "Temperatures": [
                    { "Name": "System Board Inlet Temp", "ReadingCelsius": 84.0 },
                    { "Name": "CPU1 Temp", "ReadingCelsius": 47.0 }
                ]
            }"##,
        );

        assert_eq!(thermal.temperatures.len(), 2);
        assert_eq!(thermal.temperatures[0].reading_celsius, Some(84.0));
    }

    #[test]
    fn thermal_resource_tolerates_missing_readings() {
        let thermal = parse(
            r#"{
                "Temperatures": [
                    { "Name": "Exhaust" },
                    { "Name": "Inlet", "ReadingCelsius": 85.5 }
                ]
            }"#,
        );

        let first = thermal
            .temperatures
            .iter()
            .find_map(|s| s.reading_celsius);
        assert_eq!(first, Some(85.5));
    }

    #[test]
    fn thermal_resource_defaults_to_empty_sensor_list() {
        let thermal = parse("{}");
        assert!(thermal.temperatures.is_empty());
    }

    #[test]
    fn out_of_range_error_reports_value() {
        let err = RedfishError::OutOfRange(121.5, RANGE_MIN_C, RANGE_MAX_C);
        assert_eq!(
            err.to_string(),
            "Reading 121.5 C is outside the accepted range 0-100 C"
        );
    }
}

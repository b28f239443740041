//! # thermwatch-redfish
//!
//! Redfish thermal client for polling BMC temperature sensors.
//!
//! Baseboard management controllers (Dell iDRAC, HPE iLO, Lenovo XCC, ...)
//! expose chassis thermal data through the DMTF Redfish API. This crate
//! wraps that surface behind a small client that fetches one calibrated,
//! range-validated temperature per call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use thermwatch_redfish::RedfishClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RedfishClient::builder()
//!         .endpoint("https://10.0.0.120")
//!         .credentials("root", "calvin")
//!         .calibration_offset(-62.0)
//!         .build();
//!
//!     let celsius = client.read_celsius().await?;
//!     println!("inlet: {celsius:.1} C");
//!     Ok(())
//! }
//! ```
//!
//! ## Validation
//!
//! A successful read is always a plausible ambient temperature: the raw
//! sensor value has the configured calibration offset applied, and the
//! result must fall within 0.0-100.0 C. Anything else (missing sensors,
//! readings outside the accepted range, auth or transport failures) is a
//! typed [`RedfishError`], never a number.

mod client;
mod error;

pub use client::{RedfishClient, RedfishClientBuilder};
pub use error::RedfishError;

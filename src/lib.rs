//! # thermwatch
//!
//! Edge-triggered thermal monitor and alerter for server BMCs.
//!
//! thermwatch periodically samples a chassis temperature sensor exposed
//! by a Redfish management endpoint, classifies the reading against
//! warning/critical thresholds, keeps a bounded on-disk history, and
//! sends deduplicated alert e-mails on status transitions: one alert
//! when a fault level is entered, silence while it persists, and a fresh
//! alert on every level change.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Monitor                            │
//! │  ┌─────────┐   ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//! │  │ source  │──▶│   data   │──▶│  store  │   │  notify  │  │
//! │  │ (fetch) │   │(classify,│   │(history,│   │  (SMTP)  │  │
//! │  └─────────┘   │  latch)  │   │  state) │   └──────────┘  │
//! │                └──────────┘   └─────────┘                 │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the sensor boundary ([`TemperatureSource`] trait),
//!   implemented by the `thermwatch-redfish` client
//! - **[`data`]**: readings, severity classification, and the
//!   edge-triggered alert latch
//! - **[`store`]**: the two durable records (alert state and the
//!   bounded history log) behind mutex-serialized write-through stores
//! - **[`notify`]**: the delivery boundary ([`Notifier`] trait) with the
//!   SMTP implementation
//! - **[`monitor`]**: the poller tying it all together
//!
//! ## Example
//!
//! ```
//! use thermwatch::{HistoryStore, Reading, Thresholds};
//!
//! # tokio_test::block_on(async {
//! let dir = tempfile::tempdir().unwrap();
//! let history = HistoryStore::open(dir.path().join("history.json")).unwrap();
//!
//! let reading = Reading::classify(26.0, &Thresholds::default(), chrono::Utc::now()).unwrap();
//! history.append(reading).await.unwrap();
//!
//! assert_eq!(history.len().await, 1);
//! # });
//! ```

pub mod data;
pub mod monitor;
pub mod notify;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use data::{AlertState, ClassifyError, Reading, Severity, Thresholds};
pub use monitor::{AlertOutcome, Monitor, MonitorError, TickOutcome};
pub use notify::{
    DisabledNotifier, EmailConfig, EmailNotifier, Notification, Notifier, NotifyError,
};
pub use source::{FetchError, TemperatureSource};
pub use store::{HistoryStore, StateStore, StoreError, HISTORY_CAPACITY};

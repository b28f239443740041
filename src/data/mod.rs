//! Data models: readings, severity classification, and the alert latch.

pub mod alert;
pub mod reading;

pub use alert::AlertState;
pub use reading::{ClassifyError, Reading, Severity, Thresholds};

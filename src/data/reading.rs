//! Temperature readings and severity classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a temperature reading.
///
/// Totally ordered: `Normal < Warning < Critical`. Derived from a reading
/// and the configured thresholds, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Normal => "OK",
            Severity::Warning => "WARN",
            Severity::Critical => "CRIT",
        }
    }

    /// Whether this severity is worth alerting on at all.
    pub fn is_alertable(&self) -> bool {
        *self >= Severity::Warning
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Normal => "NORMAL",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Thresholds for severity classification, in Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Temperature at or above which a reading is a warning.
    pub warning: f64,
    /// Temperature at or above which a reading is critical.
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 25.0,
            critical: 30.0,
        }
    }
}

impl Thresholds {
    /// Classify a temperature against these thresholds.
    ///
    /// Boundary values belong to the higher severity: a reading equal to
    /// the critical threshold is `Critical`. NaN is rejected rather than
    /// silently classified.
    pub fn classify(&self, temperature: f64) -> Result<Severity, ClassifyError> {
        if temperature.is_nan() {
            return Err(ClassifyError::NotANumber);
        }

        if temperature >= self.critical {
            Ok(Severity::Critical)
        } else if temperature >= self.warning {
            Ok(Severity::Warning)
        } else {
            Ok(Severity::Normal)
        }
    }
}

/// Classification failed on invalid input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// The temperature was NaN.
    #[error("Temperature reading is not a number")]
    NotANumber,
}

/// One timestamped, classified temperature sample.
///
/// Immutable once created; produced once per successful poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Calibrated temperature in Celsius.
    pub temperature: f64,
    /// Severity at the time of observation.
    pub status: Severity,
    /// When the sample was taken.
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Classify a temperature and stamp it with the given observation time.
    pub fn classify(
        temperature: f64,
        thresholds: &Thresholds,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, ClassifyError> {
        let status = thresholds.classify(temperature)?;
        Ok(Self {
            temperature,
            status,
            observed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            warning: 25.0,
            critical: 30.0,
        }
    }

    #[test]
    fn below_warning_is_normal() {
        assert_eq!(thresholds().classify(20.0).unwrap(), Severity::Normal);
        assert_eq!(thresholds().classify(24.9).unwrap(), Severity::Normal);
        assert_eq!(thresholds().classify(-5.0).unwrap(), Severity::Normal);
    }

    #[test]
    fn between_thresholds_is_warning() {
        assert_eq!(thresholds().classify(26.0).unwrap(), Severity::Warning);
        assert_eq!(thresholds().classify(29.9).unwrap(), Severity::Warning);
    }

    #[test]
    fn at_or_above_critical_is_critical() {
        assert_eq!(thresholds().classify(30.1).unwrap(), Severity::Critical);
        assert_eq!(thresholds().classify(55.0).unwrap(), Severity::Critical);
    }

    #[test]
    fn boundary_belongs_to_higher_severity() {
        assert_eq!(thresholds().classify(25.0).unwrap(), Severity::Warning);
        assert_eq!(thresholds().classify(30.0).unwrap(), Severity::Critical);
    }

    #[test]
    fn nan_is_rejected() {
        assert_eq!(
            thresholds().classify(f64::NAN),
            Err(ClassifyError::NotANumber)
        );
    }

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::Normal < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
        assert!(Severity::Critical.is_alertable());
        assert!(Severity::Warning.is_alertable());
        assert!(!Severity::Normal.is_alertable());
    }

    #[test]
    fn severity_serializes_screaming() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, r#""CRITICAL""#);

        let parsed: Severity = serde_json::from_str(r#""WARNING""#).unwrap();
        assert_eq!(parsed, Severity::Warning);
    }

    #[test]
    fn reading_classify_stamps_status_and_time() {
        let now = Utc::now();
        let reading = Reading::classify(26.5, &thresholds(), now).unwrap();

        assert_eq!(reading.temperature, 26.5);
        assert_eq!(reading.status, Severity::Warning);
        assert_eq!(reading.observed_at, now);
    }
}

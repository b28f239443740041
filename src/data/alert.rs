//! Edge-triggered alert latch.
//!
//! An alert fires when an alert-worthy status differs from the last
//! status that was *successfully alerted*, not from the previous
//! observation. A sustained plateau therefore alerts once, while
//! oscillation between warning and critical re-alerts on every level
//! change. A dip to normal never touches the latch: a critical that
//! follows a normal interlude does not re-alert while the latch still
//! reads critical.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::Severity;

/// Persisted alert state: the singleton record behind the latch.
///
/// `last_status` tracks the most recent observation regardless of
/// alerting; `None` means no poll has completed yet. `last_alert_status`
/// is `None` only before the first alert ever fires, and advances only on
/// confirmed delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    #[serde(default)]
    pub last_status: Option<Severity>,
    #[serde(default)]
    pub last_alert_status: Option<Severity>,
    #[serde(default)]
    pub last_alert_time: Option<DateTime<Utc>>,
}

impl AlertState {
    /// Whether observing `status` now warrants a new notification.
    pub fn should_alert(&self, status: Severity) -> bool {
        status.is_alertable() && self.last_alert_status != Some(status)
    }

    /// Record a successfully delivered alert for `status`.
    ///
    /// Must only be called after the notifier confirmed delivery; on
    /// failure the latch stays put so the next poll retries the same
    /// alert.
    pub fn record_alert(&mut self, status: Severity, now: DateTime<Utc>) {
        self.last_alert_status = Some(status);
        self.last_alert_time = Some(now);
    }

    /// Record the observed status, independent of the alerting outcome.
    pub fn record_observation(&mut self, status: Severity) {
        self.last_status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the latch through a status sequence the way the poller does,
    /// assuming every send succeeds. Returns which steps alerted.
    fn drive(state: &mut AlertState, sequence: &[Severity]) -> Vec<bool> {
        sequence
            .iter()
            .map(|&status| {
                let fired = state.should_alert(status);
                if fired {
                    state.record_alert(status, Utc::now());
                }
                state.record_observation(status);
                fired
            })
            .collect()
    }

    #[test]
    fn fresh_state_has_no_history() {
        let state = AlertState::default();
        assert_eq!(state.last_status, None);
        assert_eq!(state.last_alert_status, None);
        assert_eq!(state.last_alert_time, None);
    }

    #[test]
    fn normal_never_alerts() {
        let mut state = AlertState::default();
        let fired = drive(&mut state, &[Severity::Normal, Severity::Normal]);
        assert_eq!(fired, vec![false, false]);
        assert_eq!(state.last_status, Some(Severity::Normal));
        assert_eq!(state.last_alert_status, None);
    }

    #[test]
    fn sustained_warning_alerts_once() {
        use Severity::*;
        let mut state = AlertState::default();
        let fired = drive(&mut state, &[Normal, Warning, Warning, Warning]);
        assert_eq!(fired, vec![false, true, false, false]);
        assert_eq!(state.last_alert_status, Some(Warning));
    }

    #[test]
    fn level_change_rearms_the_latch() {
        use Severity::*;
        let mut state = AlertState::default();
        let fired = drive(&mut state, &[Warning, Critical, Warning]);
        assert_eq!(fired, vec![true, true, true]);
    }

    #[test]
    fn oscillation_realerts_but_plateau_does_not() {
        use Severity::*;
        let mut state = AlertState::default();
        let fired = drive(
            &mut state,
            &[Normal, Warning, Warning, Critical, Warning, Critical],
        );
        assert_eq!(fired, vec![false, true, false, true, true, true]);
    }

    #[test]
    fn normal_interlude_does_not_rearm_latch() {
        use Severity::*;
        let mut state = AlertState::default();
        // 20, 26, 27, 31, 22, 31 with thresholds 25/30.
        let fired = drive(
            &mut state,
            &[Normal, Warning, Warning, Critical, Normal, Critical],
        );
        // The final critical matches the latch and stays silent even
        // though a normal reading came between.
        assert_eq!(fired, vec![false, true, false, true, false, false]);
        assert_eq!(state.last_status, Some(Critical));
        assert_eq!(state.last_alert_status, Some(Critical));
    }

    #[test]
    fn failed_delivery_leaves_latch_armed() {
        let mut state = AlertState::default();

        assert!(state.should_alert(Severity::Warning));
        // Delivery failed: observation is recorded, the latch is not.
        state.record_observation(Severity::Warning);

        assert_eq!(state.last_status, Some(Severity::Warning));
        assert_eq!(state.last_alert_status, None);
        // The next identical poll retries the same alert.
        assert!(state.should_alert(Severity::Warning));
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = AlertState::default();
        state.record_alert(Severity::Critical, Utc::now());
        state.record_observation(Severity::Critical);

        let json = serde_json::to_string(&state).unwrap();
        let parsed: AlertState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let parsed: AlertState = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, AlertState::default());
    }
}

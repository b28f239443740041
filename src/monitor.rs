//! The polling orchestrator.
//!
//! [`Monitor::tick`] runs one poll end to end: fetch, classify, append
//! to history, evaluate the alert latch, and persist. The ordering is
//! load-bearing: history records the reading even when alerting fails,
//! and the latch only advances on confirmed delivery.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::data::{ClassifyError, Reading, Thresholds};
use crate::notify::{Notification, Notifier};
use crate::source::{FetchError, TemperatureSource};
use crate::store::{HistoryStore, StateStore, StoreError};

/// A poll failed before producing a complete outcome.
///
/// Notification failures are deliberately absent from the tick variants:
/// at the tick boundary they are data (see [`AlertOutcome`]), not errors.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The sensor fetch failed; nothing was mutated.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The reading could not be classified; nothing was mutated.
    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    /// A durable record could not be written.
    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),

    /// A report or test notification could not be delivered.
    #[error("Notification failed: {0}")]
    Notify(#[from] crate::notify::NotifyError),
}

/// What happened on the alerting side of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// The status did not warrant a new alert.
    NotDue,
    /// An alert was due and was delivered; the latch advanced.
    Sent,
    /// An alert was due but delivery failed; the latch did not advance
    /// and the next poll will retry.
    Failed(String),
}

/// The structured outcome of one successful poll.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub reading: Reading,
    pub alert: AlertOutcome,
}

/// Orchestrates polls against a sensor, the durable records, and a
/// notifier.
pub struct Monitor {
    source: Box<dyn TemperatureSource>,
    notifier: Box<dyn Notifier>,
    state: StateStore,
    history: HistoryStore,
    thresholds: Thresholds,
}

impl Monitor {
    /// Assemble a monitor from its collaborators.
    pub fn new(
        source: Box<dyn TemperatureSource>,
        notifier: Box<dyn Notifier>,
        state: StateStore,
        history: HistoryStore,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            source,
            notifier,
            state,
            history,
            thresholds,
        }
    }

    /// The configured thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// The history store, for read-only surfaces.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run one poll.
    ///
    /// On fetch or classification failure nothing is mutated. Otherwise
    /// the reading is appended to history first, then the alert latch is
    /// evaluated and persisted under a single lock scope, so a concurrent
    /// poll cannot interleave evaluate/notify/commit.
    pub async fn tick(&self) -> Result<TickOutcome, MonitorError> {
        let temperature = self.source.fetch().await?;
        let reading = Reading::classify(temperature, &self.thresholds, Utc::now())?;

        tracing::info!(
            temperature = reading.temperature,
            status = reading.status.symbol(),
            "Reading"
        );

        self.history.append(reading.clone()).await?;

        let mut state = self.state.lock().await;

        let alert = if state.should_alert(reading.status) {
            match self.notifier.send(&Notification::Alert(reading.clone())).await {
                Ok(()) => {
                    state.record_alert(reading.status, reading.observed_at);
                    tracing::info!(status = reading.status.symbol(), "Alert sent");
                    AlertOutcome::Sent
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Alert delivery failed, will retry next poll");
                    AlertOutcome::Failed(err.to_string())
                }
            }
        } else {
            AlertOutcome::NotDue
        };

        state.record_observation(reading.status);
        self.state.persist(&state)?;

        Ok(TickOutcome { reading, alert })
    }

    /// Fetch a reading and send an unconditional report.
    ///
    /// Independent of the alert latch: no history append, no state
    /// mutation, and the dedup latch is neither consulted nor advanced.
    pub async fn report(&self) -> Result<Reading, MonitorError> {
        let temperature = self.source.fetch().await?;
        let reading = Reading::classify(temperature, &self.thresholds, Utc::now())?;

        self.notifier.send(&Notification::Report(reading.clone())).await?;
        Ok(reading)
    }

    /// Send a connectivity-test notification, bypassing sensor and state.
    pub async fn send_test(&self) -> Result<(), MonitorError> {
        self.notifier.send(&Notification::Test).await?;
        Ok(())
    }

    /// Poll on a fixed period, forever.
    ///
    /// Per-tick failures are logged and the loop continues; retrying a
    /// failed alert is just the next tick. When `report_every` is set an
    /// unconditional report is additionally sent on that cadence.
    pub async fn run(&self, interval: Duration, report_every: Option<Duration>) {
        tracing::info!(
            source = self.source.description(),
            interval_secs = interval.as_secs(),
            "Starting monitor loop"
        );

        let mut ticker = tokio::time::interval(interval);
        let mut last_report = std::time::Instant::now();

        loop {
            ticker.tick().await;

            if let Err(err) = self.tick().await {
                tracing::error!(error = %err, "Poll failed");
            }

            if let Some(every) = report_every {
                if last_report.elapsed() >= every {
                    match self.report().await {
                        Ok(reading) => {
                            tracing::info!(status = reading.status.symbol(), "Report sent")
                        }
                        Err(err) => tracing::warn!(error = %err, "Report failed"),
                    }
                    last_report = std::time::Instant::now();
                }
            }
        }
    }
}

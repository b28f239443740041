//! Notification delivery.
//!
//! [`EmailNotifier`] wraps the `lettre` async SMTP transport to send
//! plain-text alert and report e-mails. Delivery is best-effort: the
//! poller records a failed send in its outcome and retries on the next
//! natural poll, it never loops or backs off internally.

use async_trait::async_trait;
use thiserror::Error;

use crate::data::{Reading, Severity, Thresholds};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP connection timeout.
const SMTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// Error type for notification delivery failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// No notification transport is configured.
    #[error("No notification transport is configured")]
    NotConfigured,
}

/// A notification to deliver.
///
/// Alerts are the edge-triggered, deduplicated kind; reports are
/// unconditional status mails; tests carry no reading and exist only to
/// verify connectivity.
#[derive(Debug, Clone)]
pub enum Notification {
    Alert(Reading),
    Report(Reading),
    Test,
}

impl Notification {
    /// The kind label used in subjects and bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Alert(_) => "Alert",
            Notification::Report(_) => "Report",
            Notification::Test => "Test",
        }
    }

    /// The reading this notification is about, if any.
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Notification::Alert(reading) | Notification::Report(reading) => Some(reading),
            Notification::Test => None,
        }
    }
}

/// Delivers notifications to an operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. `Ok` means the transport accepted it.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Configuration for the SMTP notifier.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP relay hostname.
    pub smtp_host: String,
    /// SMTP relay port (defaults to 587).
    pub smtp_port: u16,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// RFC 5322 "From" address.
    pub from: String,
    /// Recipient addresses.
    pub recipients: Vec<String>,
}

impl EmailConfig {
    /// Minimal config for a relay with no authentication.
    pub fn relay(smtp_host: impl Into<String>, from: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            from: from.into(),
            recipients,
        }
    }
}

/// Sends notification e-mails via SMTP (STARTTLS).
pub struct EmailNotifier {
    config: EmailConfig,
    thresholds: Thresholds,
    endpoint: String,
    host: String,
}

impl EmailNotifier {
    /// Create a notifier for readings taken from `endpoint`.
    ///
    /// The thresholds are only used for the body text, so operators can
    /// see the configured limits alongside the reading that tripped them.
    pub fn new(config: EmailConfig, thresholds: Thresholds, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let host = host_label(&endpoint);
        Self {
            config,
            thresholds,
            endpoint,
            host,
        }
    }

    fn subject(&self, notification: &Notification) -> String {
        match notification.reading() {
            Some(reading) => format!(
                "[thermwatch {}] {} - {:.1}C - {}",
                notification.kind(),
                reading.status,
                reading.temperature,
                self.host
            ),
            None => "[thermwatch Test] SMTP connectivity".to_string(),
        }
    }

    fn body(&self, notification: &Notification) -> String {
        let Some(reading) = notification.reading() else {
            return format!(
                "This is a test notification from thermwatch.\nTime: {}\nEndpoint: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
                self.endpoint
            );
        };

        let mut lines = vec![
            format!("thermwatch temperature {}", notification.kind()),
            format!("Host: {}", self.host),
            format!("Status: {}", reading.status),
            format!("Temperature: {:.1} C", reading.temperature),
            format!(
                "Thresholds: Warning >= {:.0} C | Critical >= {:.0} C",
                self.thresholds.warning, self.thresholds.critical
            ),
            format!("Time: {}", reading.observed_at.format("%Y-%m-%d %H:%M:%S UTC")),
            format!("Endpoint: {}", self.endpoint),
        ];

        // Alerts carry a one-line recommendation.
        if matches!(notification, Notification::Alert(_)) {
            match reading.status {
                Severity::Critical => lines.push(
                    "Action: Immediate attention recommended (check cooling, workloads, BMC)."
                        .to_string(),
                ),
                Severity::Warning => lines
                    .push("Action: Monitor closely; investigate airflow and load.".to_string()),
                Severity::Normal => {}
            }
        }

        lines.join("\n")
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let mut builder = Message::builder()
            .from(self.config.from.parse()?)
            .subject(self.subject(notification))
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.config.recipients {
            builder = builder.to(recipient.parse()?);
        }
        let email = builder
            .body(self.body(notification))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .timeout(Some(SMTP_TIMEOUT));

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(kind = notification.kind(), "Notification sent");
        Ok(())
    }
}

/// Notifier used when no SMTP relay is configured.
///
/// Every send fails with [`NotifyError::NotConfigured`], so the alert
/// latch never advances and decisions stay visible in the logs until an
/// operator wires up a transport.
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

// Host part of an endpoint URL, for subject lines.
fn host_label(endpoint: &str) -> String {
    let without_scheme = endpoint
        .strip_prefix("https://")
        .or_else(|| endpoint.strip_prefix("http://"))
        .unwrap_or(endpoint);
    without_scheme
        .split(['/', ':'])
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    fn notifier() -> EmailNotifier {
        EmailNotifier::new(
            EmailConfig::relay(
                "smtp.example.com",
                "monitor@example.com",
                vec!["ops@example.com".to_string()],
            ),
            Thresholds::default(),
            "https://10.0.0.120",
        )
    }

    fn warning_reading() -> Reading {
        Reading {
            temperature: 26.0,
            status: Severity::Warning,
            observed_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn host_label_strips_scheme_and_path() {
        assert_eq!(host_label("https://10.0.0.120"), "10.0.0.120");
        assert_eq!(host_label("http://idrac.local:8443/redfish"), "idrac.local");
        assert_eq!(host_label("bare-host"), "bare-host");
    }

    #[test]
    fn alert_subject_names_status_and_host() {
        let subject = notifier().subject(&Notification::Alert(warning_reading()));
        assert_eq!(subject, "[thermwatch Alert] WARNING - 26.0C - 10.0.0.120");
    }

    #[test]
    fn test_subject_is_fixed() {
        let subject = notifier().subject(&Notification::Test);
        assert_eq!(subject, "[thermwatch Test] SMTP connectivity");
    }

    #[test]
    fn alert_body_includes_thresholds_and_action() {
        let body = notifier().body(&Notification::Alert(warning_reading()));

        assert!(body.contains("Status: WARNING"));
        assert!(body.contains("Temperature: 26.0 C"));
        assert!(body.contains("Thresholds: Warning >= 25 C | Critical >= 30 C"));
        assert!(body.contains("Time: 2024-06-01 12:30:00 UTC"));
        assert!(body.contains("Action: Monitor closely"));
    }

    #[test]
    fn critical_alert_recommends_immediate_attention() {
        let mut reading = warning_reading();
        reading.temperature = 31.0;
        reading.status = Severity::Critical;

        let body = notifier().body(&Notification::Alert(reading));
        assert!(body.contains("Action: Immediate attention recommended"));
    }

    #[test]
    fn report_body_has_no_action_line() {
        let body = notifier().body(&Notification::Report(warning_reading()));
        assert!(body.contains("temperature Report"));
        assert!(!body.contains("Action:"));
    }

    #[tokio::test]
    async fn disabled_notifier_always_fails() {
        let err = DisabledNotifier.send(&Notification::Test).await.unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }
}

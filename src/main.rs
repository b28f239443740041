//! thermwatch CLI.
//!
//! Subcommands map to the monitor's operations: `watch` polls on a
//! period, `check` runs a single poll (the entry point for external
//! schedulers such as cron), `report` and `test-email` drive the
//! notifier directly, and `history` prints the recorded log.
//!
//! Secrets are never taken on the command line:
//!
//! | Variable        | Used by           |
//! |-----------------|-------------------|
//! | `IDRAC_PASSWORD`| BMC basic auth    |
//! | `SMTP_PASSWORD` | SMTP relay login  |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use thermwatch::{
    AlertOutcome, DisabledNotifier, EmailConfig, EmailNotifier, HistoryStore, Monitor, Notifier,
    StateStore, Thresholds,
};
use thermwatch_redfish::RedfishClient;

#[derive(Parser, Debug)]
#[command(name = "thermwatch")]
#[command(about = "Edge-triggered thermal monitor and alerter for server BMCs")]
struct Args {
    /// BMC base URL, e.g. "https://10.0.0.120"
    #[arg(short, long)]
    endpoint: Option<String>,

    /// BMC username for basic authentication
    #[arg(short, long, default_value = "root")]
    username: String,

    /// Chassis identifier under /redfish/v1/Chassis/
    #[arg(long, default_value = "System.Embedded.1")]
    chassis: String,

    /// Calibration offset added to the raw sensor value, in Celsius
    #[arg(long, default_value_t = -62.0, allow_negative_numbers = true)]
    offset: f64,

    /// Warning threshold in Celsius
    #[arg(long, default_value_t = 25.0)]
    warning: f64,

    /// Critical threshold in Celsius
    #[arg(long, default_value_t = 30.0)]
    critical: f64,

    /// Sensor request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Path to the persisted alert state
    #[arg(long, default_value = "thermwatch_state.json")]
    state_file: PathBuf,

    /// Path to the persisted history log
    #[arg(long, default_value = "thermwatch_history.json")]
    history_file: PathBuf,

    /// SMTP relay host; notifications are disabled when unset
    #[arg(long)]
    smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, default_value_t = 587)]
    smtp_port: u16,

    /// SMTP username
    #[arg(long)]
    smtp_user: Option<String>,

    /// Sender address
    #[arg(long, default_value = "thermwatch@localhost")]
    from: String,

    /// Recipient address (repeatable)
    #[arg(long = "to")]
    recipients: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll continuously on a fixed period
    Watch {
        /// Seconds between polls
        #[arg(short, long, default_value_t = 60)]
        interval: u64,

        /// Also send an unconditional report every this many seconds
        #[arg(long)]
        report_every: Option<u64>,
    },

    /// Run one poll: record history and evaluate the alert latch
    Check {
        /// Also send an unconditional report after the poll
        #[arg(long)]
        report: bool,
    },

    /// Fetch a reading and send an unconditional report
    Report,

    /// Send a connectivity-test notification, bypassing sensor and state
    TestEmail,

    /// Print the recorded history, oldest first
    History {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thermwatch=info".into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::History { json } => print_history(&args, json).await,
        Command::TestEmail => {
            let monitor = build_monitor(&args)?;
            monitor.send_test().await?;
            println!("Test notification sent");
            Ok(())
        }
        Command::Report => {
            let monitor = build_monitor(&args)?;
            let reading = monitor.report().await?;
            println!(
                "Report sent: {:.1} C  {}",
                reading.temperature, reading.status
            );
            Ok(())
        }
        Command::Check { report } => {
            let monitor = build_monitor(&args)?;
            let outcome = monitor.tick().await?;

            let alert = match &outcome.alert {
                AlertOutcome::NotDue => "no alert due".to_string(),
                AlertOutcome::Sent => "alert sent".to_string(),
                AlertOutcome::Failed(reason) => format!("alert failed: {reason}"),
            };
            println!(
                "{:.1} C  {}  ({alert})",
                outcome.reading.temperature, outcome.reading.status
            );

            if report {
                monitor.report().await.context("Report delivery failed")?;
                println!("Report sent");
            }
            Ok(())
        }
        Command::Watch {
            interval,
            report_every,
        } => {
            let monitor = build_monitor(&args)?;
            monitor
                .run(
                    Duration::from_secs(interval),
                    report_every.map(Duration::from_secs),
                )
                .await;
            Ok(())
        }
    }
}

/// Assemble the monitor from CLI arguments and environment secrets.
fn build_monitor(args: &Args) -> Result<Monitor> {
    let Some(endpoint) = &args.endpoint else {
        bail!("--endpoint is required for this command");
    };

    let password = std::env::var("IDRAC_PASSWORD").unwrap_or_default();
    let source = RedfishClient::builder()
        .endpoint(endpoint)
        .credentials(&args.username, password)
        .chassis(&args.chassis)
        .calibration_offset(args.offset)
        .timeout(Duration::from_secs(args.timeout))
        .build();

    let thresholds = Thresholds {
        warning: args.warning,
        critical: args.critical,
    };

    let notifier: Box<dyn Notifier> = match &args.smtp_host {
        Some(smtp_host) => {
            if args.recipients.is_empty() {
                bail!("--to is required when an SMTP host is configured");
            }
            let config = EmailConfig {
                smtp_host: smtp_host.clone(),
                smtp_port: args.smtp_port,
                smtp_user: args.smtp_user.clone(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                from: args.from.clone(),
                recipients: args.recipients.clone(),
            };
            Box::new(EmailNotifier::new(config, thresholds, endpoint))
        }
        None => {
            tracing::warn!("No SMTP host configured; alerts will be logged only");
            Box::new(DisabledNotifier)
        }
    };

    let state = StateStore::open(&args.state_file)
        .with_context(|| format!("Opening state store {}", args.state_file.display()))?;
    let history = HistoryStore::open(&args.history_file)
        .with_context(|| format!("Opening history store {}", args.history_file.display()))?;

    Ok(Monitor::new(
        Box::new(source),
        notifier,
        state,
        history,
        thresholds,
    ))
}

/// Print the recorded history without touching the sensor.
async fn print_history(args: &Args, json: bool) -> Result<()> {
    let history = HistoryStore::open(&args.history_file)
        .with_context(|| format!("Opening history store {}", args.history_file.display()))?;
    let readings = history.list().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&readings)?);
        return Ok(());
    }

    if readings.is_empty() {
        println!("No readings recorded yet");
        return Ok(());
    }

    for reading in &readings {
        println!(
            "{}  {:>6.1} C  {}",
            reading.observed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            reading.temperature,
            reading.status.symbol()
        );
    }
    Ok(())
}

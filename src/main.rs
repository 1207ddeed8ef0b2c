use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::rolling;

use hrm_attendance::api::AttendanceService;
use hrm_attendance::api::attendance::HttpAttendanceService;
use hrm_attendance::auth::auth::{CredentialSource, StaticCredentials};
use hrm_attendance::config::Config;
use hrm_attendance::geolocation::{
    FixedPositionProvider, GeolocationProvider, PositionOptions,
};
use hrm_attendance::model::admin::DateRange;
use hrm_attendance::report::AdminAttendanceView;
use hrm_attendance::session::poller::spawn_history_poller;
use hrm_attendance::{AttendanceError, AttendanceSession, MarkOutcome};

#[derive(Parser)]
#[command(name = "hrm-attendance", about = "Mark and review geofenced attendance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture the device position and mark today's attendance
    Mark,
    /// Show attendance history and today's status
    History,
    /// Keep the history fresh until interrupted
    Watch,
    /// HR/Admin: per-employee attendance for a date range
    Report {
        /// First day, YYYY-MM-DD (default today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day, YYYY-MM-DD (default today)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(base_url = %config.api_base_url, zone = %config.zone.label, "Attendance client starting");

    let credentials: Arc<dyn CredentialSource> = Arc::new(
        StaticCredentials::new(config.access_token.clone()).with_employee_id(config.employee_id),
    );
    let service: Arc<dyn AttendanceService> = Arc::new(HttpAttendanceService::new(
        config.api_base_url.clone(),
        config.http_timeout,
        credentials.clone(),
    )?);

    match cli.command {
        Command::Report { from, to } => run_report(service, credentials, from, to).await,
        Command::Mark => {
            let session = build_session(&config, service, credentials);
            let result = run_mark(&session).await;
            session.teardown();
            result
        }
        Command::History => {
            let session = build_session(&config, service, credentials);
            let result = run_history(&session).await;
            session.teardown();
            result
        }
        Command::Watch => run_watch(build_session(&config, service, credentials), &config).await,
    }
}

fn build_session(
    config: &Config,
    service: Arc<dyn AttendanceService>,
    credentials: Arc<dyn CredentialSource>,
) -> Arc<AttendanceSession> {
    let provider: Arc<dyn GeolocationProvider> = match config.device_position {
        Some(position) => Arc::new(FixedPositionProvider::new(position)),
        None => Arc::new(FixedPositionProvider::denied()),
    };

    Arc::new(
        AttendanceSession::new(config.zone.clone(), provider, service, credentials)
            .with_location_options(PositionOptions {
                timeout: config.location_timeout,
                ..PositionOptions::default()
            }),
    )
}

async fn run_mark(session: &AttendanceSession) -> Result<()> {
    let position = match session.acquire_location().await {
        Ok(p) => p,
        Err(e) => bail!("{e}. Enable location and try again."),
    };
    println!(
        "Location: {:.5}, {:.5} (±{:.0} m)",
        position.latitude, position.longitude, position.accuracy_meters
    );

    match session.mark_attendance().await {
        Ok(MarkOutcome::Marked(receipt)) => println!("✅ {}", receipt.message),
        Ok(MarkOutcome::AlreadyMarked) => println!("✅ Already marked today"),
        Err(e @ AttendanceError::MalformedResponse(_)) => {
            error!(error = %e, "Unexpected response while marking attendance");
            return Err(e.into());
        }
        Err(e) => bail!("❌ {e}"),
    }

    print_statistics(session);
    Ok(())
}

async fn run_history(session: &AttendanceSession) -> Result<()> {
    session.refresh_history().await?;

    for record in session.history().unwrap_or_default() {
        println!(
            "{}  {:<8} {}  {}",
            record.date,
            record.status,
            record.marked_at.format("%H:%M:%S"),
            record.location_name.as_deref().unwrap_or("-")
        );
    }
    print_statistics(session);
    Ok(())
}

async fn run_watch(session: Arc<AttendanceSession>, config: &Config) -> Result<()> {
    let poller = spawn_history_poller(session.clone(), config.history_poll_interval);
    println!("Watching attendance history, Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    session.teardown();
    poller.await?;

    print_statistics(&session);
    Ok(())
}

async fn run_report(
    service: Arc<dyn AttendanceService>,
    credentials: Arc<dyn CredentialSource>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let range = DateRange {
        start: from.unwrap_or(today),
        end: to.unwrap_or(today),
    };
    if range.start > range.end {
        bail!("--from must not be after --to");
    }

    let report = AdminAttendanceView::new(service, credentials)
        .load(range)
        .await?;

    println!("Attendance {} to {}", range.start, range.end);
    for s in &report.summaries {
        println!(
            "{:<10} {:<24} total {:>3}  present {:>3}  absent {:>3}  rate {:>6.2}%{}",
            s.employee_code,
            s.employee_name,
            s.total_attendance,
            s.present_count,
            s.absent_count,
            s.attendance_rate,
            if s.tampered_records > 0 {
                format!("  ⚠ {} tampered", s.tampered_records)
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

fn print_statistics(session: &AttendanceSession) {
    let stats = session.statistics();
    println!(
        "Today: {}  Present days: {}  Rate: {}%",
        stats.today_status, stats.total_present, stats.attendance_rate
    );
}

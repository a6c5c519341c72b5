//! Attendance HTTP Server Binary
//!
//! This is the main entry point for the attendance dashboard REST API.
//! It loads configuration, opens the attendance log, sets up the HTTP router,
//! and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Read the default log (attendance/attendance_data.jsonl)
//! cargo run --bin attendance-server
//!
//! # Point at another log and zone
//! ATTENDANCE_DATA_PATH=/var/lib/gym/attendance.jsonl \
//!   ATTENDANCE_TIMEZONE=Europe/Berlin cargo run --bin attendance-server
//! ```
//!
//! # Environment Variables
//!
//! - `ATTENDANCE_CONFIG`: Path to a TOML configuration file
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `ATTENDANCE_DATA_PATH`: JSON-lines attendance log
//! - `ATTENDANCE_TIMEZONE`: Reference IANA zone (default: Europe/Zurich)
//! - `ATTENDANCE_CACHE_TTL_SECS`: Result cache TTL (default: 300)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use gym_attendance::config::AppConfig;
use gym_attendance::db::RepositoryFactory;
use gym_attendance::http::{create_router, AppState};
use gym_attendance::services::{DashboardService, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; `log` records from the library are bridged in
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting attendance HTTP server");

    let config = AppConfig::load()?;
    let analytics = config.analytics.to_config()?;
    info!(
        "Analytics: {} min slots, {}-week lookback, cache TTL {}s, zone {}",
        analytics.granularity_minutes,
        analytics.lookback.num_weeks(),
        analytics.cache_ttl.num_seconds(),
        analytics.timezone.name()
    );

    let repository = RepositoryFactory::create(&config.repository)?;
    info!("Data source: {}", repository.describe());
    if !repository.health_check().await? {
        tracing::warn!("Data source is not readable yet; requests will fail until it is");
    }

    // Create application state
    let service = DashboardService::new(repository, analytics, Arc::new(SystemClock));
    let state = AppState::new(Arc::new(service));

    // Create router with all endpoints
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::Context;
use camsnap::capture::run_capture_loop;
use camsnap::config::Config;
use camsnap::constants::DEFAULT_FAILURE_COOLDOWN;
use camsnap::server::{serve, ServerState};
use camsnap::session::session::CameraSession;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::new();
    info!("Loaded configuration: {}", config);

    std::fs::create_dir_all(&config.storage.save_dir).with_context(|| {
        format!("Failed to create save directory {}", config.storage.save_dir)
    })?;

    let mut session =
        CameraSession::new(config.clone()).context("Failed to build camera session")?;
    session
        .login()
        .await
        .context("Initial camera login failed")?;

    let state = Arc::new(ServerState {
        snapshot_path: session.snapshot_path(),
        refresh_interval_ms: config.server.refresh_interval_ms,
    });

    let interval = Duration::from_secs(config.camera.poll_interval);
    let cooldown = Duration::from_secs(DEFAULT_FAILURE_COOLDOWN);
    tokio::spawn(run_capture_loop(session, interval, cooldown));
    info!("Capture loop started");

    serve(state, config.server.port).await
}

mod config;
mod game;
mod live;
mod metrics;
mod util;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::game::constants::physics;
use crate::live::manager::SessionManager;
use crate::live::protocol::InputEvent;
use crate::live::publisher::ChannelPublisher;
use crate::live::session::SessionId;
use crate::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Flappy Live Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ServerConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: max_sessions={}, demo_sessions={}",
        config.max_sessions, config.demo_sessions
    );

    // Initialize metrics
    let metrics = Arc::new(Metrics::new());

    let metrics_clone = metrics.clone();
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = metrics::start_metrics_server(metrics_clone, metrics_port).await {
            error!("Metrics server error: {}", e);
        }
    });

    // Initialize shared state
    let manager = Arc::new(RwLock::new(SessionManager::new(
        config.max_sessions,
        metrics.clone(),
    )));

    // Self-driving sessions so an idle server still exercises the full
    // bind/tick/publish path.
    for index in 0..config.demo_sessions {
        let id = start_demo_session(&manager, index).await?;
        info!("Demo session {} bound as {}", index, id);
    }

    // Periodic stats logging
    let stats_manager = manager.clone();
    let stats_metrics = metrics.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let sessions = stats_manager.read().await.session_count();
            info!(
                "Stats: {} session(s), {} ticks, {} flaps, {} rounds ended, tick p95 {}us",
                sessions,
                stats_metrics.tick_count.load(Ordering::Relaxed),
                stats_metrics.flaps.load(Ordering::Relaxed),
                stats_metrics.rounds_total(),
                stats_metrics.tick_time_p95_us.load(Ordering::Relaxed),
            );
        }
    });

    info!("Server ready, {} Hz tick", physics::TICK_RATE);

    // Run until the shutdown signal arrives
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");

    // Cleanup
    manager.write().await.shutdown_all();
    info!("Server stopped");

    Ok(())
}

/// Bind one session and give it a synthetic player plus a frame drain.
async fn start_demo_session(
    manager: &Arc<RwLock<SessionManager>>,
    index: usize,
) -> anyhow::Result<SessionId> {
    let (publisher, mut frames) = ChannelPublisher::pair();
    let id = manager.write().await.bind(Arc::new(publisher))?;

    // Drain frames the way a display would, logging one every ten seconds.
    tokio::spawn(async move {
        let mut received: u64 = 0;
        while let Some(frame) = frames.recv().await {
            received += 1;
            if received % (physics::TICK_RATE as u64 * 10) == 0 {
                match serde_json::to_string(&frame) {
                    Ok(json) => debug!("demo {}: frame {}: {}", index, received, json),
                    Err(e) => debug!("demo {}: frame {} unserializable: {}", index, received, e),
                }
            }
        }
        debug!("demo {}: display channel closed", index);
    });

    // Synthetic spacebar presses at a jittered cadence, enough to keep the
    // bird airborne some of the time and crashing the rest.
    let driver_manager = manager.clone();
    tokio::spawn(async move {
        loop {
            let pause = rand::thread_rng().gen_range(250..1500);
            tokio::time::sleep(Duration::from_millis(pause)).await;

            let result = driver_manager
                .read()
                .await
                .handle_event(id, &InputEvent::key_press(" "))
                .await;
            if result.is_err() {
                debug!("demo {}: session gone, driver stopping", index);
                break;
            }
        }
    });

    Ok(id)
}

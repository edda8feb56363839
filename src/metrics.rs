//! Prometheus-compatible metrics endpoint
//!
//! Exposes simulation server metrics in Prometheus format for dashboards.
//! Default endpoint: http://localhost:9090/metrics

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Metrics registry shared by every session
#[derive(Debug)]
pub struct Metrics {
    // Session lifecycle
    pub sessions_active: AtomicU64,
    pub sessions_opened: AtomicU64,
    pub sessions_closed: AtomicU64,

    // Gameplay
    pub flaps: AtomicU64,
    pub round_collisions: AtomicU64,
    pub round_falls: AtomicU64,

    // Render boundary
    pub frames_published: AtomicU64,
    pub publish_failures: AtomicU64,

    // Tick timing (microseconds)
    pub tick_count: AtomicU64,
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sessions_active: AtomicU64::new(0),
            sessions_opened: AtomicU64::new(0),
            sessions_closed: AtomicU64::new(0),
            flaps: AtomicU64::new(0),
            round_collisions: AtomicU64::new(0),
            round_falls: AtomicU64::new(0),
            frames_published: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(1024)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        // Keep the last 1024 samples
        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > 1024 {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us
                .store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us
                .store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Total rounds ended, either way
    pub fn rounds_total(&self) -> u64 {
        self.round_collisions.load(Ordering::Relaxed) + self.round_falls.load(Ordering::Relaxed)
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        // Session metrics
        metric!("flappy_live_sessions_active", "Currently bound sessions", "gauge",
            self.sessions_active.load(Ordering::Relaxed));
        metric!("flappy_live_sessions_opened_total", "Sessions ever bound", "counter",
            self.sessions_opened.load(Ordering::Relaxed));
        metric!("flappy_live_sessions_closed_total", "Sessions ever closed", "counter",
            self.sessions_closed.load(Ordering::Relaxed));

        // Gameplay metrics
        metric!("flappy_live_flaps_total", "Flap impulses applied", "counter",
            self.flaps.load(Ordering::Relaxed));
        metric!("flappy_live_rounds_collision_total", "Rounds ended by pipe collision", "counter",
            self.round_collisions.load(Ordering::Relaxed));
        metric!("flappy_live_rounds_fall_total", "Rounds ended below the playfield", "counter",
            self.round_falls.load(Ordering::Relaxed));
        metric!("flappy_live_rounds_total", "Rounds ended, either way", "counter",
            self.rounds_total());

        // Render boundary
        metric!("flappy_live_frames_published_total", "Frames delivered to displays", "counter",
            self.frames_published.load(Ordering::Relaxed));
        metric!("flappy_live_publish_failures_total", "Frames dropped on a closed display", "counter",
            self.publish_failures.load(Ordering::Relaxed));

        // Tick timing
        metric!("flappy_live_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));
        metric!("flappy_live_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("flappy_live_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("flappy_live_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("flappy_live_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));

        metric!("flappy_live_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics (alternative for direct API access)
    pub fn to_json(&self) -> String {
        format!(
            r#"{{
  "sessions": {{
    "active": {},
    "opened": {},
    "closed": {}
  }},
  "game": {{
    "flaps": {},
    "rounds_collision": {},
    "rounds_fall": {}
  }},
  "frames": {{
    "published": {},
    "publish_failures": {}
  }},
  "performance": {{
    "tick_count": {},
    "tick_time_us": {},
    "tick_time_p95_us": {},
    "tick_time_p99_us": {},
    "tick_time_max_us": {}
  }},
  "uptime_seconds": {}
}}"#,
            self.sessions_active.load(Ordering::Relaxed),
            self.sessions_opened.load(Ordering::Relaxed),
            self.sessions_closed.load(Ordering::Relaxed),
            self.flaps.load(Ordering::Relaxed),
            self.round_collisions.load(Ordering::Relaxed),
            self.round_falls.load(Ordering::Relaxed),
            self.frames_published.load(Ordering::Relaxed),
            self.publish_failures.load(Ordering::Relaxed),
            self.tick_count.load(Ordering::Relaxed),
            self.tick_time_us.load(Ordering::Relaxed),
            self.tick_time_p95_us.load(Ordering::Relaxed),
            self.tick_time_p99_us.load(Ordering::Relaxed),
            self.tick_time_max_us.load(Ordering::Relaxed),
            self.uptime_seconds(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);

                    let response = if request.starts_with("GET /metrics/json")
                        || request.starts_with("GET /json")
                    {
                        let body = metrics.to_json();
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        )
                    } else if request.starts_with("GET /metrics") {
                        let body = metrics.to_prometheus();
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; version=0.0.4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        )
                    } else if request.starts_with("GET /health") || request.starts_with("GET /") {
                        let body = "healthy";
                        format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        )
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string()
                    };

                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.sessions_active.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.rounds_total(), 0);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = Metrics::new();

        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 100);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) > 0);
        assert!(metrics.tick_time_p99_us.load(Ordering::Relaxed) > 0);
        assert!(
            metrics.tick_time_max_us.load(Ordering::Relaxed)
                >= metrics.tick_time_p99_us.load(Ordering::Relaxed)
        );
    }

    #[test]
    fn test_rounds_total_sums_both_outcomes() {
        let metrics = Metrics::new();
        metrics.round_collisions.store(3, Ordering::Relaxed);
        metrics.round_falls.store(2, Ordering::Relaxed);
        assert_eq!(metrics.rounds_total(), 5);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.sessions_active.store(4, Ordering::Relaxed);
        metrics.flaps.store(120, Ordering::Relaxed);
        metrics.round_collisions.store(7, Ordering::Relaxed);

        let output = metrics.to_prometheus();

        assert!(output.contains("flappy_live_sessions_active 4"));
        assert!(output.contains("flappy_live_flaps_total 120"));
        assert!(output.contains("flappy_live_rounds_collision_total 7"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_json_format() {
        let metrics = Metrics::new();
        metrics.sessions_active.store(2, Ordering::Relaxed);

        let output = metrics.to_json();

        assert!(output.contains("\"active\": 2"));
        assert!(output.contains("\"sessions\":"));
        assert!(output.contains("\"performance\":"));
    }

    #[test]
    fn test_uptime() {
        let metrics = Metrics::new();
        std::thread::sleep(Duration::from_millis(10));
        let _ = metrics.uptime_seconds();
    }
}

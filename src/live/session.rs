//! Per-connection driver: one update task per live client.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;
use uuid::Uuid;

use crate::game::constants::physics;
use crate::game::state::{GameState, RoundEnd};
use crate::live::protocol::{FrameSnapshot, InputEvent};
use crate::live::publisher::Publisher;
use crate::metrics::Metrics;

pub type SessionId = Uuid;

/// One connected client: a lazily created world and the task driving it.
///
/// The world is created on the first bind and kept for the session's whole
/// life; round resets replace its contents, never the object. The update
/// task exists exactly while the session is bound, and aborting it is the
/// only way ticks stop.
pub struct Session {
    id: SessionId,
    world: Option<Arc<RwLock<GameState>>>,
    task: Option<JoinHandle<()>>,
    publisher: Arc<dyn Publisher>,
    metrics: Arc<Metrics>,
}

impl Session {
    pub fn new(publisher: Arc<dyn Publisher>, metrics: Arc<Metrics>) -> Self {
        Self {
            id: Uuid::new_v4(),
            world: None,
            task: None,
            publisher,
            metrics,
        }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether the update task is currently scheduled.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Shared handle to this session's world, if one was bound.
    pub fn world(&self) -> Option<Arc<RwLock<GameState>>> {
        self.world.clone()
    }

    /// Ensure the world exists and the update loop is running.
    ///
    /// Binding an already-bound session changes nothing; the existing world
    /// and task are kept.
    pub fn bind(&mut self) {
        let world = self
            .world
            .get_or_insert_with(|| Arc::new(RwLock::new(GameState::new())))
            .clone();

        if self.task.is_some() {
            return;
        }

        let id = self.id;
        let publisher = self.publisher.clone();
        let metrics = self.metrics.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_micros(physics::TICK_DURATION_MICROS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!("session {id}: update loop started at {} Hz", physics::TICK_RATE);

            loop {
                ticker.tick().await;

                let started = Instant::now();
                let (outcome, frame) = {
                    let mut world = world.write().await;
                    let outcome = world.tick(physics::DT);
                    (outcome, FrameSnapshot::from_state(&world))
                };
                metrics.record_tick_time(started.elapsed());

                match outcome {
                    Some(RoundEnd::Collision) => {
                        metrics.round_collisions.fetch_add(1, Ordering::Relaxed);
                        debug!("session {id}: round ended on collision");
                    }
                    Some(RoundEnd::OutOfBounds) => {
                        metrics.round_falls.fetch_add(1, Ordering::Relaxed);
                        debug!("session {id}: round ended below the playfield");
                    }
                    None => {}
                }

                // A failed publish is not retried; the close path stops the
                // loop, usually within one tick of the connection dropping.
                match publisher.publish(&frame) {
                    Ok(()) => {
                        metrics.frames_published.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        metrics.publish_failures.fetch_add(1, Ordering::Relaxed);
                        debug!("session {id}: publish failed ({e}), awaiting close");
                    }
                }
            }
        }));
    }

    /// Feed one inbound client event into the world.
    ///
    /// Only activation events reach the bird; everything else is dropped
    /// here. Safe to call at any time, including between a bind and the
    /// first tick, or on a session that was never bound.
    pub async fn handle_event(&self, event: &InputEvent) {
        if !event.is_activation() {
            return;
        }
        if let Some(world) = &self.world {
            world.write().await.flap();
            self.metrics.flaps.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Stop the update loop. Idempotent; the world is retained.
    ///
    /// No tick runs after this returns: the task is aborted at its next
    /// await point, and every await it has sits before the tick call.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("session {}: update loop cancelled", self.id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

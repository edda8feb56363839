//! Registry of live sessions, one per connected client.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use hashbrown::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::game::state::GameState;
use crate::live::protocol::InputEvent;
use crate::live::publisher::Publisher;
use crate::live::session::{Session, SessionId};
use crate::metrics::Metrics;

/// Registry errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("session limit of {0} reached")]
    AtCapacity(usize),
    #[error("unknown session {0}")]
    NotFound(SessionId),
}

/// Owns every live session and routes lifecycle calls to them.
///
/// Sessions never share state with each other; the registry is the only
/// structure that touches more than one at a time.
pub struct SessionManager {
    sessions: HashMap<SessionId, Session>,
    max_sessions: usize,
    metrics: Arc<Metrics>,
}

impl SessionManager {
    pub fn new(max_sessions: usize, metrics: Arc<Metrics>) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions,
            metrics,
        }
    }

    /// Open a session for a newly connected client and start its loop.
    pub fn bind(&mut self, publisher: Arc<dyn Publisher>) -> Result<SessionId, SessionError> {
        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::AtCapacity(self.max_sessions));
        }

        let mut session = Session::new(publisher, self.metrics.clone());
        session.bind();
        let id = session.id();
        self.sessions.insert(id, session);

        self.metrics.sessions_opened.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .sessions_active
            .store(self.sessions.len() as u64, Ordering::Relaxed);
        info!("session {} bound ({} active)", id, self.sessions.len());

        Ok(id)
    }

    /// Route one client event to its session.
    pub async fn handle_event(
        &self,
        id: SessionId,
        event: &InputEvent,
    ) -> Result<(), SessionError> {
        let session = self.sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        session.handle_event(event).await;
        Ok(())
    }

    /// Stop and discard a session. Closing an unknown id is a no-op.
    pub fn close(&mut self, id: SessionId) -> bool {
        match self.sessions.remove(&id) {
            Some(mut session) => {
                session.close();
                self.metrics.sessions_closed.fetch_add(1, Ordering::Relaxed);
                self.metrics
                    .sessions_active
                    .store(self.sessions.len() as u64, Ordering::Relaxed);
                info!("session {} closed ({} active)", id, self.sessions.len());
                true
            }
            None => false,
        }
    }

    /// Shared handle to a session's world, for stats and tests.
    pub fn world(&self, id: SessionId) -> Option<Arc<RwLock<GameState>>> {
        self.sessions.get(&id).and_then(|s| s.world())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Stop every session, for server shutdown.
    pub fn shutdown_all(&mut self) {
        let count = self.sessions.len();
        for (_, mut session) in self.sessions.drain() {
            session.close();
            self.metrics.sessions_closed.fetch_add(1, Ordering::Relaxed);
        }
        self.metrics.sessions_active.store(0, Ordering::Relaxed);
        if count > 0 {
            info!("shut down {} session(s)", count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::physics::{self, FLAP_IMPULSE};
    use crate::live::publisher::ChannelPublisher;
    use std::time::Duration;

    const TICK: Duration = Duration::from_micros(physics::TICK_DURATION_MICROS);

    fn test_manager(max_sessions: usize) -> SessionManager {
        SessionManager::new(max_sessions, Arc::new(Metrics::new()))
    }

    fn bind_one(manager: &mut SessionManager) -> SessionId {
        let (publisher, receiver) = ChannelPublisher::pair();
        // Frames are not drained in these tests; the channel is unbounded.
        std::mem::forget(receiver);
        manager.bind(Arc::new(publisher)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_bind_creates_running_sessions() {
        let mut manager = test_manager(8);

        let a = bind_one(&mut manager);
        let b = bind_one(&mut manager);

        assert_ne!(a, b);
        assert_eq!(manager.session_count(), 2);

        tokio::time::sleep(3 * TICK).await;
        assert!(manager.world(a).unwrap().read().await.ticks() >= 3);
        assert!(manager.world(b).unwrap().read().await.ticks() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_limit() {
        let mut manager = test_manager(2);
        bind_one(&mut manager);
        bind_one(&mut manager);

        let (publisher, _receiver) = ChannelPublisher::pair();
        let result = manager.bind(Arc::new(publisher));
        assert!(matches!(result, Err(SessionError::AtCapacity(2))));
        assert_eq!(manager.session_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_only_reach_their_session() {
        let mut manager = test_manager(8);
        let a = bind_one(&mut manager);
        let b = bind_one(&mut manager);

        manager
            .handle_event(a, &InputEvent::key_press(" "))
            .await
            .unwrap();

        let world_a = manager.world(a).unwrap();
        let world_b = manager.world(b).unwrap();
        assert_eq!(world_a.read().await.bird.velocity, FLAP_IMPULSE);
        assert_eq!(world_b.read().await.bird.velocity, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_for_unknown_session_is_an_error() {
        let manager = test_manager(8);
        let result = manager
            .handle_event(SessionId::new_v4(), &InputEvent::touch_start())
            .await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_the_session() {
        let mut manager = test_manager(8);
        let id = bind_one(&mut manager);

        assert!(manager.close(id));
        assert_eq!(manager.session_count(), 0);
        assert!(manager.world(id).is_none());

        // Closing again, or closing a never-bound id, is a no-op.
        assert!(!manager.close(id));
        assert!(!manager.close(SessionId::new_v4()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_frees_a_capacity_slot() {
        let mut manager = test_manager(1);
        let id = bind_one(&mut manager);
        manager.close(id);

        let replacement = bind_one(&mut manager);
        assert_ne!(replacement, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_all() {
        let mut manager = test_manager(8);
        for _ in 0..3 {
            bind_one(&mut manager);
        }

        manager.shutdown_all();

        assert_eq!(manager.session_count(), 0);
        assert_eq!(manager.metrics.sessions_active.load(Ordering::Relaxed), 0);
        assert_eq!(manager.metrics.sessions_closed.load(Ordering::Relaxed), 3);
    }
}

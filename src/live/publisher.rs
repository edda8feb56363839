//! Render boundary: where post-tick frames leave the simulation.

use tokio::sync::mpsc;

use crate::live::protocol::FrameSnapshot;

/// Publish failures.
///
/// The update loop never retries a failed publish; teardown is the
/// connection close path's job, not the loop's.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    #[error("display channel closed")]
    Closed,
}

/// Consumes one frame per tick on behalf of the rendering collaborator.
///
/// Implementations must be cheap and non-blocking; the update loop calls
/// `publish` inline between ticks.
pub trait Publisher: Send + Sync {
    fn publish(&self, frame: &FrameSnapshot) -> Result<(), PublishError>;
}

/// Publisher backed by an unbounded tokio channel.
///
/// The display side holds the receiving end and drains frames at its own
/// pace. Once the receiver is dropped every publish reports `Closed`.
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<FrameSnapshot>,
}

impl ChannelPublisher {
    /// Create a publisher plus the receiver handed to the display side.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<FrameSnapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&self, frame: &FrameSnapshot) -> Result<(), PublishError> {
        self.sender
            .send(frame.clone())
            .map_err(|_| PublishError::Closed)
    }
}

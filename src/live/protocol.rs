//! Boundary types: inbound input events and outbound frame snapshots.

use serde::{Deserialize, Serialize};

use crate::game::bird::Bird;
use crate::game::pipe::Pipe;
use crate::game::state::GameState;
use crate::util::rect::Rect;

/// The key that triggers a flap
pub const ACTIVATION_KEY: &str = " ";

/// One inbound client event.
///
/// Mirrors the browser-side shape `{ kind, detail }`. Deserialization is
/// deliberately forgiving: unknown kinds decode to [`InputEvent::Ignored`]
/// whatever their `detail` carries, and a missing or malformed `detail` on a
/// known kind decodes with its fields unset. Nothing the display side sends
/// is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum InputEvent {
    /// Keyboard press; only [`ACTIVATION_KEY`] flaps
    Keypress { key: Option<String> },
    /// Touch gesture; flaps when the touch flag is set
    Touchstart { touch: Option<bool> },
    /// Any other event kind
    Ignored,
}

impl<'de> Deserialize<'de> for InputEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawEvent {
            kind: String,
            // Arbitrary content: unknown kinds may carry any payload.
            #[serde(default)]
            detail: Option<serde_json::Value>,
        }

        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct RawDetail {
            key: Option<String>,
            touch: Option<bool>,
        }

        let raw = RawEvent::deserialize(deserializer)?;
        let detail = raw
            .detail
            .and_then(|value| serde_json::from_value::<RawDetail>(value).ok())
            .unwrap_or_default();

        Ok(match raw.kind.as_str() {
            "keypress" => InputEvent::Keypress { key: detail.key },
            "touchstart" => InputEvent::Touchstart { touch: detail.touch },
            _ => InputEvent::Ignored,
        })
    }
}

impl InputEvent {
    /// Spacebar press, the common case in tests and synthetic drivers.
    pub fn key_press(key: &str) -> Self {
        InputEvent::Keypress {
            key: Some(key.to_string()),
        }
    }

    pub fn touch_start() -> Self {
        InputEvent::Touchstart { touch: Some(true) }
    }

    /// Whether this event maps onto the flap impulse.
    pub fn is_activation(&self) -> bool {
        match self {
            InputEvent::Keypress { key } => key.as_deref() == Some(ACTIVATION_KEY),
            InputEvent::Touchstart { touch } => *touch == Some(true),
            InputEvent::Ignored => false,
        }
    }
}

/// Bird state as the renderer needs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdSnapshot {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Tilt in degrees, clamped to ±40
    pub rotation: f32,
}

impl BirdSnapshot {
    pub fn from_bird(bird: &Bird) -> Self {
        Self {
            x: bird.x,
            y: bird.y,
            width: bird.width,
            height: bird.height,
            rotation: bird.tilt_degrees(),
        }
    }
}

/// One pipe as its two drawable segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeSnapshot {
    pub upper: Rect,
    pub lower: Rect,
}

impl PipeSnapshot {
    pub fn from_pipe(pipe: &Pipe) -> Self {
        Self {
            upper: pipe.upper_bounds(),
            lower: pipe.lower_bounds(),
        }
    }
}

/// Everything the renderer needs to draw one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub bird: BirdSnapshot,
    pub pipes: Vec<PipeSnapshot>,
}

impl FrameSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            tick: state.ticks(),
            bird: BirdSnapshot::from_bird(&state.bird),
            pipes: state.pipes.iter().map(PipeSnapshot::from_pipe).collect(),
        }
    }
}

//! The player-controlled bird: gravity integration and flap impulses.

use crate::game::constants::{bird, physics, playfield, render};
use crate::util::rect::Rect;

/// Bird state
///
/// Horizontal position is fixed for the whole round; only `y` and the
/// vertical velocity evolve. The collision box is `bounds()`, computed on
/// demand rather than stored.
#[derive(Debug, Clone)]
pub struct Bird {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical velocity in units/s, positive is up
    pub velocity: f32,
}

impl Bird {
    pub fn new() -> Self {
        Self {
            x: bird::SPAWN_X,
            y: bird::SPAWN_Y,
            width: bird::WIDTH,
            height: bird::HEIGHT,
            velocity: 0.0,
        }
    }

    /// Advance the bird by one timestep: apply gravity, then move.
    ///
    /// The bird is clamped at the playfield ceiling with its velocity
    /// zeroed. There is no floor clamp; falling below the playfield is a
    /// round-ending condition detected by the world, not here.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += physics::GRAVITY * dt;
        self.y += self.velocity * dt;

        if self.y > playfield::HEIGHT {
            self.y = playfield::HEIGHT;
            self.velocity = 0.0;
        }
    }

    /// Apply the flap impulse. Unconditional and last-write-wins: flapping
    /// twice before the next integration is the same as flapping once.
    pub fn flap(&mut self) {
        self.velocity = physics::FLAP_IMPULSE;
    }

    /// Y coordinate of the bird's top edge
    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Current collision box
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Render tilt hint in degrees: climbing tilts up, diving tilts down,
    /// clamped to ±40°.
    pub fn tilt_degrees(&self) -> f32 {
        (self.velocity / render::TILT_VELOCITY_DIVISOR)
            .clamp(-render::MAX_TILT_DEGREES, render::MAX_TILT_DEGREES)
    }
}

impl Default for Bird {
    fn default() -> Self {
        Self::new()
    }
}

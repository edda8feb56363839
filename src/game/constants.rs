/// Playfield dimensions, shared verbatim with the rendering boundary
pub mod playfield {
    /// Playfield width in units
    pub const WIDTH: f32 = 420.0;
    /// Playfield height in units (y axis points up, origin bottom-left)
    pub const HEIGHT: f32 = 640.0;
}

/// Physics constants - world units are CSS pixels, 50 px per metre
pub mod physics {
    /// Gravity acceleration in units/s² (-9.8 m/s² at 50 units per metre)
    pub const GRAVITY: f32 = -9.8 * 50.0;
    /// Upward velocity applied by one flap, units/s (6 m/s at 50 units per metre)
    pub const FLAP_IMPULSE: f32 = 6.0 * 50.0;
    /// Simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Tick duration in microseconds
    pub const TICK_DURATION_MICROS: u64 = 1_000_000 / TICK_RATE as u64;
}

/// Bird dimensions and spawn placement
pub mod bird {
    /// Collision box width
    pub const WIDTH: f32 = 34.0;
    /// Collision box height
    pub const HEIGHT: f32 = 24.0;
    /// Fixed horizontal spawn position
    pub const SPAWN_X: f32 = 30.0;
    /// Vertical spawn position (mid-playfield)
    pub const SPAWN_Y: f32 = super::playfield::HEIGHT / 2.0;
}

/// Pipe geometry and movement
pub mod pipe {
    /// Width of each pipe segment
    pub const WIDTH: f32 = 44.0;
    /// Height of each pipe segment (tall enough to always reach off-screen)
    pub const HEIGHT: f32 = 700.0;
    /// Half the vertical gap between the two segments
    pub const HALF_GAP: f32 = 100.0;
    /// Leftward scroll speed in units/s
    pub const SPEED: f32 = 100.0;
    /// Number of pipes alive per world
    pub const COUNT: usize = 2;
    /// Horizontal spread of the respawn jitter
    pub const RESPAWN_JITTER: f32 = 10.0;
    /// Scale applied to the vertical gap-centre jitter draw
    pub const VERTICAL_JITTER_SCALE: f32 = 0.5;
}

/// Render hint constants consumed by the display side
pub mod render {
    /// Maximum bird tilt in degrees (either direction)
    pub const MAX_TILT_DEGREES: f32 = 40.0;
    /// Velocity units per degree of tilt
    pub const TILT_VELOCITY_DIVISOR: f32 = 20.0;
}

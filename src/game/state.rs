//! Per-session world state and the fixed-timestep round logic.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game::bird::Bird;
use crate::game::constants::{pipe, playfield};
use crate::game::pipe::Pipe;

/// Why a round ended. Both outcomes trigger the same full reset; the
/// distinction only feeds logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    /// The bird hit a pipe segment
    Collision,
    /// The bird fell below the playfield
    OutOfBounds,
}

/// One client's world: a bird, a fixed set of pipes, and the session's
/// random stream.
///
/// The pipe list is ordered at construction and never re-sorted. The random
/// stream is owned here and lent to pipes on the tick path, so all placement
/// jitter comes from a single sequence that is reproducible under a fixed
/// seed and survives resets unreseeded.
#[derive(Debug)]
pub struct GameState {
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    rng: StdRng,
    ticks: u64,
}

impl GameState {
    /// World with an entropy-seeded stream, already reset to spawn state.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// World with a fixed seed; placement jitter becomes reproducible.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut state = Self {
            bird: Bird::new(),
            pipes: Vec::with_capacity(pipe::COUNT),
            rng,
            ticks: 0,
        };
        state.reset();
        state
    }

    /// Total ticks simulated since construction. Survives resets.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance everything by one timestep.
    ///
    /// Order matters: the bird integrates first, then each pipe advances and
    /// is collision-checked in list order. The first collision resets the
    /// world immediately; later pipes do not advance on that tick. Only when
    /// every pipe was processed without a hit is the fall-out check applied,
    /// so a tick that both collides and falls out counts as a collision.
    pub fn tick(&mut self, dt: f32) -> Option<RoundEnd> {
        self.ticks += 1;

        self.bird.integrate(dt);
        let bird_bounds = self.bird.bounds();

        let mut outcome = None;
        for pipe in self.pipes.iter_mut() {
            pipe.advance(dt, &mut self.rng);
            if pipe.collides_with(&bird_bounds) {
                outcome = Some(RoundEnd::Collision);
                break;
            }
        }

        if outcome.is_none() && self.bird.top() < 0.0 {
            outcome = Some(RoundEnd::OutOfBounds);
        }

        if outcome.is_some() {
            self.reset();
        }
        outcome
    }

    /// Rebuild the round: fresh bird at spawn, fresh pipes at their slots.
    ///
    /// Pipes are spaced evenly across the playfield, the last one starting
    /// at the right edge. The random stream carries over untouched.
    pub fn reset(&mut self) {
        self.bird = Bird::new();
        self.pipes.clear();
        for slot in 0..pipe::COUNT {
            let x = playfield::WIDTH * (slot + 1) as f32 / pipe::COUNT as f32;
            self.pipes.push(Pipe::new(x, playfield::HEIGHT / 2.0));
        }
    }

    /// Apply the flap impulse to the bird.
    pub fn flap(&mut self) {
        self.bird.flap();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

//! Scrolling pipe obstacles: a pair of vertical segments with a gap.

use rand::Rng;

use crate::game::constants::{pipe, playfield};
use crate::util::rect::Rect;

/// One pipe obstacle.
///
/// `y` is the centre of the passable gap; the two solid segments are derived
/// from it on demand and never stored. A pipe is recycled in place when it
/// scrolls off the left edge, so the same object lives for the whole session.
#[derive(Debug, Clone)]
pub struct Pipe {
    pub x: f32,
    /// Vertical centre of the gap
    pub y: f32,
    /// Half the gap height
    pub half_gap: f32,
    pub width: f32,
    pub height: f32,
}

impl Pipe {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            half_gap: pipe::HALF_GAP,
            width: pipe::WIDTH,
            height: pipe::HEIGHT,
        }
    }

    /// X coordinate of the right edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge of the upper segment
    #[inline]
    pub fn gap_top(&self) -> f32 {
        self.y + self.half_gap
    }

    /// Top edge of the lower segment
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.y - self.half_gap
    }

    /// Solid segment above the gap
    pub fn upper_bounds(&self) -> Rect {
        Rect::new(self.x, self.gap_top(), self.width, self.height)
    }

    /// Solid segment below the gap
    pub fn lower_bounds(&self) -> Rect {
        Rect::new(
            self.x,
            self.gap_bottom() - self.height,
            self.width,
            self.height,
        )
    }

    /// True if either segment overlaps the given box.
    pub fn collides_with(&self, other: &Rect) -> bool {
        self.upper_bounds().intersects(other) || self.lower_bounds().intersects(other)
    }

    /// Scroll left by one timestep, recycling once fully off-screen.
    pub fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.x -= pipe::SPEED * dt;

        if self.right() < 0.0 {
            self.reposition(rng);
        }
    }

    /// Respawn just past the right edge with a jittered gap centre.
    ///
    /// Draw order is part of the worlds' deterministic stream: the x jitter
    /// in `[0, 1)` comes first, then the vertical jitter in `[-1, 1)`.
    pub fn reposition<R: Rng>(&mut self, rng: &mut R) {
        let jitter_x = rng.gen::<f32>();
        let jitter_v = rng.gen_range(-1.0f32..1.0);

        self.x = playfield::WIDTH + jitter_x * pipe::RESPAWN_JITTER;
        self.y = playfield::HEIGHT / 2.0
            + (playfield::HEIGHT / 2.0) * (jitter_v * pipe::VERTICAL_JITTER_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::physics::DT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_new_uses_default_geometry() {
        let p = Pipe::new(210.0, 320.0);
        assert_eq!(p.half_gap, 100.0);
        assert_eq!(p.width, 44.0);
        assert_eq!(p.height, 700.0);
    }

    #[test]
    fn test_segment_bounds() {
        let p = Pipe::new(210.0, 320.0);

        let upper = p.upper_bounds();
        assert_eq!(upper, Rect::new(210.0, 420.0, 44.0, 700.0));

        let lower = p.lower_bounds();
        assert_eq!(lower, Rect::new(210.0, -480.0, 44.0, 700.0));

        // The gap itself is open: 220..420 at this centre.
        assert_eq!(p.gap_bottom(), 220.0);
        assert_eq!(p.gap_top(), 420.0);
    }

    #[test]
    fn test_advance_scrolls_left() {
        let mut rng = seeded_rng();
        let mut p = Pipe::new(210.0, 320.0);

        p.advance(DT, &mut rng);

        assert!((p.x - (210.0 - 100.0 * DT)).abs() < 1e-4);
        assert_eq!(p.y, 320.0, "gap centre unchanged while on-screen");
    }

    #[test]
    fn test_recycles_once_fully_off_screen() {
        let mut rng = seeded_rng();
        let mut p = Pipe::new(-100.0, 320.0);
        assert!(p.right() < 0.0);

        p.advance(DT, &mut rng);

        assert!(
            p.x >= playfield::WIDTH,
            "expected respawn at the right edge, got x = {}",
            p.x
        );
        assert!(p.x < playfield::WIDTH + pipe::RESPAWN_JITTER);
    }

    #[test]
    fn test_no_recycle_while_partially_visible() {
        let mut rng = seeded_rng();
        // Right edge still at 4.0 after one step.
        let mut p = Pipe::new(-38.0, 320.0);

        p.advance(DT, &mut rng);

        assert!(p.x < 0.0 && p.right() > 0.0);
    }

    #[test]
    fn test_reposition_keeps_gap_centre_in_band() {
        let mut rng = seeded_rng();
        let mut p = Pipe::new(0.0, 0.0);

        for _ in 0..200 {
            p.reposition(&mut rng);
            // centre jitter is ±0.5 of the half-height around mid-field
            assert!(p.y >= playfield::HEIGHT * 0.25 - 1e-3);
            assert!(p.y < playfield::HEIGHT * 0.75 + 1e-3);
            assert!(p.x >= playfield::WIDTH);
            assert!(p.x < playfield::WIDTH + pipe::RESPAWN_JITTER);
        }
    }

    #[test]
    fn test_reposition_is_deterministic_per_seed() {
        let mut a = Pipe::new(0.0, 0.0);
        let mut b = Pipe::new(0.0, 0.0);

        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);

        for _ in 0..10 {
            a.reposition(&mut rng_a);
            b.reposition(&mut rng_b);
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_collides_with_segments_only() {
        let p = Pipe::new(210.0, 320.0);

        // Inside the gap: no collision.
        let in_gap = Rect::new(215.0, 310.0, 34.0, 24.0);
        assert!(!p.collides_with(&in_gap));

        // Overlapping the upper segment.
        let hits_upper = Rect::new(215.0, 430.0, 34.0, 24.0);
        assert!(p.collides_with(&hits_upper));

        // Overlapping the lower segment.
        let hits_lower = Rect::new(215.0, 100.0, 34.0, 24.0);
        assert!(p.collides_with(&hits_lower));

        // Left of the pipe entirely.
        let before = Rect::new(30.0, 320.0, 34.0, 24.0);
        assert!(!p.collides_with(&before));
    }

    #[test]
    fn test_gap_edges_count_as_collision() {
        let p = Pipe::new(210.0, 320.0);
        // Top edge exactly on the gap top boundary.
        let grazing = Rect::new(215.0, 420.0 - 24.0, 34.0, 24.0);
        assert!(p.collides_with(&grazing));
    }
}

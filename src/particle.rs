use glam::Vec2;
use rand::Rng;

/// How far a pointer nudge moves a particle per axis, per tick.
pub const REPULSION_STEP: f32 = 2.0;

/// Repulsion stops pushing a particle once it is within `radius * EDGE_MARGIN_FACTOR`
/// of a viewport edge. Independent of the spawn inset, which is the bare radius.
pub const EDGE_MARGIN_FACTOR: f32 = 10.0;

pub const RADIUS_RANGE: std::ops::Range<f32> = 1.0..4.0;
pub const SPEED_RANGE: std::ops::Range<f32> = -0.2..0.2;
pub const ALPHA_RANGE: std::ops::Range<f32> = 0.2..0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

impl Particle {
    /// Samples a particle that starts fully inside the viewport, inset by its
    /// own radius on every edge.
    pub fn spawn(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        let radius = rng.gen_range(RADIUS_RANGE);
        let span_x = (width - radius * 2.0).max(0.0);
        let span_y = (height - radius * 2.0).max(0.0);

        Self {
            position: Vec2::new(
                radius + rng.gen::<f32>() * span_x,
                radius + rng.gen::<f32>() * span_y,
            ),
            velocity: Vec2::new(rng.gen_range(SPEED_RANGE), rng.gen_range(SPEED_RANGE)),
            radius,
            alpha: rng.gen_range(ALPHA_RANGE),
        }
    }

    /// Flips the velocity component on any axis where the particle has left
    /// the viewport. The check is against the unshrunk viewport, not inset by
    /// the radius like spawn placement.
    pub fn reflect(&mut self, width: f32, height: f32) {
        if self.position.x > width || self.position.x < 0.0 {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y > height || self.position.y < 0.0 {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Nudges the particle away from the pointer while it is inside the
    /// pointer's influence circle. Each axis is gated independently by the
    /// edge margin, and stored velocity is never touched.
    pub fn repel(&mut self, pointer: Vec2, influence_radius: f32, width: f32, height: f32) {
        let distance = pointer.distance(self.position);
        if distance >= influence_radius + self.radius {
            return;
        }

        let margin = self.radius * EDGE_MARGIN_FACTOR;
        if pointer.x < self.position.x && self.position.x < width - margin {
            self.position.x += REPULSION_STEP;
        }
        if pointer.x > self.position.x && self.position.x > margin {
            self.position.x -= REPULSION_STEP;
        }
        if pointer.y < self.position.y && self.position.y < height - margin {
            self.position.y += REPULSION_STEP;
        }
        if pointer.y > self.position.y && self.position.y > margin {
            self.position.y -= REPULSION_STEP;
        }
    }

    pub fn integrate(&mut self) {
        self.position += self.velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const W: f32 = 800.0;
    const H: f32 = 600.0;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::new(0.1, -0.1),
            radius: 2.0,
            alpha: 0.5,
        }
    }

    #[test]
    fn spawn_samples_stay_inside_their_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = Particle::spawn(&mut rng, W, H);
            assert!(
                RADIUS_RANGE.contains(&p.radius),
                "radius {} out of range",
                p.radius
            );
            assert!(
                ALPHA_RANGE.contains(&p.alpha),
                "alpha {} out of range",
                p.alpha
            );
            assert!(SPEED_RANGE.contains(&p.velocity.x));
            assert!(SPEED_RANGE.contains(&p.velocity.y));
            assert!(
                p.position.x >= p.radius && p.position.x <= W - p.radius,
                "x {} escapes the spawn inset for radius {}",
                p.position.x,
                p.radius
            );
            assert!(p.position.y >= p.radius && p.position.y <= H - p.radius);
        }
    }

    #[test]
    fn spawn_clamps_degenerate_viewports() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = Particle::spawn(&mut rng, 1.0, 1.0);
            assert_eq!(p.position, Vec2::splat(p.radius));
        }
    }

    #[test]
    fn reflect_flips_once_and_stays_flipped_in_bounds() {
        let mut p = particle_at(W + 1.0, H / 2.0);
        p.reflect(W, H);
        assert_eq!(p.velocity.x, -0.1);
        assert_eq!(p.velocity.y, -0.1, "y must not flip for an x crossing");

        p.position.x = W / 2.0;
        p.reflect(W, H);
        assert_eq!(p.velocity.x, -0.1, "in-bounds tick must not flip again");
    }

    #[test]
    fn reflect_handles_the_low_edge_and_y_axis() {
        let mut p = particle_at(-0.5, -0.5);
        p.reflect(W, H);
        assert_eq!(p.velocity, Vec2::new(-0.1, 0.1));
    }

    #[test]
    fn repel_pushes_away_on_both_axes() {
        // Distance 100 from the pointer, well clear of every edge margin.
        let mut p = particle_at(400.0, 300.0);
        let pointer = Vec2::new(400.0 - 60.0, 300.0 - 80.0);
        p.repel(pointer, 150.0, W, H);

        assert_eq!(p.position, Vec2::new(402.0, 302.0));
        assert_eq!(
            p.velocity,
            Vec2::new(0.1, -0.1),
            "repulsion must not alter velocity"
        );
    }

    #[test]
    fn repel_ignores_particles_outside_the_influence_circle() {
        let mut p = particle_at(400.0, 300.0);
        let before = p.position;
        p.repel(Vec2::new(400.0 + 200.0, 300.0), 150.0, W, H);
        assert_eq!(p.position, before);
    }

    #[test]
    fn repel_gates_each_axis_by_the_edge_margin() {
        // Within radius*10 of the right edge: the x push is blocked, y still moves.
        let mut p = particle_at(W - 10.0, 300.0);
        let pointer = Vec2::new(W - 15.0, 295.0);
        p.repel(pointer, 150.0, W, H);

        assert_eq!(p.position.x, W - 10.0);
        assert_eq!(p.position.y, 302.0);
    }

    #[test]
    fn integrate_applies_velocity_exactly() {
        let mut p = particle_at(10.0, 20.0);
        p.integrate();
        assert_eq!(p.position, Vec2::new(10.0 + 0.1f32, 20.0 - 0.1f32));
    }
}

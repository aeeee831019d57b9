use glam::Vec2;
use rand::Rng;

use crate::canvas::Canvas;
use crate::particle::Particle;

pub const DEFAULT_PARTICLE_COUNT: usize = 100;
pub const DEFAULT_POINTER_RADIUS: f32 = 150.0;

/// Connection opacity falls off with squared distance: `1 - d2 / LINE_FADE`.
const LINE_FADE: f32 = 20000.0;
/// Pairs connect when their squared distance is under
/// `(width / CELL_DIVISOR) * (height / CELL_DIVISOR)`.
const CELL_DIVISOR: f32 = 7.0;
const LINE_WIDTH: f32 = 1.0;

/// Ambient simulation state: viewport, pointer, and the particle collection.
///
/// The collection is replaced wholesale by `regenerate` (startup and resize)
/// and only ever mutated in place by `advance`.
pub struct Field {
    width: f32,
    height: f32,
    pointer: Option<Vec2>,
    pointer_radius: f32,
    particle_count: usize,
    particles: Vec<Particle>,
}

impl Field {
    pub fn new(particle_count: usize, pointer_radius: f32) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pointer: None,
            pointer_radius,
            particle_count,
            particles: Vec::new(),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn pointer_radius(&self) -> f32 {
        self.pointer_radius
    }

    pub fn set_pointer_radius(&mut self, radius: f32) {
        self.pointer_radius = radius;
    }

    pub fn set_particle_count(&mut self, count: usize, rng: &mut impl Rng) {
        self.particle_count = count;
        self.regenerate(rng);
    }

    /// Replaces the entire collection with freshly spawned particles.
    pub fn regenerate(&mut self, rng: &mut impl Rng) {
        self.particles = (0..self.particle_count)
            .map(|_| Particle::spawn(rng, self.width, self.height))
            .collect();
    }

    pub fn resize(&mut self, width: f32, height: f32, rng: &mut impl Rng) {
        self.width = width;
        self.height = height;
        self.regenerate(rng);
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer = Some(position);
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// One simulation tick over the collection in order: boundary reflection,
    /// pointer repulsion (skipped entirely while no pointer is present), then
    /// integration.
    pub fn advance(&mut self) {
        for particle in &mut self.particles {
            particle.reflect(self.width, self.height);
            if let Some(pointer) = self.pointer {
                particle.repel(pointer, self.pointer_radius, self.width, self.height);
            }
            particle.integrate();
        }
    }

    /// Draws the current state: clear, one disc per particle in collection
    /// order, then the connection lines on top.
    pub fn render(&self, canvas: &mut impl Canvas) {
        canvas.clear();
        for particle in &self.particles {
            canvas.fill_disc(particle.position, particle.radius, particle.alpha);
        }
        self.connect(canvas);
    }

    /// Strokes a line between every pair of distinct particles closer than
    /// the viewport-derived threshold, fading with squared distance. The pair
    /// loop stays in squared-distance space.
    fn connect(&self, canvas: &mut impl Canvas) {
        let threshold = (self.width / CELL_DIVISOR) * (self.height / CELL_DIVISOR);
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let d2 = a.position.distance_squared(b.position);
                if d2 >= threshold {
                    continue;
                }

                // Large viewports push the threshold past the fade distance;
                // a non-positive alpha is skipped rather than drawn.
                let alpha = 1.0 - d2 / LINE_FADE;
                if alpha <= 0.0 {
                    continue;
                }

                canvas.stroke_line(a.position, b.position, LINE_WIDTH, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[derive(Debug, PartialEq)]
    enum Command {
        Clear,
        Disc { center: Vec2 },
        Line { from: Vec2, to: Vec2, alpha: f32 },
    }

    #[derive(Default)]
    struct Recorder {
        commands: Vec<Command>,
    }

    impl Canvas for Recorder {
        fn clear(&mut self) {
            self.commands.push(Command::Clear);
        }

        fn fill_disc(&mut self, center: Vec2, _radius: f32, _alpha: f32) {
            self.commands.push(Command::Disc { center });
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, alpha: f32) {
            self.commands.push(Command::Line { from, to, alpha });
        }
    }

    impl Recorder {
        fn lines(&self) -> Vec<&Command> {
            self.commands
                .iter()
                .filter(|c| matches!(c, Command::Line { .. }))
                .collect()
        }
    }

    fn seeded_field(width: f32, height: f32, seed: u64) -> Field {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut field = Field::new(DEFAULT_PARTICLE_COUNT, DEFAULT_POINTER_RADIUS);
        field.resize(width, height, &mut rng);
        field
    }

    /// A field whose particles are placed by hand instead of sampled.
    fn fixed_field(width: f32, height: f32, positions: &[Vec2]) -> Field {
        let mut field = Field::new(positions.len(), DEFAULT_POINTER_RADIUS);
        field.width = width;
        field.height = height;
        field.particles = positions
            .iter()
            .map(|&position| Particle {
                position,
                velocity: Vec2::new(0.1, -0.1),
                radius: 2.0,
                alpha: 0.5,
            })
            .collect();
        field
    }

    #[test]
    fn regenerate_always_yields_the_exact_count() {
        let field = seeded_field(800.0, 600.0, 1);
        assert_eq!(field.particles().len(), DEFAULT_PARTICLE_COUNT);
    }

    #[test]
    fn equal_seeds_produce_equal_fields() {
        let a = seeded_field(800.0, 600.0, 42);
        let b = seeded_field(800.0, 600.0, 42);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn resize_replaces_the_collection_under_the_new_dimensions() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut field = Field::new(DEFAULT_PARTICLE_COUNT, DEFAULT_POINTER_RADIUS);
        field.resize(800.0, 600.0, &mut rng);
        for _ in 0..10 {
            field.advance();
        }

        field.resize(400.0, 300.0, &mut rng);
        assert_eq!(field.particles().len(), DEFAULT_PARTICLE_COUNT);
        for p in field.particles() {
            assert!(p.position.x >= p.radius && p.position.x <= 400.0 - p.radius);
            assert!(p.position.y >= p.radius && p.position.y <= 300.0 - p.radius);
        }
    }

    #[test]
    fn advance_without_pointer_is_pure_integration() {
        let mut field = seeded_field(800.0, 600.0, 9);
        let before: Vec<_> = field
            .particles()
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect();

        field.advance();

        for (p, (position, velocity)) in field.particles().iter().zip(before) {
            assert_eq!(
                p.position,
                position + velocity,
                "no pointer means no nudge, only velocity"
            );
        }
    }

    #[test]
    fn advance_with_a_pointer_in_range_nudges_positions() {
        let mut field = fixed_field(800.0, 600.0, &[Vec2::new(400.0, 300.0)]);
        field.pointer_moved(Vec2::new(340.0, 220.0));
        field.advance();

        // Nudged by (2, 2) away from the pointer, then integrated.
        assert_eq!(
            field.particles()[0].position,
            Vec2::new(402.0 + 0.1f32, 302.0 - 0.1f32)
        );
        assert_eq!(field.particles()[0].velocity, Vec2::new(0.1, -0.1));
    }

    #[test]
    fn pointer_leaving_disengages_repulsion() {
        let mut field = fixed_field(800.0, 600.0, &[Vec2::new(400.0, 300.0)]);
        field.pointer_moved(Vec2::new(340.0, 220.0));
        field.pointer_left();
        field.advance();

        assert_eq!(
            field.particles()[0].position,
            Vec2::new(400.0 + 0.1f32, 300.0 - 0.1f32)
        );
    }

    #[test]
    fn render_clears_then_draws_discs_before_lines() {
        let field = fixed_field(700.0, 700.0, &[Vec2::new(100.0, 100.0), Vec2::new(130.0, 140.0)]);
        let mut recorder = Recorder::default();
        field.render(&mut recorder);

        assert_eq!(recorder.commands[0], Command::Clear);
        assert_eq!(
            recorder.commands[1],
            Command::Disc {
                center: Vec2::new(100.0, 100.0)
            }
        );
        assert_eq!(
            recorder.commands[2],
            Command::Disc {
                center: Vec2::new(130.0, 140.0)
            }
        );
        assert!(matches!(recorder.commands[3], Command::Line { .. }));
    }

    #[test]
    fn connection_alpha_fades_with_squared_distance() {
        // 700x700 puts the threshold at (700/7)^2 = 10000.
        let field = fixed_field(700.0, 700.0, &[Vec2::new(100.0, 100.0), Vec2::new(130.0, 140.0)]);
        let mut recorder = Recorder::default();
        field.render(&mut recorder);

        let lines = recorder.lines();
        assert_eq!(lines.len(), 1);
        match lines[0] {
            Command::Line { from, to, alpha } => {
                assert_eq!(*from, Vec2::new(100.0, 100.0));
                assert_eq!(*to, Vec2::new(130.0, 140.0));
                // d2 = 30^2 + 40^2 = 2500, alpha = 1 - 2500/20000.
                assert!((alpha - 0.875).abs() < 1e-6);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn pairs_at_or_past_the_threshold_draw_nothing() {
        // d2 = 100^2 = 10000, exactly the 700x700 threshold.
        let field = fixed_field(700.0, 700.0, &[Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0)]);
        let mut recorder = Recorder::default();
        field.render(&mut recorder);
        assert!(recorder.lines().is_empty());
    }

    #[test]
    fn non_positive_alpha_skips_the_line_despite_the_threshold() {
        // 1400x1400 lifts the threshold to 40000, past the 20000 fade distance.
        let field = fixed_field(
            1400.0,
            1400.0,
            &[Vec2::new(100.0, 100.0), Vec2::new(100.0 + 150.0, 100.0 + 50.0)],
        );
        let mut recorder = Recorder::default();
        field.render(&mut recorder);

        // d2 = 150^2 + 50^2 = 25000: under the threshold, alpha would be -0.25.
        assert!(recorder.lines().is_empty());
    }

    #[test]
    fn a_lone_particle_never_connects_to_itself() {
        let field = fixed_field(700.0, 700.0, &[Vec2::new(100.0, 100.0)]);
        let mut recorder = Recorder::default();
        field.render(&mut recorder);
        assert!(recorder.lines().is_empty());
    }
}

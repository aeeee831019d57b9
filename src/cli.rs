use clap::Parser;

use crate::field;

/// An interactive particle-field background
#[derive(Parser)]
#[command()]
pub struct Args {
    /// Number of particles in the field
    #[arg(short, long, default_value_t = field::DEFAULT_PARTICLE_COUNT)]
    pub particles: usize,

    /// Fixed framerate cap
    ///
    /// 0 leaves pacing to the swapchain (vsync)
    #[arg(short, long, default_value_t = 0)]
    pub framerate: u32,

    /// Radius of the pointer's repulsion circle, in pixels
    #[arg(long, default_value_t = field::DEFAULT_POINTER_RADIUS)]
    pub pointer_radius: f32,

    /// Seed for particle placement; omit for a different field every run
    #[arg(short, long)]
    pub seed: Option<u64>,
}

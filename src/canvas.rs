use glam::Vec2;

/// Minimal 2D drawing surface the field renders into each tick.
///
/// The GPU path batches these calls into instance buffers; tests swap in a
/// recording implementation so draw decisions can be asserted without a
/// device.
pub trait Canvas {
    fn clear(&mut self);
    fn fill_disc(&mut self, center: Vec2, radius: f32, alpha: f32);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, alpha: f32);
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DiscInstance {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineInstance {
    pub from: Vec2,
    pub to: Vec2,
    pub width: f32,
    pub alpha: f32,
}

/// One frame's worth of instances, in draw order: discs first, then lines.
#[derive(Default)]
pub struct FrameBatch {
    pub discs: Vec<DiscInstance>,
    pub lines: Vec<LineInstance>,
}

impl FrameBatch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for FrameBatch {
    fn clear(&mut self) {
        self.discs.clear();
        self.lines.clear();
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, alpha: f32) {
        self.discs.push(DiscInstance {
            center,
            radius,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, alpha: f32) {
        self.lines.push(LineInstance {
            from,
            to,
            width,
            alpha,
        });
    }
}

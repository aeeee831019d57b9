mod canvas;
mod cli;
mod field;
mod framepace;
mod gpu;
mod gui;
mod konami;
mod particle;
mod prefs;
mod render;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use egui::Widget;
use glam::Vec2;
use log::{debug, info, warn};
use palette::{FromColor, Hsl, ShiftHue, Srgb};
use rand::{rngs::StdRng, SeedableRng};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::canvas::FrameBatch;
use crate::field::Field;
use crate::framepace::Framepacer;
use crate::gpu::GpuContext;
use crate::gui::EguiIntegration;
use crate::konami::KonamiTracker;
use crate::prefs::Preferences;
use crate::render::RenderModule;
use crate::utils::Exists;

/// Base hue shared by discs and connection lines: rgb(79, 172, 254).
pub const BASE_TINT: [f32; 3] = [79.0 / 255.0, 172.0 / 255.0, 254.0 / 255.0];

const RAINBOW_DURATION: Duration = Duration::from_secs(5);
/// One full trip around the hue circle while rainbow mode runs.
const RAINBOW_CYCLE_SECS: f32 = 2.0;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let prefs_path = Preferences::default_path();
    let prefs = Preferences::load(&prefs_path);

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gpu: Exists::None,
        gfx: Exists::None,
        field: Field::new(args.particles, args.pointer_radius),
        rng,
        framepace: Framepacer::new(),

        prefs,
        prefs_path,
        konami: KonamiTracker::new(),
        rainbow_started: None,

        mouse_position: Vec2::ZERO,
        is_paused: false,
        step: false,
        framerate: args.framerate,

        edited_particles: args.particles,
        edited_pointer_radius: args.pointer_radius,
    };

    event_loop.run_app(&mut app_state)?;
    Ok(())
}

struct GfxState {
    window: Arc<Window>,
    egui: EguiIntegration,

    render_module: RenderModule,
    batch: FrameBatch,
}

struct AppState<'a> {
    tokio_rt: tokio::runtime::Runtime,
    gpu: Exists<GpuContext<'a>>,
    gfx: Exists<GfxState>,
    field: Field,
    rng: StdRng,
    framepace: Framepacer,

    prefs: Preferences,
    prefs_path: PathBuf,
    konami: KonamiTracker,
    rainbow_started: Option<Instant>,

    mouse_position: Vec2,
    is_paused: bool,
    step: bool,
    framerate: u32,

    edited_particles: usize,
    edited_pointer_radius: f32,
}

impl<'a> ApplicationHandler for AppState<'a> {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title("particle field"))
                .unwrap(),
        );
        let window_size = window.inner_size();

        let gpu = self
            .tokio_rt
            .block_on(GpuContext::new(window.clone()))
            .unwrap();
        let surface_format = gpu.surface_format();

        let render_module = RenderModule::new(&gpu.device, surface_format);
        render_module.update_size(&gpu.queue, window_size.width, window_size.height);
        render_module.update_tint(&gpu.queue, BASE_TINT);

        let mut egui = EguiIntegration::new(&gpu.device, surface_format);
        egui.resize(window_size.width, window_size.height);

        self.field.resize(
            window_size.width as f32,
            window_size.height as f32,
            &mut self.rng,
        );
        info!(
            "field of {} particles over {}x{}",
            self.field.particles().len(),
            window_size.width,
            window_size.height
        );

        self.gfx = Exists::Some(GfxState {
            window,
            egui,

            render_module,
            batch: FrameBatch::new(),
        });
        self.gpu = Exists::Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.gfx.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.gpu.config.width = new_size.width.max(1);
                self.gpu.config.height = new_size.height.max(1);
                self.gpu.reconfigure_surface();

                self.gfx
                    .render_module
                    .update_size(&self.gpu.queue, new_size.width, new_size.height);
                self.gfx.egui.resize(new_size.width, new_size.height);

                self.field.resize(
                    new_size.width as f32,
                    new_size.height as f32,
                    &mut self.rng,
                );
                debug!("resized to {}x{}", new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if self.konami.observe(code) {
                            info!("you found the secret");
                            self.rainbow_started = Some(Instant::now());
                        }
                    }
                }

                let mut handled = true;
                match (event.state, event.physical_key) {
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::Space)) => {
                        self.is_paused = !self.is_paused;
                    }
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyN)) => {
                        self.step = true;
                    }
                    (ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyH)) => {
                        self.prefs.hud_hidden = !self.prefs.hud_hidden;
                        self.prefs.save(&self.prefs_path);
                        debug!("hud hidden: {}", self.prefs.hud_hidden);
                    }

                    _ => handled = false,
                };

                if !handled {
                    self.gfx.egui.key_event(event);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.gfx.egui.modifiers_event(modifiers);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.gfx
                    .egui
                    .mouse_event(self.mouse_position, state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.field.pointer_moved(position);

                self.gfx.egui.mouse_motion(position);
                self.mouse_position = position;
            }
            WindowEvent::CursorLeft { .. } => {
                self.field.pointer_left();
                self.gfx.egui.mouse_left();
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.gpu.is_none() || self.gfx.is_none() {
            return;
        }

        self.framepace.begin_frame();

        if !self.is_paused || self.step {
            self.field.advance();
            self.step = false;
        }

        let tint = match self.rainbow_started {
            Some(started) if started.elapsed() < RAINBOW_DURATION => {
                let degrees = started.elapsed().as_secs_f32() / RAINBOW_CYCLE_SECS * 360.0;
                shift_hue(BASE_TINT, degrees)
            }
            Some(_) => {
                self.rainbow_started = None;
                BASE_TINT
            }
            None => BASE_TINT,
        };

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("skipping frame: {e}");
                self.gpu.reconfigure_surface();
                return;
            }
        };
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        if let Exists::Some(gfx) = &mut self.gfx {
            gfx.render_module.update_tint(&self.gpu.queue, tint);

            self.field.render(&mut gfx.batch);
            gfx.render_module
                .upload(&self.gpu.device, &self.gpu.queue, &gfx.batch);

            if self.prefs.hud_hidden {
                gfx.egui.run(|_| {});
            } else {
                gfx.egui.run(|ctx| {
                    egui::Window::new("Settings")
                        .default_width(145.0)
                        .show(ctx, |ui| {
                            ui.checkbox(&mut self.is_paused, "Paused [Space]");
                            egui::DragValue::new(&mut self.framerate)
                                .suffix(" Fixed FPS")
                                .ui(ui);

                            ui.label(format!("FPS {:.1}", self.framepace.framerate()));
                        });

                    egui::Window::new("Field")
                        .default_width(145.0)
                        .show(ctx, |ui| {
                            match self.field.pointer() {
                                Some(pointer) => ui.label(format!(
                                    "Pointer\nx: {:.0}\ny: {:.0}",
                                    pointer.x, pointer.y
                                )),
                                None => ui.label("Pointer absent"),
                            };
                            ui.add_space(5.0);

                            ui.separator();
                            egui::DragValue::new(&mut self.edited_particles)
                                .suffix(" Particles")
                                .ui(ui);
                            egui::widgets::Slider::new(
                                &mut self.edited_pointer_radius,
                                0.0..=400.0,
                            )
                            .text("Reach")
                            .ui(ui);

                            if ui.button("Apply").clicked() && self.edited_particles > 0 {
                                if self.field.particle_count() != self.edited_particles {
                                    self.field
                                        .set_particle_count(self.edited_particles, &mut self.rng);
                                }
                                if self.field.pointer_radius() != self.edited_pointer_radius {
                                    self.field.set_pointer_radius(self.edited_pointer_radius);
                                }
                            }
                        });
                });
            }

            gfx.egui.pre_render(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                self.framepace.frametime(),
            );

            // Render
            {
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let mut rpass = gfx.render_module.begin_pass(&mut encoder, &view);
                gfx.egui.render(&mut rpass);
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        let limit_frametime = if self.framerate == 0 {
            0.0
        } else {
            1.0 / self.framerate as f32
        };
        self.framepace.end_frame(limit_frametime);
    }
}

fn shift_hue(rgb: [f32; 3], degrees: f32) -> [f32; 3] {
    let hsl = Hsl::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]));
    let shifted = Srgb::from_color(hsl.shift_hue(degrees));
    [shifted.red, shifted.green, shifted.blue]
}

use std::borrow::Cow;

use wgpu::{util::DeviceExt, BindGroupLayoutEntry};

use crate::canvas::{DiscInstance, FrameBatch, LineInstance};

/// Page-background clear color behind the particles.
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.024,
    g: 0.031,
    b: 0.059,
    a: 1.0,
};

const INITIAL_DISC_CAPACITY: usize = 256;
const INITIAL_LINE_CAPACITY: usize = 8192;

pub struct RenderModule {
    screen_buffer: wgpu::Buffer,
    tint_buffer: wgpu::Buffer,

    disc_corners: wgpu::Buffer,
    line_corners: wgpu::Buffer,
    disc_instances: wgpu::Buffer,
    line_instances: wgpu::Buffer,
    disc_capacity: usize,
    line_capacity: usize,
    disc_count: u32,
    line_count: u32,

    bind_group: wgpu::BindGroup,
    disc_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
}

impl RenderModule {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: None,
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("render.wgsl"))),
        });

        let screen_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("screen size"),
            size: 4 * 4,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let tint_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tint"),
            size: 4 * 4,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Corner strips: discs span the unit square around the center, lines
        // span along (x) and across (y) the segment.
        let disc_corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("disc corners"),
            contents: bytemuck::bytes_of(&[-1.0f32, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0]),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let line_corners = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("line corners"),
            contents: bytemuck::bytes_of(&[0.0f32, -1.0, 1.0, -1.0, 0.0, 1.0, 1.0, 1.0]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let disc_instances = create_instance_buffer(
            device,
            "disc instances",
            INITIAL_DISC_CAPACITY * std::mem::size_of::<DiscInstance>(),
        );
        let line_instances = create_instance_buffer(
            device,
            "line instances",
            INITIAL_LINE_CAPACITY * std::mem::size_of::<LineInstance>(),
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: screen_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: tint_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("render"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let disc_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("discs"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "disc_vertex",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<DiscInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 2 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![3 => Float32x2],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "disc_fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format: swapchain_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: strip_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lines"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "line_vertex",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<LineInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32, 3 => Float32],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: 2 * 4,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![4 => Float32x2],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "line_fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format: swapchain_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: strip_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            screen_buffer,
            tint_buffer,

            disc_corners,
            line_corners,
            disc_instances,
            line_instances,
            disc_capacity: INITIAL_DISC_CAPACITY,
            line_capacity: INITIAL_LINE_CAPACITY,
            disc_count: 0,
            line_count: 0,

            bind_group,
            disc_pipeline,
            line_pipeline,
        }
    }

    /// Copies one frame's batch into the instance buffers, growing them when
    /// the batch outruns their capacity.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &FrameBatch) {
        if batch.discs.len() > self.disc_capacity {
            self.disc_capacity = batch.discs.len().next_power_of_two();
            self.disc_instances = create_instance_buffer(
                device,
                "disc instances",
                self.disc_capacity * std::mem::size_of::<DiscInstance>(),
            );
        }
        if batch.lines.len() > self.line_capacity {
            self.line_capacity = batch.lines.len().next_power_of_two();
            self.line_instances = create_instance_buffer(
                device,
                "line instances",
                self.line_capacity * std::mem::size_of::<LineInstance>(),
            );
        }

        if !batch.discs.is_empty() {
            queue.write_buffer(&self.disc_instances, 0, bytemuck::cast_slice(&batch.discs));
        }
        if !batch.lines.is_empty() {
            queue.write_buffer(&self.line_instances, 0, bytemuck::cast_slice(&batch.lines));
        }

        self.disc_count = batch.discs.len() as u32;
        self.line_count = batch.lines.len() as u32;
    }

    /// Clears the frame and draws the uploaded instances: discs first, then
    /// the connection lines on top. The open pass is handed back so the HUD
    /// can render into it.
    pub fn begin_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: None,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        rpass.set_bind_group(0, &self.bind_group, &[]);

        rpass.set_pipeline(&self.disc_pipeline);
        rpass.set_vertex_buffer(0, self.disc_instances.slice(..));
        rpass.set_vertex_buffer(1, self.disc_corners.slice(..));
        rpass.draw(0..4, 0..self.disc_count);

        rpass.set_pipeline(&self.line_pipeline);
        rpass.set_vertex_buffer(0, self.line_instances.slice(..));
        rpass.set_vertex_buffer(1, self.line_corners.slice(..));
        rpass.draw(0..4, 0..self.line_count);

        rpass
    }

    pub fn update_size(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.screen_buffer,
            0,
            bytemuck::bytes_of(&[width as f32, height as f32, 0.0, 0.0]),
        );
    }

    pub fn update_tint(&self, queue: &wgpu::Queue, rgb: [f32; 3]) {
        queue.write_buffer(
            &self.tint_buffer,
            0,
            bytemuck::bytes_of(&[rgb[0], rgb[1], rgb[2], 1.0]),
        );
    }
}

fn strip_primitive() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleStrip,
        ..Default::default()
    }
}

fn create_instance_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

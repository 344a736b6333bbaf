use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::config::{LightConfig, MaterialConfig, RendererConfig};
use crate::error::GpuInitError;
use crate::geometry::{SurfaceVertex, TriangleMesh};
use crate::renderer::backend::{BackendKind, Capability};
use crate::renderer::camera::Camera;
use crate::renderer::texture::{SceneTexture, TextureImage};
use crate::scene::{ShadingMode, Viewport};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    pub base_color: [f32; 4],
    pub material: [f32; 4],
    pub mode: [u32; 4],
}

/// Per-frame inputs of [`SceneUniform`] that don't change after startup.
#[derive(Clone, Debug)]
pub struct SceneParams {
    pub mode: ShadingMode,
    pub band_count: f32,
    pub rotation_x: f32,
    pub material: MaterialConfig,
    pub lights: LightConfig,
}

impl SceneUniform {
    pub fn new(params: &SceneParams, camera: &Camera, playhead: f32) -> Self {
        let model = Mat4::from_rotation_x(params.rotation_x);
        let normal_matrix = model.inverse().transpose();
        let [lx, ly, lz] = params.lights.point_position;
        let [lr, lg, lb] = params.lights.point_color;
        let [ar, ag, ab] = params.lights.ambient_color;
        let [br, bg, bb] = params.material.base_color.map(|c| srgb_to_linear(c as f64) as f32);

        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            camera_pos: camera.position().extend(1.0).to_array(),
            light_pos: [lx, ly, lz, params.lights.point_intensity],
            light_color: [lr, lg, lb, 1.0],
            ambient: [ar, ag, ab, params.lights.ambient_intensity],
            base_color: [br, bg, bb, 1.0],
            material: [
                params.material.roughness,
                params.material.metalness,
                params.band_count,
                playhead,
            ],
            mode: [params.mode.shader_index(), 0, 0, 0],
        }
    }
}

/// Decodes one sRGB-encoded channel (as written in hex colors) to linear.
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Clear color for a swapchain of `format`. An sRGB target re-encodes on
/// write, so the configured sRGB value is decoded first.
pub fn clear_color(rgb: [f64; 3], format: wgpu::TextureFormat) -> wgpu::Color {
    let [r, g, b] = if format.is_srgb() {
        rgb.map(srgb_to_linear)
    } else {
        rgb
    };
    wgpu::Color { r, g, b, a: 1.0 }
}

/// Adapter + device pair of one backend family.
pub struct GpuDevice {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuDevice {
    async fn open(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
        kind: BackendKind,
    ) -> Result<Self, GpuInitError> {
        let backends = kind.backends();
        let mut adapters: Vec<wgpu::Adapter> = instance
            .enumerate_adapters(backends)
            .into_iter()
            .filter(|adapter| adapter.is_surface_supported(surface))
            .collect();
        adapters.sort_by_key(|adapter| device_type_rank(adapter.get_info().device_type));

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(GpuInitError::NoAdapter { backends })?;
        let info = adapter.get_info();

        let required_limits = match kind {
            BackendKind::Preferred => wgpu::Limits::default(),
            BackendKind::Fallback => {
                wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
            }
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some(kind.label()),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|source| GpuInitError::Device {
                adapter: format!("{} ({:?})", info.name, info.backend),
                source,
            })?;

        log::debug!(
            "{} device opened on {} ({:?}, {:?})",
            kind.label(),
            info.name,
            info.backend,
            info.device_type
        );

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

fn device_type_rank(device_type: wgpu::DeviceType) -> u8 {
    match device_type {
        wgpu::DeviceType::DiscreteGpu => 0,
        wgpu::DeviceType::IntegratedGpu => 1,
        wgpu::DeviceType::VirtualGpu => 2,
        wgpu::DeviceType::Other => 3,
        wgpu::DeviceType::Cpu => 4,
    }
}

/// What the frame loop should do after a failed surface acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Out of memory; stop the event loop.
    Fatal,
}

pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub byte_size: usize,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, mesh: &TriangleMesh) -> Self {
        let vertices = mesh.interleaved();

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Vertex Buffer"),
            size: (vertices.len() * size_of::<SurfaceVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Surface Index Buffer"),
            size: (mesh.indices.len() * size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&index_buffer, 0, bytemuck::cast_slice(&mesh.indices));

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            byte_size: mesh.byte_size(),
        }
    }
}

fn surface_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<SurfaceVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    }
}

pub struct GpuState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    pub backend: BackendKind,
    pub adapter_name: String,

    pub pipeline: wgpu::RenderPipeline,
    pub scene_buffer: wgpu::Buffer,
    pub scene_bind_group: wgpu::BindGroup,

    pub mesh: MeshBuffers,
    pub texture: SceneTexture,

    pub sample_count: u32,
    pub depth_texture: wgpu::TextureView,
    pub msaa_texture: Option<wgpu::TextureView>,
    pub clear_color: wgpu::Color,
}

impl GpuState {
    /// Builds the fallback device first, then tries the preferred one.
    pub async fn new(
        window: Arc<Window>,
        viewport: Viewport,
        settings: &RendererConfig,
        mesh: &TriangleMesh,
        pattern: &TextureImage,
    ) -> Result<Self, GpuInitError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: BackendKind::Preferred.backends() | BackendKind::Fallback.backends(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let fallback = GpuDevice::open(&instance, &surface, BackendKind::Fallback).await;
        let capability = Capability::resolve(
            fallback,
            GpuDevice::open(&instance, &surface, BackendKind::Preferred),
        )
        .await?;

        let backend = capability.kind();
        let GpuDevice {
            adapter,
            device,
            queue,
        } = capability.into_inner();
        let info = adapter.get_info();
        log::info!(
            "rendering with {} ({:?}) on the {} path",
            info.name,
            info.backend,
            backend.label()
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = {
            let flags = adapter.get_texture_format_features(surface_format).flags;
            let requested = settings.msaa_samples.max(1);
            if flags.sample_count_supported(requested) {
                requested
            } else {
                log::warn!(
                    "{requested}x MSAA unsupported for {surface_format:?}, rendering without"
                );
                1
            }
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders.wgsl").into()),
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mesh = MeshBuffers::new(&device, &queue, mesh);
        let texture = SceneTexture::upload(&device, &queue, pattern);

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Surface Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Surface Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[surface_vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Double sided: the shader flips normals of back faces.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(&device, &config, sample_count);
        let msaa_texture = Self::create_msaa_texture(&device, &config, sample_count);

        let clear_color = clear_color(settings.clear_color, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
            backend,
            adapter_name: info.name,
            pipeline,
            scene_buffer,
            scene_bind_group,
            mesh,
            texture,
            sample_count,
            depth_texture,
            msaa_texture,
            clear_color,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if viewport.is_empty() {
            return;
        }

        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Self::create_depth_texture(&self.device, &self.config, self.sample_count);
        self.msaa_texture =
            Self::create_msaa_texture(&self.device, &self.config, self.sample_count);
    }

    pub fn update_scene(&self, uniform: &SceneUniform) {
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Bytes of mesh and texture data resident on the GPU.
    pub fn resident_bytes(&self) -> usize {
        self.mesh.byte_size + self.texture.byte_size
    }

    pub fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, SurfaceErrorAction> {
        match self.surface.get_current_texture() {
            Ok(t) => Ok(t),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.resize(self.viewport);
                Err(SurfaceErrorAction::Reconfigured)
            }
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceErrorAction::SkipFrame),
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceErrorAction::Fatal),
        }
    }

    pub fn render_surface(&self, view: &wgpu::TextureView, encoder: &mut wgpu::CommandEncoder) {
        let (target, resolve_target) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(view)),
            None => (view, None),
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Surface Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

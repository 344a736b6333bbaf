use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use vase_sketch::config::SketchConfig;
use vase_sketch::geometry::TriangleMesh;
use vase_sketch::logging::{LoggingConfig, init_logging};
use vase_sketch::renderer::texture::{self, TextureImage};
use vase_sketch::renderer::{Camera, GpuState, SceneParams, SceneUniform, SurfaceErrorAction};
use vase_sketch::scene::{Sketch, Viewport};
use vase_sketch::ui::{FrameStats, SceneInfo, apply_theme, draw_overlay};

#[derive(Default)]
struct InputState {
    rotating: bool,
    panning: bool,
    cursor: Option<Vec2>,
}

struct App {
    config: SketchConfig,
    mesh: TriangleMesh,
    pattern: TextureImage,
    scene: SceneParams,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    sketch: Sketch,
    stats: FrameStats,
    input: InputState,
    show_overlay: bool,
}

impl App {
    fn new(config: SketchConfig, mesh: TriangleMesh, pattern: TextureImage) -> Self {
        let shading = &config.shading;
        let scene = SceneParams {
            mode: shading.mode,
            band_count: shading.band_count as f32,
            rotation_x: shading.rotation_x(),
            material: config.material.clone(),
            lights: config.lights.clone(),
        };

        Self {
            camera: Camera::from_config(&config.camera),
            sketch: Sketch::new(shading.increment()),
            show_overlay: config.renderer.show_overlay,
            stats: FrameStats::new(),
            input: InputState::default(),

            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            config,
            mesh,
            pattern,
            scene,
        }
    }

    /// Frames are only requested while there is a renderer to draw them.
    fn wants_redraw(&self) -> bool {
        self.window.is_some() && self.gpu.is_some()
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop, window: Arc<Window>) {
        let viewport = Viewport::from_window(&window);
        let gpu = match pollster::block_on(GpuState::new(
            window.clone(),
            viewport,
            &self.config.renderer,
            &self.mesh,
            &self.pattern,
        )) {
            Ok(gpu) => gpu,
            Err(e) => {
                log::error!("renderer setup failed, nothing will be drawn: {e}");
                event_loop.set_control_flow(ControlFlow::Wait);
                self.window = Some(window);
                return;
            }
        };

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        self.camera.set_aspect(viewport.aspect());
        self.stats.set_resident_bytes(gpu.resident_bytes());

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        self.sketch.start();
    }

    fn handle_resize(&mut self, viewport: Viewport) {
        let Some(gpu) = &mut self.gpu else { return };
        gpu.resize(viewport);
        self.camera.set_aspect(viewport.aspect());
        log::debug!(
            "viewport {}x{} @ {:.2}",
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );
    }

    fn handle_cursor(&mut self, position: Vec2) {
        if let Some(last) = self.input.cursor {
            let delta = position - last;
            if self.input.rotating {
                self.camera.rotate(delta);
            } else if self.input.panning {
                self.camera.pan(delta);
            }
        }
        self.input.cursor = Some(position);
    }

    fn render(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(egui_state), Some(gpu)) =
            (&self.window, &mut self.egui_state, &mut self.gpu)
        else {
            return;
        };
        if gpu.viewport.is_empty() {
            return;
        }

        self.stats.begin(Instant::now());

        // The playhead moves before the uniform write that precedes the draw.
        let playhead = match self.sketch.tick() {
            Some(frame) => frame.playhead,
            None => self.sketch.playhead().as_uniform(),
        };
        gpu.update_scene(&SceneUniform::new(&self.scene, &self.camera, playhead));

        let raw_input = egui_state.take_egui_input(window);
        let info = SceneInfo {
            backend: gpu.backend,
            adapter: &gpu.adapter_name,
            mode: self.scene.mode,
            playhead: self.sketch.playhead().get(),
            frames: self.sketch.frames(),
        };
        let stats = &self.stats;
        let show_overlay = self.show_overlay;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if show_overlay {
                draw_overlay(ctx, stats, &info);
            }
        });

        egui_state.handle_platform_output(window, full_output.platform_output);

        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        let output = match gpu.acquire_frame() {
            Ok(t) => t,
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("out of GPU memory, stopping");
                event_loop.exit();
                return;
            }
            Err(action) => {
                log::debug!("frame skipped: {action:?}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_surface(&view, &mut encoder);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.stats.end(Instant::now());
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                return;
            }
        };
        self.init_gpu(event_loop, window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("closing after {} frames", self.sketch.frames());
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.handle_resize(Viewport::new(size, scale_factor));
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(Viewport::new(size, scale_factor));
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::F1)
                {
                    self.show_overlay = !self.show_overlay;
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.input.rotating = pressed,
                    MouseButton::Right => self.input.panning = pressed,
                    _ => {}
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::CursorLeft { .. } => {
                self.input.cursor = None;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.zoom(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.render(event_loop);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.wants_redraw() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let loaded = SketchConfig::load();
    init_logging(LoggingConfig {
        env_filter: loaded
            .as_ref()
            .ok()
            .and_then(|(config, _)| config.log_filter.clone()),
        ..Default::default()
    });
    let (config, source) = loaded.context("failed to load configuration")?;
    log::info!("{source}");

    let surface = &config.surface;
    let mesh = surface
        .surface()
        .tessellate(surface.slices, surface.stacks)
        .context("failed to tessellate the vase surface")?;
    log::info!(
        "surface {}x{}: {} vertices, {} triangles",
        surface.slices,
        surface.stacks,
        mesh.vertex_count(),
        mesh.index_count() / 3
    );

    let pattern = if config.shading.mode.uses_texture() {
        texture::load_or_generate(config.shading.texture_path.as_deref())
    } else {
        texture::stripe_pattern()
    };
    log::info!(
        "shading mode {}, rotation {} rad",
        config.shading.mode.label(),
        config.shading.rotation_x()
    );

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, mesh, pattern);
    event_loop.run_app(&mut app).context("event loop terminated with an error")?;
    Ok(())
}

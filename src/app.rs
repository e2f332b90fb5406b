use std::iter;

use eframe::egui::ClippedPrimitive;
use wgpu::{
    Backends, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Color, ColorTargetState, ColorWrites, CommandEncoder, CommandEncoderDescriptor,
    CompositeAlphaMode, Device, DeviceDescriptor, Dx12Compiler, Features, FragmentState, Instance,
    InstanceDescriptor, Limits, LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor,
    PowerPreference, PresentMode, PrimitiveState, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions,
    SamplerBindingType, ShaderModuleDescriptor, ShaderSource, ShaderStages, Surface,
    SurfaceConfiguration, SurfaceError, TextureFormat, TextureSampleType, TextureUsages,
    TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::error::VisualizerError;
use crate::texture::CanvasTexture;
use crate::visualizer::canvas::Canvas;
use crate::visualizer::sampler::FrameStats;

// sRGB를 써야 캔버스 색이 의도한 밝기로 나옴
fn pick_surface_format(formats: &[TextureFormat]) -> Result<TextureFormat, VisualizerError> {
    formats
        .iter()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .ok_or(VisualizerError::NoSurfaceFormat)
}

/// 오른쪽 패널에 보여주거나 패널에서 바꿀 수 있는 값들
#[derive(Debug, Default, Clone)]
pub struct PanelState {
    pub stats: FrameStats,
    pub pool_capacity: usize,
    pub debug_rays: bool,
    pub grab_mouse: bool,
}

pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    // 무조건 winit의 Window를 쓸 것!
    pub window: Window,
    canvas_texture: CanvasTexture,
    blit_pipeline: RenderPipeline,
    blit_layout: BindGroupLayout,
    blit_bind_group: BindGroup,
    egui_state: egui_winit::State,
    egui_context: eframe::egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,
}

impl Application {
    pub async fn new(window: Window, event_loop: &EventLoop<()>) -> Result<Self, VisualizerError> {
        let size = window.inner_size();

        // 아무 백엔드나 상관 없는 instance 요청
        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // surface는 window보다 먼저 사라져야 함. 둘 다 Application이 가지고 있으니 괜찮음
        let surface = unsafe { instance.create_surface(&window) }?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(VisualizerError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    // 브라우저에선 webgl2 기준 채택
                    limits: if cfg!(target_arch = "wasm32") {
                        Limits::downlevel_webgl2_defaults()
                    } else {
                        Limits::default()
                    },
                    label: Some("Visualizer GPU"),
                },
                None,
            )
            .await?;

        let capabilities = surface.get_capabilities(&adapter);

        let surface_format = pick_surface_format(&capabilities.formats)?;
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let canvas_texture = CanvasTexture::new(&device, size.width, size.height, "Canvas");

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Canvas Blit Shader"),
            source: ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        let blit_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Canvas Blit Layout"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        view_dimension: TextureViewDimension::D2,
                        sample_type: TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Canvas Blit Pipeline Layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });

        // 정점 버퍼 없이 vertex_index로 화면 전체 삼각형을 만듦
        let blit_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Canvas Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
        });

        let blit_bind_group = Self::create_blit_bind_group(&device, &blit_layout, &canvas_texture);

        let egui_state = egui_winit::State::new(event_loop);
        let egui_context = eframe::egui::Context::default();

        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            None, // 깊이 안씀
            1,    // 멀티 샘플링 1번만 할꺼임
        );
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: egui_context.pixels_per_point(),
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            canvas_texture,
            blit_pipeline,
            blit_layout,
            blit_bind_group,
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
        })
    }

    fn create_blit_bind_group(device: &Device, layout: &BindGroupLayout, texture: &CanvasTexture) -> BindGroup {
        device.create_bind_group(&BindGroupDescriptor {
            label: Some("Canvas Blit Bind Group"),
            layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&texture.view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        // 텍스쳐가 바뀌면 bind group도 새로
        if self.canvas_texture.resize(&self.device, new_size) {
            self.blit_bind_group =
                Self::create_blit_bind_group(&self.device, &self.blit_layout, &self.canvas_texture);
        }

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    pub fn render(&mut self, canvas: &Canvas, panel: &mut PanelState) -> Result<(), SurfaceError> {
        // 창 크기가 막 바뀐 프레임에는 캔버스와 텍스쳐 크기가 다를 수 있음. 이전 내용을 그대로 씀
        if !self.canvas_texture.upload(&self.queue, canvas) {
            log::trace!("Canvas size {:?} does not match texture, skipping upload", canvas.size());
        }

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        // render_pass가 encoder를 빌려오기 때문에 블록으로 감쌈
        {
            let primitives = self.update_egui(&mut encoder, panel);
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            render_pass.set_pipeline(&self.blit_pipeline);
            render_pass.set_bind_group(0, &self.blit_bind_group, &[]);
            render_pass.draw(0..3, 0..1);

            self.egui_renderer.render(&mut render_pass, &primitives, &self.egui_screen)
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    // true: 패널이 입력을 가져갔으니 카메라로 넘기지 않음
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        let egui_response = self.egui_state.on_event(&self.egui_context, event);
        egui_response.consumed
    }

    pub fn is_hovering_panel(&self) -> bool {
        self.egui_context.is_pointer_over_area()
    }

    fn update_egui(&mut self, encoder: &mut CommandEncoder, panel: &mut PanelState) -> Vec<ClippedPrimitive> {
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let egui_output = self.egui_context.run(egui_input, |ctx| {
            eframe::egui::SidePanel::right("Side Menu")
                .resizable(true)
                .width_range(0.0..=512.0)
                .default_width(180.0)
                .show(ctx, |ui| {
                    let stats = &panel.stats;
                    ui.heading("Frame");
                    ui.label(format!("Rays: {}", stats.rays));
                    ui.label(format!("Hits: {}", stats.hits));
                    ui.label(format!("Quads displayed: {}", stats.quads_displayed));
                    ui.label(format!("Visible quads: {} / {}", stats.visible_quads, panel.pool_capacity));
                    ui.label(format!("Sample time: {:.2} ms", stats.sample_time.as_secs_f64() * 1000.0));

                    ui.separator();
                    ui.checkbox(&mut panel.debug_rays, "Debug rays");
                    ui.label(if panel.grab_mouse {
                        "Mouse look: on (C to release)"
                    } else {
                        "Mouse look: off (C to grab)"
                    });
                });
        });

        self.egui_state.handle_platform_output(&self.window, &self.egui_context, egui_output.platform_output);
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        egui_output.textures_delta.set.iter().for_each(|(id, delta)| {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        });
        egui_output.textures_delta.free.iter().for_each(|id| {
            self.egui_renderer.free_texture(id);
        });

        self.egui_renderer.update_buffers(&self.device, &self.queue, encoder, &primitives, &self.egui_screen);

        primitives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_format_prefers_srgb() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats).ok(), Some(TextureFormat::Bgra8UnormSrgb));

        let linear_only = [TextureFormat::Rgba8Unorm];
        assert_eq!(pick_surface_format(&linear_only).ok(), Some(TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn empty_surface_formats_are_an_error() {
        assert!(matches!(pick_surface_format(&[]), Err(VisualizerError::NoSurfaceFormat)));
    }
}

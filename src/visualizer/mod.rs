use log::info;
use nalgebra::Vector4;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::config::Settings;
use crate::error::VisualizerError;
use crate::visualizer::canvas::Canvas;
use crate::visualizer::debug::DebugLine;
use crate::visualizer::pool::QuadPool;
use crate::visualizer::quad::MeshQuad;
use crate::visualizer::sampler::{FrameStats, SceneSampler};

pub mod canvas;
pub mod debug;
pub mod pool;
pub mod quad;
pub mod ray;
pub mod sampler;
pub mod scene;

pub struct Visualizer {
    canvas: Canvas,
    pool: QuadPool<MeshQuad>,
    sampler: SceneSampler,
    debug_rays: bool,
    debug_lines: Vec<DebugLine>,
}

impl Visualizer {
    pub fn new(settings: &Settings, viewport_size: PhysicalSize<u32>) -> Result<Self, VisualizerError> {
        let sampler = SceneSampler::new(settings)?;
        let pool = QuadPool::new(settings.pool_capacity, |_| MeshQuad::default())?;
        let canvas = Canvas::new(viewport_size.width, viewport_size.height)?;

        let (width, height) = sampler.grid_size();
        info!(
            "Sampling a {}x{} grid into a pool of {} quads",
            width,
            height,
            pool.capacity()
        );

        Ok(Self {
            canvas,
            pool,
            sampler,
            debug_rays: settings.debug_rays,
            debug_lines: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.canvas.resize(new_size.width, new_size.height);
    }

    /// 한 프레임: 광선을 쏘아 풀을 갱신하고, 보이는 사각형을 캔버스에 그림
    pub fn update(&mut self, camera: Option<&Camera>) -> FrameStats {
        self.debug_lines.clear();

        let stats = if self.debug_rays {
            self.sampler.sample(&mut self.pool, camera, &mut self.debug_lines)
        } else {
            self.sampler.sample(&mut self.pool, camera, &mut ())
        };

        self.canvas.clear(&Vector4::new(0.0, 0.0, 0.0, 1.0));

        // 카메라가 없으면 이번 프레임은 그리지 않음
        let Some(camera) = camera else {
            return stats;
        };

        for mesh in self.pool.visible().filter_map(|entity| entity.renderer.mesh()) {
            self.canvas.draw_quad(mesh, camera);
        }

        for line in &self.debug_lines {
            self.canvas.draw_line(line, camera);
        }

        stats
    }

    pub fn set_debug_rays(&mut self, enabled: bool) {
        self.debug_rays = enabled;
    }

    pub fn debug_rays(&self) -> bool {
        self.debug_rays
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn pool(&self) -> &QuadPool<MeshQuad> {
        &self.pool
    }
}

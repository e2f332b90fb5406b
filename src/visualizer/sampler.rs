use std::time::Duration;

use log::debug;
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use web_time::Instant;

use crate::camera::Camera;
use crate::config::Settings;
use crate::error::VisualizerError;
use crate::visualizer::debug::{DebugLine, DebugLineSink};
use crate::visualizer::pool::QuadPool;
use crate::visualizer::quad::QuadRenderer;
use crate::visualizer::ray::Ray;
use crate::visualizer::scene::{Light, Sphere};

// 디버그 선 색. 맞으면 자홍색, 빗나가면 거의 투명한 검은색
fn ray_color(hit: bool) -> Vector4<f32> {
    if hit {
        Vector4::new(1.0, 0.0, 1.0, 0.01)
    } else {
        Vector4::new(0.0, 0.0, 0.0, 0.001)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub rays: u32,
    pub hits: u32,
    pub quads_displayed: u32,
    pub visible_quads: usize,
    pub sample_time: Duration,
}

/// 고정된 격자에서 광선을 쏘아 구에 맞은 점마다 사각형을 띄움.
/// 프레임마다 처음부터 다시 계산하고 이전 프레임 결과는 기억하지 않음.
pub struct SceneSampler {
    width: u32,
    height: u32,
    aspect_ratio: f32,
    ray_origin: Point3<f32>,
    pub sphere: Sphere,
    pub light: Light,
    quad_size: f32,
    debug_ray_length: f32,
}

impl SceneSampler {
    pub fn new(settings: &Settings) -> Result<Self, VisualizerError> {
        let (width, height) = (settings.grid_width, settings.grid_height);
        if width == 0 || height == 0 {
            return Err(VisualizerError::InvalidGrid { width, height });
        }

        Ok(Self {
            width,
            height,
            aspect_ratio: width as f32 / height as f32,
            ray_origin: settings.ray_origin,
            sphere: Sphere {
                position: settings.sphere_center,
                radius: settings.sphere_radius,
                albedo: settings.hit_color,
            },
            light: Light::new(settings.light_direction)?,
            quad_size: settings.quad_size,
            debug_ray_length: settings.debug_ray_length,
        })
    }

    pub fn grid_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // -Z 방향을 보는 가상 카메라의 (x, y) 픽셀 광선
    pub fn ray_for(&self, x: u32, y: u32) -> Ray {
        let mut coord = Vector2::new(x as f32 / self.width as f32, y as f32 / self.height as f32);
        coord *= 2.0;
        coord -= Vector2::new(1.0, 1.0); // -1 -> 1
        coord.x *= self.aspect_ratio;

        Ray::new(self.ray_origin, Vector3::new(coord.x, coord.y, -1.0))
    }

    /// 격자 전체를 한 번 훑음. 두 교점 모두 깊이 비교 없이 그대로 풀에 넘김.
    pub fn sample<Q: QuadRenderer>(
        &self,
        pool: &mut QuadPool<Q>,
        camera: Option<&Camera>,
        debug_lines: &mut impl DebugLineSink,
    ) -> FrameStats {
        let started = Instant::now();
        let mut stats = FrameStats::default();

        for y in 0..self.height {
            for x in 0..self.width {
                let ray = self.ray_for(x, y);
                stats.rays += 1;

                let mut hit = false;

                if let Some(distances) = self.sphere.trace(&ray) {
                    for distance in distances {
                        let hit_position = ray.at(distance);
                        let normal = self.sphere.normal_at(&hit_position);
                        let color = self.light.shade(&normal, &self.sphere.albedo);

                        pool.display(camera, hit_position, self.quad_size, color);
                        stats.quads_displayed += 1;
                    }

                    stats.hits += 1;
                    hit = true;
                }

                debug_lines.push_line(DebugLine {
                    start: ray.origin,
                    end: ray.at(self.debug_ray_length),
                    color: ray_color(hit),
                });
            }
        }

        stats.visible_quads = pool.visible_count();
        stats.sample_time = started.elapsed();

        debug!(
            "Sampled {} rays, {} hits, {} quads in {:?}",
            stats.rays, stats.hits, stats.quads_displayed, stats.sample_time
        );

        stats
    }
}

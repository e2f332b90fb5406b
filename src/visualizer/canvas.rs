use std::path::Path;

use bytemuck::cast_slice;
use nalgebra::{Point3, Vector4};

use crate::camera::Camera;
use crate::error::VisualizerError;
use crate::util::{rgba_to_vec4, vec4_to_rgba};
use crate::visualizer::debug::DebugLine;
use crate::visualizer::quad::QuadMesh;

type ScreenPoint = (f32, f32, f32);

/// 사각형 메시를 그리는 CPU 렌더러. 불투명한 Unlit 머티리얼처럼 색만 칠하고 깊이 테스트를 함.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    depth: Vec<f32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, VisualizerError> {
        if width == 0 || height == 0 {
            return Err(VisualizerError::InvalidViewport { width, height });
        }

        let count = pixel_count(width, height);
        Ok(Self {
            width,
            height,
            pixels: vec![0; count],
            depth: vec![f32::INFINITY; count],
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (self.width == width && self.height == height) {
            return;
        }

        let count = pixel_count(width, height);
        self.width = width;
        self.height = height;
        self.pixels = vec![0; count];
        self.depth = vec![f32::INFINITY; count];
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear(&mut self, color: &Vector4<f32>) {
        self.pixels.fill(vec4_to_rgba(color));
        self.depth.fill(f32::INFINITY);
    }

    /// 알파는 무시함
    pub fn draw_quad(&mut self, mesh: &QuadMesh, camera: &Camera) {
        let color = vec4_to_rgba(&Vector4::new(mesh.color.x, mesh.color.y, mesh.color.z, 1.0));

        for triangle in mesh.triangles() {
            let Some(projected) = self.project_all(&triangle, camera) else {
                continue;
            };
            self.fill_triangle(projected, color);
        }
    }

    /// 깊이 테스트 없이 알파 블렌딩으로 덧그림
    pub fn draw_line(&mut self, line: &DebugLine, camera: &Camera) {
        let Some([(x0, y0, _), (x1, y1, _)]) = self.project_all(&[line.start, line.end], camera) else {
            return;
        };

        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            if let Some(index) = self.index_of(x, y) {
                let below = rgba_to_vec4(self.pixels[index]);
                let alpha = line.color.w.clamp(0.0, 1.0);
                let blended = line.color * alpha + below * (1.0 - alpha);
                self.pixels[index] = vec4_to_rgba(&Vector4::new(blended.x, blended.y, blended.z, 1.0));
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.offset(x, y)].to_ne_bytes())
    }

    /// 한 줄씩 RGBA8
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.pixels)
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), VisualizerError> {
        image::save_buffer_with_format(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }

    // 카메라 화면 크기와 캔버스 크기가 다르면 비율대로 늘림
    fn project_all<const N: usize>(&self, points: &[Point3<f32>; N], camera: &Camera) -> Option<[ScreenPoint; N]> {
        let viewport = camera.viewport_size();
        let scale_x = self.width as f32 / viewport.width as f32;
        let scale_y = self.height as f32 / viewport.height as f32;

        let mut projected = [(0.0, 0.0, 0.0); N];
        for (point, screen) in points.iter().zip(projected.iter_mut()) {
            let (x, y, depth) = camera.project(point)?;
            *screen = (x * scale_x, y * scale_y, depth);
        }
        Some(projected)
    }

    // u32끼리 곱하면 큰 화면에서 넘침
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn index_of(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        (x < self.width && y < self.height).then(|| self.offset(x, y))
    }

    fn fill_triangle(&mut self, [a, b, c]: [ScreenPoint; 3], color: u32) {
        let area = edge(a, b, (c.0, c.1));
        if area.abs() <= f32::EPSILON {
            return;
        }

        let min_x = a.0.min(b.0).min(c.0).floor().max(0.0) as u32;
        let min_y = a.1.min(b.1).min(c.1).floor().max(0.0) as u32;
        let max_x = a.0.max(b.0).max(c.0).ceil().min(self.width as f32) as u32;
        let max_y = a.1.max(b.1).max(c.1).ceil().min(self.height as f32) as u32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                // 픽셀 중심에서 판정
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, p) / area;
                let w1 = edge(c, a, p) / area;
                let w2 = edge(a, b, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.2 + w1 * b.2 + w2 * c.2;
                let index = self.offset(x, y);
                if depth < self.depth[index] {
                    self.depth[index] = depth;
                    self.pixels[index] = color;
                }
            }
        }
    }
}

// a -> b 선분 기준으로 p가 어느 쪽에 있는지 (넓이의 두 배)
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn edge(a: ScreenPoint, b: ScreenPoint, p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

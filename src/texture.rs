use wgpu::{
    Device, Extent3d, FilterMode, ImageCopyTexture, ImageDataLayout, Origin3d, Queue, Sampler,
    SamplerDescriptor, Texture, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureView, TextureViewDescriptor,
};
use winit::dpi::PhysicalSize;

use crate::visualizer::canvas::Canvas;

// CPU 캔버스를 GPU로 옮겨 담는 텍스쳐
pub struct CanvasTexture {
    pub gpu_texture: Texture,
    pub view: TextureView,
    pub sampler: Sampler,
    pub name: String,
}

impl CanvasTexture {
    pub fn new(device: &Device, width: u32, height: u32, label: &str) -> Self {
        let gpu_texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1, // 단순한 2차원 이미지니 1개
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,

            // Texture Binding: 전체 화면 쉐이더에서 읽음
            // Copy destination: 매 프레임 CPU에서 GPU로 복사됨
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = gpu_texture.create_view(&TextureViewDescriptor {
            label: Some(&format!("{} view", label)),
            ..Default::default()
        });

        // 사각형 경계가 뭉개지지 않도록 확대/축소 모두 가장 가까운 픽셀 사용
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some(&format!("{} sampler", label)),
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu_texture,
            view,
            sampler,
            name: label.to_string(),
        }
    }

    /// 캔버스와 텍스쳐 크기가 다르면 아무것도 안함. 먼저 resize 할 것
    pub fn upload(&self, queue: &Queue, canvas: &Canvas) -> bool {
        let (width, height) = canvas.size();
        if self.size() != PhysicalSize::new(width, height) {
            return false;
        }

        queue.write_texture(
            ImageCopyTexture {
                texture: &self.gpu_texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            canvas.as_bytes(),
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            self.gpu_texture.size(),
        );

        true
    }

    /// 새로 만들었으면 true. bind group도 다시 만들어야 함
    pub fn resize(&mut self, device: &Device, new_size: PhysicalSize<u32>) -> bool {
        if self.size() == new_size || new_size.width == 0 || new_size.height == 0 {
            return false;
        }

        *self = Self::new(device, new_size.width, new_size.height, &self.name);
        true
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.gpu_texture.width(), self.gpu_texture.height())
    }
}

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum VisualizerError {
    /// 풀 크기가 0이면 재사용할 사각형이 없음
    #[error("quad pool capacity must be greater than zero")]
    EmptyPool,

    #[error("light direction must not be the zero vector")]
    DegenerateLight,

    #[error("sampling grid must be non-empty, got {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },

    #[error("viewport must be non-empty, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

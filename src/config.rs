#[cfg(not(target_arch = "wasm32"))]
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::VisualizerError;

/// 설정 파일 경로를 바꾸고 싶으면 이 환경 변수를 지정
pub const CONFIG_ENV: &str = "VISUALIZER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "visualizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

// 파일에 없는 항목은 전부 기본값으로 채움
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: u32,
    pub grid_height: u32,
    pub pool_capacity: usize,
    pub quad_size: f32,

    pub sphere_center: Point3<f32>,
    pub sphere_radius: f32,
    pub hit_color: Vector3<f32>,
    pub ray_origin: Point3<f32>,
    pub light_direction: Vector3<f32>,

    pub debug_rays: bool,
    pub debug_ray_length: f32,

    /// 지정되어 있으면 창을 띄우지 않고 PNG로 저장
    pub headless_output: Option<PathBuf>,
    pub headless_frames: u32,

    // TOML에선 테이블이 값들 뒤에 와야 하니 마지막에 둠
    pub viewport: ViewportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: 320,
            grid_height: 180,
            pool_capacity: 5000,
            quad_size: 0.03,
            sphere_center: Point3::origin(),
            sphere_radius: 0.5,
            hit_color: Vector3::new(0.0, 1.0, 0.0),
            ray_origin: Point3::new(0.0, 0.0, 2.0),
            light_direction: Vector3::new(-1.0, -1.0, 1.0),
            debug_rays: false,
            debug_ray_length: 2.0,
            viewport: ViewportSettings::default(),
            headless_output: None,
            headless_frames: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
    /// 도 단위
    pub vertical_fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        // 빛을 받는 구의 뒷면이 보이도록 구 뒤쪽에서 바라봄
        Self {
            width: 1280,
            height: 720,
            vertical_fov: 60.0,
            near: 0.01,
            far: 100.0,
            position: Point3::new(0.0, 0.0, -2.5),
            target: Point3::origin(),
        }
    }
}

impl Settings {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// 파일이 없으면 기본값 사용
    pub fn load(path: &Path) -> Result<Self, VisualizerError> {
        let settings = match read_source(path)? {
            Some(source) => {
                info!("Loading settings from {}", path.display());
                Self::from_toml(&source)?
            }
            None => {
                info!("{} not available, using default settings", path.display());
                Self::default()
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn validate(&self) -> Result<(), VisualizerError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(VisualizerError::InvalidGrid {
                width: self.grid_width,
                height: self.grid_height,
            });
        }

        if self.pool_capacity == 0 {
            return Err(VisualizerError::EmptyPool);
        }

        if self.light_direction.magnitude_squared() <= f32::EPSILON {
            return Err(VisualizerError::DegenerateLight);
        }

        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VisualizerError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        Ok(())
    }
}

// 브라우저에는 파일 시스템이 없으니 읽지 않음
#[cfg(target_arch = "wasm32")]
fn read_source(_path: &Path) -> Result<Option<String>, ConfigError> {
    Ok(None)
}

#[cfg(not(target_arch = "wasm32"))]
fn read_source(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(Some(source)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let settings = Settings::default();

        assert_eq!((settings.grid_width, settings.grid_height), (320, 180));
        assert_eq!(settings.pool_capacity, 5000);
        assert_eq!(settings.sphere_radius, 0.5);
        assert_eq!(settings.ray_origin, Point3::new(0.0, 0.0, 2.0));
        assert_eq!(settings.light_direction, Vector3::new(-1.0, -1.0, 1.0));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            grid_width = 64
            debug_rays = true

            [viewport]
            position = [1.0, 2.0, 3.0]
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.grid_width, 64);
        assert_eq!(settings.grid_height, 180);
        assert!(settings.debug_rays);
        assert_eq!(settings.viewport.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(settings.viewport.width, 1280);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let result = Settings::from_toml("grid_width = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let empty_grid = Settings {
            grid_height: 0,
            ..Default::default()
        };
        assert!(matches!(
            empty_grid.validate(),
            Err(VisualizerError::InvalidGrid { width: 320, height: 0 })
        ));

        let empty_pool = Settings {
            pool_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(empty_pool.validate(), Err(VisualizerError::EmptyPool)));

        let dark = Settings {
            light_direction: Vector3::zeros(),
            ..Default::default()
        };
        assert!(matches!(dark.validate(), Err(VisualizerError::DegenerateLight)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = Settings::load(Path::new("definitely/not/here/visualizer.toml"))
            .expect("missing file is not an error");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        // 디렉터리는 존재하지만 문자열로 읽을 수 없음
        let result = read_source(Path::new("src"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));

        assert!(matches!(read_source(Path::new("definitely/not/here.toml")), Ok(None)));
    }
}

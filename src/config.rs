//! Sketch settings.
//!
//! Loaded from `config/sketch.json` (or the path in `VASE_SKETCH_CONFIG`);
//! a missing file means defaults. Every field is optional in the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{ProfileCurve, RevolutionSurface};
use crate::scene::ShadingMode;
use crate::scene::shading::DEFAULT_BAND_COUNT;

pub const CONFIG_ENV_VAR: &str = "VASE_SKETCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/sketch.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub surface: SurfaceConfig,
    pub shading: ShadingConfig,
    pub material: MaterialConfig,
    pub lights: LightConfig,
    pub renderer: RendererConfig,

    /// `env_logger` filter; `RUST_LOG` still takes precedence
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,

    /// Initial inner size in physical pixels
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "vase sketch".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,

    /// Starting eye position
    pub position: [f32; 3],

    /// Orbit center
    pub target: [f32; 3],

    /// Radians per dragged pixel
    pub rotate_speed: f32,

    /// Distance factor per wheel notch
    pub zoom_step: f32,

    /// Target movement per dragged pixel, relative to the orbit distance
    pub pan_speed: f32,

    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.01,
            far: 100.0,
            position: [0.0, -1.0, 20.0],
            target: [0.0, 0.0, 0.0],
            rotate_speed: 0.005,
            zoom_step: 0.95,
            pan_speed: 0.0015,
            min_distance: 0.5,
            max_distance: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Bezier control points of the radius profile
    pub control_points: [f64; 4],

    /// Length of the vase along its axis
    pub depth_scale: f64,

    /// Segments around the axis
    pub slices: usize,

    /// Segments along the axis
    pub stacks: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            control_points: [70.0, 1.0, 1.0, 1.0],
            depth_scale: 15.0,
            slices: 325,
            stacks: 325,
        }
    }
}

impl SurfaceConfig {
    pub fn surface(&self) -> RevolutionSurface {
        RevolutionSurface::new(ProfileCurve::new(self.control_points), self.depth_scale)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    pub mode: ShadingMode,

    /// Playhead step per frame; the mode's default when absent
    pub increment: Option<f64>,

    /// Mesh rotation around X in radians; the mode's default when absent
    pub rotation_x: Option<f32>,

    pub band_count: f64,

    /// Bitmap for the texture scroll mode; a generated pattern when absent
    pub texture_path: Option<PathBuf>,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            mode: ShadingMode::default(),
            increment: None,
            rotation_x: None,
            band_count: DEFAULT_BAND_COUNT,
            texture_path: None,
        }
    }
}

impl ShadingConfig {
    pub fn increment(&self) -> f64 {
        self.increment.unwrap_or_else(|| self.mode.default_increment())
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation_x.unwrap_or_else(|| self.mode.default_rotation_x())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// sRGB channels as in a hex color, used where the shading mode doesn't
    /// replace it
    pub base_color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            base_color: [0.0, 0.0, 0x99 as f32 / 255.0],
            roughness: 0.5,
            metalness: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub point_position: [f32; 3],
    pub point_color: [f32; 3],
    pub point_intensity: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            point_position: [10.0, 10.0, 10.0],
            point_color: [1.0, 1.0, 1.0],
            point_intensity: 100.0,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// sRGB channels as in a hex color
    pub clear_color: [f64; 3],

    /// 1 or 4; unsupported counts drop to 1
    pub msaa_samples: u32,

    /// Fifo presentation when enabled
    pub vsync: bool,

    /// Start with the stats overlay visible (F1 toggles)
    pub show_overlay: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        let grey = 0xee as f64 / 255.0;
        Self {
            clear_color: [grey, grey, grey],
            msaa_samples: 4,
            vsync: true,
            show_overlay: true,
        }
    }
}

/// Where a loaded [`SketchConfig`] came from.
///
/// Config is read before the logger exists, so the caller reports this once
/// logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { missing: PathBuf },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "loaded configuration from {}", path.display()),
            Self::Defaults { missing } => {
                write!(f, "no config at {}, using defaults", missing.display())
            }
        }
    }
}

impl SketchConfig {
    /// Loads from `VASE_SKETCH_CONFIG` or `config/sketch.json`, defaults if
    /// neither exists.
    pub fn load() -> Result<(Self, ConfigSource), ConfigError> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_or_default(&path)
    }

    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if !path.exists() {
            let source = ConfigSource::Defaults {
                missing: path.to_path_buf(),
            };
            return Ok((Self::default(), source));
        }

        let config = Self::load_from(path)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "inline json")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: SketchConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.shading.band_count.is_finite() && self.shading.band_count >= 1.0) {
            return invalid(format!(
                "shading.band_count must be >= 1, got {}",
                self.shading.band_count
            ));
        }
        if let Some(increment) = self.shading.increment {
            if !increment.is_finite() {
                return invalid("shading.increment must be finite".to_string());
            }
        }
        if self.surface.slices == 0 || self.surface.stacks == 0 {
            return invalid(format!(
                "surface resolution must be positive, got {}x{}",
                self.surface.slices, self.surface.stacks
            ));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid(format!(
                "camera clip range must satisfy 0 < near < far, got {}..{}",
                self.camera.near, self.camera.far
            ));
        }
        if !(self.camera.min_distance > 0.0 && self.camera.max_distance >= self.camera.min_distance)
        {
            return invalid("camera distance limits must satisfy 0 < min <= max".to_string());
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                self.camera.fov_degrees
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = SketchConfig::from_json_str("{}").unwrap();
        assert_eq!(config.surface.control_points, [70.0, 1.0, 1.0, 1.0]);
        assert_eq!(config.surface.depth_scale, 15.0);
        assert_eq!((config.surface.slices, config.surface.stacks), (325, 325));
        assert_eq!(config.camera.position, [0.0, -1.0, 20.0]);
        assert_eq!(config.shading.mode, ShadingMode::TextureScroll);
        assert_eq!(config.shading.band_count, 20.0);
        assert_eq!(config.renderer.msaa_samples, 4);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SketchConfig::from_json_str(
            r#"{ "shading": { "mode": "banded" }, "surface": { "slices": 64 } }"#,
        )
        .unwrap();

        assert_eq!(config.shading.mode, ShadingMode::Banded);
        assert_eq!(config.shading.increment(), -0.001);
        assert_eq!(config.shading.rotation_x(), -1.0);
        assert_eq!(config.surface.slices, 64);
        assert_eq!(config.surface.stacks, 325);
        assert_eq!(config.lights.point_intensity, 100.0);
    }

    #[test]
    fn explicit_increment_overrides_the_mode_default() {
        let config = SketchConfig::from_json_str(
            r#"{ "shading": { "mode": "striped", "increment": -0.002 } }"#,
        )
        .unwrap();
        assert_eq!(config.shading.increment(), -0.002);
        assert_eq!(config.shading.rotation_x(), -2.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SketchConfig::from_json_str("{ \"window\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_bands_are_rejected() {
        let err = SketchConfig::from_json_str(r#"{ "shading": { "band_count": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_clip_range_is_rejected() {
        let json = r#"{ "camera": { "near": 10.0, "far": 1.0 } }"#;
        let err = SketchConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("near < far"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = SketchConfig::load_from(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn absent_file_reports_defaults() {
        let path = Path::new("does/not/exist.json");
        let (config, source) = SketchConfig::load_or_default(path).unwrap();
        assert_eq!(config.surface.slices, 325);
        assert_eq!(
            source,
            ConfigSource::Defaults {
                missing: path.to_path_buf()
            }
        );
        assert_eq!(source.to_string(), "no config at does/not/exist.json, using defaults");
    }

    #[test]
    fn present_file_reports_its_path() {
        let path = std::env::temp_dir().join("vase_sketch_config_source.json");
        fs::write(&path, r#"{ "shading": { "mode": "striped" } }"#).unwrap();

        let (config, source) = SketchConfig::load_or_default(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.shading.mode, ShadingMode::Striped);
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = SketchConfig::default();
        config.shading.texture_path = Some(PathBuf::from("assets/pattern.png"));
        let json = serde_json::to_string(&config).unwrap();
        let back = SketchConfig::from_json_str(&json).unwrap();
        assert_eq!(back.shading.texture_path, config.shading.texture_path);
        assert_eq!(back.window.title, "vase sketch");
    }

    #[test]
    fn surface_uses_the_configured_profile() {
        let config = SketchConfig::from_json_str(
            r#"{ "surface": { "control_points": [10, 2, 2, 2], "depth_scale": 4 } }"#,
        )
        .unwrap();
        let p = config.surface.surface().point(0.0, 1.0);
        assert!((p.y - 2.0).abs() < 1e-9);
        assert!((p.z - 2.0).abs() < 1e-9);
    }
}

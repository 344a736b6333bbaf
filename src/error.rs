use std::path::PathBuf;

use thiserror::Error;

pub use crate::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config from {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load texture {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("texture {width}x{height} has no pixels")]
    Empty { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no {backends:?} adapter can present to this window")]
    NoAdapter { backends: wgpu::Backends },
    #[error("failed to open device on {adapter}: {source}")]
    Device {
        adapter: String,
        source: wgpu::RequestDeviceError,
    },
}

pub mod backend;
pub mod camera;
pub mod gpu;
pub mod texture;

pub use backend::{BackendKind, Capability};
pub use camera::Camera;
pub use gpu::{GpuState, SceneParams, SceneUniform, SurfaceErrorAction};
pub use texture::{SceneTexture, TextureImage};

pub mod playhead;
pub mod shading;
pub mod sketch;
pub mod viewport;

pub use playhead::Playhead;
pub use shading::ShadingMode;
pub use sketch::{Frame, Sketch, SketchState};
pub use viewport::Viewport;

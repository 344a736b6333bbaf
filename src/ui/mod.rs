pub mod overlay;
pub mod stats;
pub mod theme;

pub use overlay::{SceneInfo, draw_overlay};
pub use stats::FrameStats;
pub use theme::apply_theme;

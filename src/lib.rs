pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod renderer;
pub mod scene;
pub mod ui;

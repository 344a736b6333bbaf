//! Shading modes and the CPU side of the fragment math.
//!
//! The functions here mirror `renderer/shaders.wgsl`; keep the two in sync.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BAND_COUNT: f64 = 20.0;

const HASH_FREQUENCY: f64 = 125.0;
const HASH_SCALE: f64 = 456789.123;
const STRIPE_REPEAT_U: f64 = 7.0;
const SCROLL_REPEAT_V: f64 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingMode {
    /// Vertical coordinate banded into stripes, stripe index drives red.
    Banded,
    /// Bitmap scrolled vertically, each band also sliding sideways at a
    /// hashed per-band speed; drives color and roughness.
    Striped,
    /// Tiled bitmap scrolled vertically, drives color and roughness.
    #[default]
    TextureScroll,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 3] = [Self::Banded, Self::Striped, Self::TextureScroll];

    pub fn default_increment(self) -> f64 {
        match self {
            Self::Banded => -0.001,
            Self::Striped | Self::TextureScroll => 0.0005,
        }
    }

    /// Rotation of the mesh around X, in radians.
    pub fn default_rotation_x(self) -> f32 {
        match self {
            Self::Banded => -1.0,
            Self::Striped | Self::TextureScroll => -2.0,
        }
    }

    /// Value of `scene.mode.x` in the shader.
    pub fn shader_index(self) -> u32 {
        match self {
            Self::Banded => 0,
            Self::Striped => 1,
            Self::TextureScroll => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Banded => "banded",
            Self::Striped => "striped",
            Self::TextureScroll => "texture scroll",
        }
    }

    pub fn uses_texture(self) -> bool {
        matches!(self, Self::Striped | Self::TextureScroll)
    }
}

fn fract(x: f64) -> f64 {
    x - x.floor()
}

pub fn band_index(y: f64, playhead: f64, band_count: f64) -> f64 {
    (fract(y + playhead) * band_count).floor()
}

pub fn stripe_hash(row: f64) -> f64 {
    fract((row * HASH_FREQUENCY).sin() * HASH_SCALE).abs()
}

pub fn banded_color(y: f64, playhead: f64, band_count: f64) -> [f64; 3] {
    [band_index(y, playhead, band_count) / 10.0, 0.0, 0.0]
}

/// Texture coordinate sampled by the scroll mode (the sampler repeats).
pub fn scroll_uv(uv: [f64; 2], playhead: f64) -> [f64; 2] {
    [uv[0] * STRIPE_REPEAT_U, uv[1] * SCROLL_REPEAT_V + playhead]
}

/// Texture coordinate of the striped mode: the scroll coordinate shifted
/// along u by `playhead * hash(band)`.
pub fn striped_uv(uv: [f64; 2], playhead: f64, band_count: f64) -> [f64; 2] {
    let row = band_index(uv[1], playhead, band_count);
    let [u, v] = scroll_uv(uv, playhead);
    [u + playhead * stripe_hash(row), v]
}

/// Color and roughness of both textured modes, from the sampled red channel.
pub fn pattern_value(red: f64) -> f64 {
    1.0 - red
}

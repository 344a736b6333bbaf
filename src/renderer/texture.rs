use std::path::Path;

use crate::error::TextureError;

const PATTERN_SIZE: u32 = 256;
const PATTERN_STRIPE: u32 = 16;

/// RGBA8 pixels ready for upload.
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

pub fn load_image(path: &Path) -> Result<TextureImage, TextureError> {
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty { width, height });
    }

    Ok(TextureImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Diagonal light/dark stripes. The period divides the size, so it tiles.
pub fn stripe_pattern() -> TextureImage {
    let (w, h) = (PATTERN_SIZE, PATTERN_SIZE);
    let mut pixels = Vec::<u8>::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let c = if ((x + y) / PATTERN_STRIPE) % 2 == 0 {
                235
            } else {
                20
            };
            pixels.extend_from_slice(&[c, c, c, 255]);
        }
    }

    TextureImage {
        width: w,
        height: h,
        pixels,
    }
}

/// Loads `path` when given; any failure is logged and replaced by the
/// generated pattern so the scroll mode always has something to sample.
pub fn load_or_generate(path: Option<&Path>) -> TextureImage {
    let Some(path) = path else {
        return stripe_pattern();
    };

    match load_image(path) {
        Ok(image) => {
            log::info!(
                "loaded texture {} ({}x{})",
                path.display(),
                image.width,
                image.height
            );
            image
        }
        Err(e) => {
            log::warn!("{e}; using generated stripe pattern");
            stripe_pattern()
        }
    }
}

/// Texture plus repeat-wrapping sampler, as bound by the surface pipeline.
pub struct SceneTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub byte_size: usize,
}

impl SceneTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        // Raw values: the shader reads the red channel as data, not color.
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Pattern Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Pattern Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            view,
            sampler,
            byte_size: image.byte_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_at(image: &TextureImage, x: u32, y: u32) -> u8 {
        image.pixels[((y * image.width + x) * 4) as usize]
    }

    #[test]
    fn pattern_has_expected_shape() {
        let image = stripe_pattern();
        assert_eq!((image.width, image.height), (256, 256));
        assert_eq!(image.byte_size(), 256 * 256 * 4);
        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn pattern_tiles_without_a_seam() {
        let image = stripe_pattern();
        let period = PATTERN_STRIPE * 2;
        for y in 0..image.height {
            for x in 0..image.width {
                let shifted = (x + period) % image.width;
                assert_eq!(red_at(&image, x, y), red_at(&image, shifted, y));
            }
        }
        assert_eq!(red_at(&image, 0, 0), 235);
        assert_eq!(red_at(&image, 20, 0), 20);
    }

    #[test]
    fn pattern_contains_both_levels() {
        let image = stripe_pattern();
        let reds: Vec<u8> = image.pixels.chunks_exact(4).map(|px| px[0]).collect();
        assert!(reds.contains(&235));
        assert!(reds.contains(&20));
    }

    #[test]
    fn missing_file_falls_back_to_the_pattern() {
        let image = load_or_generate(Some(Path::new("no/such/texture.png")));
        assert_eq!((image.width, image.height), (PATTERN_SIZE, PATTERN_SIZE));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_image(Path::new("no/such/texture.png")).err().unwrap();
        assert!(matches!(err, TextureError::Load { .. }));
    }
}

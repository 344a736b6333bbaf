use winit::dpi::PhysicalSize;

/// Snapshot of the drawable area, rebuilt on every resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        Self {
            width: size.width,
            height: size.height,
            scale_factor,
        }
    }

    pub fn from_window(window: &winit::window::Window) -> Self {
        Self::new(window.inner_size(), window.scale_factor())
    }

    /// A minimized window reports a zero extent; nothing should be configured then.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn physical_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.width, self.height)
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 / self.scale_factor,
            self.height as f64 / self.scale_factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_a_wide_window() {
        let viewport = Viewport::new(PhysicalSize::new(1600, 900), 1.0);
        assert!((viewport.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn minimized_window_is_empty_and_keeps_a_sane_aspect() {
        let viewport = Viewport::new(PhysicalSize::new(1600, 0), 2.0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn logical_size_divides_by_scale() {
        let viewport = Viewport::new(PhysicalSize::new(2000, 1000), 2.0);
        assert_eq!(viewport.logical_size(), (1000.0, 500.0));
        assert_eq!(viewport.physical_size(), PhysicalSize::new(2000, 1000));
    }
}

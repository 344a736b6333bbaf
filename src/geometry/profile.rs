/// Cubic bezier evaluated over scalar control points.
#[inline(always)]
pub fn bezier(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * a + 3.0 * u * u * t * b + 3.0 * u * t * t * c + t * t * t * d
}

/// Radius profile of the vase, mapping the longitudinal parameter to a radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileCurve {
    control_points: [f64; 4],
}

impl Default for ProfileCurve {
    fn default() -> Self {
        Self::new([70.0, 1.0, 1.0, 1.0])
    }
}

impl ProfileCurve {
    pub const fn new(control_points: [f64; 4]) -> Self {
        Self { control_points }
    }

    pub fn control_points(&self) -> [f64; 4] {
        self.control_points
    }

    pub fn radius(&self, t: f64) -> f64 {
        let [a, b, c, d] = self.control_points;
        bezier(a, b, c, d, t)
    }
}

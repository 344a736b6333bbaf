/// Animation time fed to the shading stage.
///
/// Accumulated in `f64` so long sessions don't drift; the GPU receives `f32`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Playhead {
    value: f64,
}

impl Playhead {
    pub const fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    pub fn advance(&mut self, delta: f64) -> f64 {
        self.value += delta;
        self.value
    }

    pub fn as_uniform(&self) -> f32 {
        self.value as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Playhead::default().get(), 0.0);
    }

    #[test]
    fn set_then_get() {
        let mut playhead = Playhead::default();
        playhead.set(3.25);
        assert_eq!(playhead.get(), 3.25);
        assert_eq!(playhead.as_uniform(), 3.25_f32);
    }

    #[test]
    fn repeated_advances_accumulate_linearly() {
        for (increment, steps) in [(0.0005, 10_000), (-0.001, 7_919), (0.0005, 1)] {
            let mut stepped = Playhead::default();
            for _ in 0..steps {
                stepped.advance(increment);
            }

            let mut jumped = Playhead::default();
            jumped.advance(increment * steps as f64);

            assert!(
                (stepped.get() - jumped.get()).abs() < 1e-9,
                "{increment} x {steps}: {} vs {}",
                stepped.get(),
                jumped.get()
            );
        }
    }

    #[test]
    fn advance_returns_new_value() {
        let mut playhead = Playhead::new(1.0);
        assert_eq!(playhead.advance(-0.5), 0.5);
    }
}

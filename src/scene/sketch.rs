use crate::scene::playhead::Playhead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SketchState {
    Uninitialized,
    Running,
}

/// What a single animation tick hands to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub index: u64,
    pub playhead: f32,
}

/// Lifecycle and animation clock of the scene.
///
/// Nothing advances until [`Sketch::start`] is called, which happens once the
/// renderer finished its setup.
pub struct Sketch {
    state: SketchState,
    playhead: Playhead,
    increment: f64,
    frames: u64,
}

impl Sketch {
    pub fn new(increment: f64) -> Self {
        Self {
            state: SketchState::Uninitialized,
            playhead: Playhead::default(),
            increment,
            frames: 0,
        }
    }

    pub fn state(&self) -> SketchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SketchState::Running
    }

    /// Returns `true` on the single Uninitialized -> Running transition.
    pub fn start(&mut self) -> bool {
        match self.state {
            SketchState::Uninitialized => {
                self.state = SketchState::Running;
                log::info!(
                    "sketch running, playhead increment {:+} per frame",
                    self.increment
                );
                true
            }
            SketchState::Running => false,
        }
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the playhead. Must run before the frame's draw call.
    pub fn tick(&mut self) -> Option<Frame> {
        if self.state != SketchState::Running {
            return None;
        }

        self.playhead.advance(self.increment);
        self.frames += 1;

        Some(Frame {
            index: self.frames,
            playhead: self.playhead.as_uniform(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::{BackendKind, Capability};

    #[test]
    fn ticking_before_start_does_nothing() {
        let mut sketch = Sketch::new(0.0005);
        assert_eq!(sketch.tick(), None);
        assert_eq!(sketch.playhead().get(), 0.0);
        assert_eq!(sketch.frames(), 0);
        assert_eq!(sketch.state(), SketchState::Uninitialized);
    }

    #[test]
    fn start_is_a_one_way_transition() {
        let mut sketch = Sketch::new(0.0005);
        assert!(sketch.start());
        assert!(!sketch.start());
        assert!(sketch.is_running());
    }

    #[test]
    fn each_tick_advances_before_reporting() {
        let mut sketch = Sketch::new(-0.001);
        sketch.start();

        let first = sketch.tick().unwrap();
        assert_eq!(first.index, 1);
        assert!((first.playhead + 0.001).abs() < 1e-7);

        let second = sketch.tick().unwrap();
        assert_eq!(second.index, 2);
        assert!((second.playhead + 0.002).abs() < 1e-7);
    }

    #[test]
    fn playhead_after_n_ticks_matches_one_jump() {
        let mut sketch = Sketch::new(0.0005);
        sketch.start();
        for _ in 0..2_000 {
            sketch.tick();
        }
        assert!((sketch.playhead().get() - 2_000.0 * 0.0005).abs() < 1e-9);
    }

    #[test]
    fn fallback_backend_still_renders_frames() {
        struct FakeRenderer {
            drawn: Vec<Frame>,
        }

        let fallback: Result<FakeRenderer, String> = Ok(FakeRenderer { drawn: Vec::new() });
        let preferred = async { Err::<FakeRenderer, String>("adapter lost".to_string()) };

        let capability = pollster::block_on(Capability::resolve(fallback, preferred)).unwrap();
        assert_eq!(capability.kind(), BackendKind::Fallback);

        let mut renderer = capability.into_inner();
        let mut sketch = Sketch::new(0.0005);
        sketch.start();

        for _ in 0..3 {
            let frame = sketch.tick().expect("running sketch yields frames");
            renderer.drawn.push(frame);
        }
        assert_eq!(renderer.drawn.len(), 3);
        assert_eq!(renderer.drawn[2].index, 3);
    }
}

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples kept per graph.
pub const HISTORY_LEN: usize = 74;

const FPS_WINDOW: Duration = Duration::from_secs(1);
const BYTES_PER_MB: f32 = 1_048_576.0;

/// One readout with its running min/max and a bounded history.
#[derive(Debug, Clone)]
pub struct StatPanel {
    pub name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    history: VecDeque<f32>,
}

impl StatPanel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: 0.0,
            min: f32::INFINITY,
            max: 0.0,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn push(&mut self, value: f32) {
        self.value = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(value);
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Lowest value seen, 0 before the first sample.
    pub fn min(&self) -> f32 {
        if self.min.is_finite() { self.min } else { 0.0 }
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    pub fn label(&self) -> String {
        format!(
            "{:.0} {} ({:.0}-{:.0})",
            self.value,
            self.name,
            self.min(),
            self.max
        )
    }
}

/// Frame timing for the overlay.
///
/// `begin`/`end` bracket the work of one frame; FPS and memory are sampled
/// once per second, frame time on every frame.
#[derive(Debug, Clone)]
pub struct FrameStats {
    pub fps: StatPanel,
    pub ms: StatPanel,
    pub mb: StatPanel,

    frame_start: Option<Instant>,
    window_start: Option<Instant>,
    frames_in_window: u32,
    resident_bytes: usize,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            fps: StatPanel::new("FPS"),
            ms: StatPanel::new("MS"),
            mb: StatPanel::new("MB"),
            frame_start: None,
            window_start: None,
            frames_in_window: 0,
            resident_bytes: 0,
        }
    }

    pub fn begin(&mut self, now: Instant) {
        self.frame_start = Some(now);
        if self.window_start.is_none() {
            self.window_start = Some(now);
        }
    }

    pub fn end(&mut self, now: Instant) {
        let Some(start) = self.frame_start.take() else {
            return;
        };
        self.ms
            .push(now.saturating_duration_since(start).as_secs_f32() * 1000.0);
        self.frames_in_window += 1;

        let Some(window_start) = self.window_start else {
            return;
        };
        let elapsed = now.saturating_duration_since(window_start);
        if elapsed >= FPS_WINDOW {
            self.fps
                .push(self.frames_in_window as f32 / elapsed.as_secs_f32());
            self.mb.push(self.resident_bytes as f32 / BYTES_PER_MB);
            self.window_start = Some(now);
            self.frames_in_window = 0;
        }
    }

    /// GPU bytes reported on the MB panel at the next sample.
    pub fn set_resident_bytes(&mut self, bytes: usize) {
        self.resident_bytes = bytes;
    }

    pub fn panels(&self) -> [&StatPanel; 3] {
        [&self.fps, &self.ms, &self.mb]
    }
}

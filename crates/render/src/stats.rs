use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Counters for the last rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub columns_cast: usize,
    pub wall_hits: usize,
    pub sprites_considered: usize,
    pub sprites_drawn: usize,
    pub frame_time: Duration,
}

/// Rolling window over the stats of recent frames.
///
/// Totals are kept alongside the window so averages cost nothing per query.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: VecDeque<FrameStats>,
    capacity: usize,
    total_time: Duration,
    total_sprites: usize,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            total_time: Duration::ZERO,
            total_sprites: 0,
        }
    }

    /// Add a frame, evicting the oldest once the window is full.
    pub fn record(&mut self, frame: &FrameStats) {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.total_time -= old.frame_time;
                self.total_sprites -= old.sprites_drawn;
            }
        }
        self.total_time += frame.frame_time;
        self.total_sprites += frame.sprites_drawn;
        self.window.push_back(*frame);
    }

    pub fn count(&self) -> usize {
        self.window.len()
    }

    pub fn average(&self) -> Duration {
        match self.window.len() {
            0 => Duration::ZERO,
            n => self.total_time / n as u32,
        }
    }

    pub fn min(&self) -> Duration {
        self.window.iter().map(|f| f.frame_time).min().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.window.iter().map(|f| f.frame_time).max().unwrap_or_default()
    }

    /// Frames per second implied by the average frame time.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    /// Frames in the window that took longer than `budget`.
    pub fn over_budget(&self, budget: Duration) -> usize {
        self.window.iter().filter(|f| f.frame_time > budget).count()
    }

    pub fn report(&self) -> FrameReport {
        let frames = self.count();
        FrameReport {
            frames,
            average: self.average(),
            min: self.min(),
            max: self.max(),
            fps: self.fps(),
            mean_sprites: if frames == 0 {
                0.0
            } else {
                self.total_sprites as f32 / frames as f32
            },
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

/// Summary of a [`FrameTimer`] window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frames: usize,
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
    pub fps: f32,
    pub mean_sprites: f32,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames: avg {:?} (min {:?}, max {:?}), {:.1} fps, {:.1} sprites/frame",
            self.frames, self.average, self.min, self.max, self.fps, self.mean_sprites
        )
    }
}

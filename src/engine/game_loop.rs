/// Simulation clock
///
/// Implements a fixed timestep loop measured in milliseconds. Every fixed
/// step yields a `Tick` carrying the total simulated time and the step
/// length, which is exactly what the world objects' `update(total_ms,
/// frame_ms)` entry points consume.
use std::time::{Duration, Instant};

/// Default simulation step (20 updates per second)
pub const DEFAULT_TICK_MS: u64 = 50;

/// Maximum number of fixed steps per frame to prevent spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// One fixed simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Simulated milliseconds since the loop started, after this step
    pub total_ms: u64,
    /// Length of this step in milliseconds
    pub frame_ms: u64,
}

/// Simulation loop timing state
pub struct GameLoop {
    /// Fixed step length
    tick: Duration,

    /// Accumulated wall time not yet consumed by fixed steps
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Whether the simulation is paused
    paused: bool,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Total fixed steps executed
    update_count: u64,

    /// Simulated milliseconds
    total_ms: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl GameLoop {
    /// Create a new loop with the given fixed step
    pub fn new(tick_ms: u64) -> Self {
        Self {
            tick: Duration::from_millis(tick_ms.max(1)),
            accumulator: Duration::ZERO,
            last_frame_time: Instant::now(),
            paused: false,
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            update_count: 0,
            total_ms: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame using the wall clock, returns the fixed steps to run
    pub fn begin_frame(&mut self) -> Vec<Tick> {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Feed an explicit frame duration, returns the fixed steps to run
    pub fn advance(&mut self, frame_time: Duration) -> Vec<Tick> {
        self.frame_count += 1;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        // If paused, don't accumulate time for updates
        if self.paused {
            return Vec::new();
        }

        self.accumulator += frame_time;

        let frame_ms = self.tick.as_millis() as u64;
        let mut ticks = Vec::new();
        while self.accumulator >= self.tick && (ticks.len() as u32) < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.tick;
            self.total_ms += frame_ms;
            ticks.push(Tick {
                total_ms: self.total_ms,
                frame_ms,
            });
        }

        // Drop the backlog instead of replaying it next frame
        if ticks.len() as u32 == MAX_STEPS_PER_FRAME && self.accumulator >= self.tick {
            log::debug!("Simulation falling behind, dropping {:?}", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        self.update_count += ticks.len() as u64;
        ticks
    }

    /// Fixed step length in milliseconds
    pub fn tick_ms(&self) -> u64 {
        self.tick.as_millis() as u64
    }

    /// Simulated time in milliseconds
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Interpolation alpha between the last and the next fixed step
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.tick.as_secs_f32()
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of fixed steps executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Check if the simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent update burst
            self.accumulator = Duration::ZERO;
            log::info!("Simulation resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_MS)
    }
}

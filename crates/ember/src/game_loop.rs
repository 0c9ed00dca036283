//! # EMBER Game Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. CAP FRAME RATE                                                   │
//! │    └─ Sleep off whatever is left of the previous frame's budget     │
//! │                                                                     │
//! │ 2. DELTA TIME                                                       │
//! │    └─ Seconds since the previous frame, clamped to max_delta        │
//! │                                                                     │
//! │ 3. SYNCHRONIZE                                                      │
//! │    └─ registry.update(): pending entities join their systems        │
//! │                                                                     │
//! │ 4. RUN SYSTEMS                                                      │
//! │    └─ Every system's update, in the order they were added           │
//! │                                                                     │
//! │ 5. END FRAME                                                        │
//! │    └─ Record timing, warn on budget overrun                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use ember_core::{EcsResult, Registry};
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::error::GameResult;

/// Timing for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Delta time handed to the systems, in seconds.
    pub delta_time: f64,
    /// Time spent in `registry.update()`, in microseconds.
    pub sync_us: u64,
    /// Time spent running systems, in microseconds.
    pub systems_us: u64,
    /// Total work time for the frame (excluding the cap sleep), in microseconds.
    pub total_us: u64,
    /// Entities created so far.
    pub entities: usize,
}

/// Owns the registry and drives it one frame at a time.
pub struct GameLoop {
    registry: Registry,
    config: GameConfig,
    frame_count: u64,
    /// Start of the previous frame.
    last_frame_time: Instant,
    stats_accumulator: FrameStatsAccumulator,
}

impl GameLoop {
    /// Creates a game loop and its registry.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`](crate::GameError::Config) or an ECS
    /// error if the configuration is invalid.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let registry = Registry::with_config(config.registry.clone())?;
        let stats_accumulator = FrameStatsAccumulator::with_budget(config.frame_budget());

        info!(fps = config.fps, max_delta = config.max_delta, sleep = config.sleep, "game loop created");

        Ok(Self {
            registry,
            config,
            frame_count: 0,
            last_frame_time: Instant::now(),
            stats_accumulator,
        })
    }

    /// Runs one-time setup against the registry: add systems, spawn entities.
    ///
    /// Also restarts the frame clock so setup time is not counted as the
    /// first frame's delta.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `setup`.
    pub fn setup<F>(&mut self, setup: F) -> GameResult<()>
    where
        F: FnOnce(&mut Registry) -> EcsResult<()>,
    {
        setup(&mut self.registry)?;
        self.last_frame_time = Instant::now();
        info!(
            entities = self.registry.entity_count(),
            systems = self.registry.system_count(),
            "setup complete"
        );
        Ok(())
    }

    /// Advances the simulation by `delta_time` seconds without touching the clock.
    ///
    /// Synchronizes the registry, then runs every system.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a system.
    pub fn tick(&mut self, delta_time: f64) -> GameResult<()> {
        self.registry.update();
        self.registry.run_systems(delta_time)?;
        Ok(())
    }

    /// Runs one real-time frame: cap, measure, tick, record.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a system. The frame is not recorded.
    pub fn frame(&mut self) -> GameResult<FrameStats> {
        self.cap_frame_rate();

        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        // Clamp delta time to prevent tunneling after a stall
        let delta_time = delta.as_secs_f64().min(self.config.max_delta);

        let sync_start = Instant::now();
        self.registry.update();
        let sync_us = micros(sync_start.elapsed());

        let systems_start = Instant::now();
        self.registry.run_systems(delta_time)?;
        let systems_us = micros(systems_start.elapsed());

        let stats = FrameStats {
            frame: self.frame_count,
            delta_time,
            sync_us,
            systems_us,
            total_us: micros(now.elapsed()),
            entities: self.registry.entity_count(),
        };
        self.end_frame(stats);
        Ok(stats)
    }

    /// Runs `frames` consecutive frames.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first system error.
    pub fn run_frames(&mut self, frames: u64) -> GameResult<&FrameStatsAccumulator> {
        for _ in 0..frames {
            self.frame()?;
        }
        Ok(&self.stats_accumulator)
    }

    fn cap_frame_rate(&self) {
        if !self.config.sleep {
            return;
        }
        let budget = self.config.frame_budget();
        let elapsed = self.last_frame_time.elapsed();
        if let Some(remaining) = budget.checked_sub(elapsed) {
            if !remaining.is_zero() {
                std::thread::sleep(remaining);
            }
        }
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator.record(stats);

        if stats.total_us > micros(self.stats_accumulator.budget) {
            #[allow(clippy::cast_precision_loss)]
            let frame_ms = stats.total_us as f64 / 1000.0;
            warn!(
                frame = stats.frame,
                frame_ms,
                budget_ms = self.config.ms_per_frame(),
                "frame exceeded budget"
            );
        }
    }

    /// Frames completed so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry, mutably, for spawning between frames.
    #[inline]
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of synchronization times.
    pub sync_us_sum: u64,
    /// Sum of system times.
    pub systems_us_sum: u64,
    /// Sum of simulated delta times, in seconds.
    pub simulated_seconds: f64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Per-frame budget.
    pub budget: Duration,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator that counts frames slower than `budget`.
    #[must_use]
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            sync_us_sum: 0,
            systems_us_sum: 0,
            simulated_seconds: 0.0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            budget,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.sync_us_sum += stats.sync_us;
        self.systems_us_sum += stats.systems_us;
        self.simulated_seconds += stats.delta_time;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > micros(self.budget) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame work time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns the frame rate the work time alone would allow.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a summary of the statistics at `info` level.
    #[allow(clippy::cast_precision_loss)]
    pub fn log_summary(&self) {
        let min_frame_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };
        info!(
            frames = self.frames_recorded,
            avg_frame_ms = self.avg_frame_ms(),
            avg_fps = self.avg_fps(),
            min_frame_ms,
            max_frame_ms = self.max_frame_us as f64 / 1000.0,
            over_budget = self.frames_over_budget,
            simulated_seconds = self.simulated_seconds,
            "frame statistics"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::with_budget(GameConfig::default().frame_budget())
    }
}

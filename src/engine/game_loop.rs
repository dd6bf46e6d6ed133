/// Game loop timing and control system
///
/// Implements a fixed timestep loop fed with frame durations by the caller.
/// Movement always integrates with the same `dt` regardless of how the frames
/// arrive, and a headless run can feed synthetic frame times.
use std::time::Duration;

/// Target update rate (60 updates per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of updates per frame to prevent spiral of death
const MAX_STEPS_PER_FRAME: u32 = 5;

/// Game loop timing state
pub struct GameLoop {
    /// Accumulated time for fixed timestep updates
    accumulator: Duration,

    /// Simulated time covered by executed updates
    sim_time: f32,

    /// Current frame number
    frame_count: u64,

    /// Total updates executed
    update_count: u64,
}

impl GameLoop {
    /// Create a new game loop
    pub fn new() -> Self {
        Self {
            accumulator: Duration::ZERO,
            sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Feed one frame's duration, returns the number of fixed updates to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        self.accumulator += frame_time;

        let mut updates = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && updates < MAX_STEPS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            updates += 1;
        }

        // Drop the backlog we refused to simulate
        if updates == MAX_STEPS_PER_FRAME && self.accumulator >= FIXED_TIMESTEP_DURATION {
            log::debug!("Dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        self.update_count += updates as u64;
        self.sim_time += updates as f32 * FIXED_TIMESTEP;
        updates
    }

    /// Get the fixed timestep for updates (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Simulated seconds covered by the updates run so far
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Start time of each of the `updates` steps returned by the last `advance`
    pub fn step_times(&self, updates: u32) -> impl Iterator<Item = f32> {
        let frame_start = self.sim_time - updates as f32 * FIXED_TIMESTEP;
        (0..updates).map(move |step| frame_start + step as f32 * FIXED_TIMESTEP)
    }

    /// Get total number of frames fed
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of updates executed
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot events due at fixed points in simulated time
///
/// Events scheduled for the same deadline come out in scheduling order.
#[derive(Debug, Clone)]
pub struct ScheduledEvents<E> {
    pending: Vec<(f32, E)>,
}

impl<E> ScheduledEvents<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Queue `event` to fire once `now >= at`
    pub fn schedule(&mut self, at: f32, event: E) {
        // Insert after every event due no later than `at`
        let index = self.pending.partition_point(|(due, _)| *due <= at);
        self.pending.insert(index, (at, event));
    }

    /// Remove and return every event due at `now`, earliest first
    pub fn drain_due(&mut self, now: f32) -> Vec<E> {
        let count = self.pending.partition_point(|(due, _)| *due <= now);
        self.pending.drain(..count).map(|(_, event)| event).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl<E> Default for ScheduledEvents<E> {
    fn default() -> Self {
        Self::new()
    }
}

//! Fixed-timestep clock using an accumulator pattern.
//!
//! The browser calls `draw_web()` at ~60fps with a variable delta. TickClock
//! converts that into a fixed number of discrete engine ticks per second, so
//! scoring windows, autosave cadence and bot timing stay deterministic and
//! can be driven by a virtual clock in tests.

/// Engine ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 10;

pub struct TickClock {
    /// Milliseconds per tick (100ms at 10 ticks/sec).
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks.
    accumulator: f64,
    /// Total elapsed ticks since creation.
    pub total_ticks: u64,
    /// Timestamp of the last advance (ms), None before the first frame.
    last_timestamp: Option<f64>,
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            ms_per_tick: 1000.0 / TICKS_PER_SEC as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (epoch ms) once per frame and get back the
    /// number of whole ticks to process. Deltas are clamped to 500ms so a
    /// backgrounded tab does not trigger a catch-up spiral.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, 500.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

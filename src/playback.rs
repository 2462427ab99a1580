//! The playback clock, which turns user commands and timer ticks into a query time.
//!
//! The [`Controller`] is the only writer of the query time. It never touches rendering; the driver
//! asks it for the current time and samples every agent's plan at that time.
use log::debug;
use strum::Display;

/// Simulation time advanced by one tick, unless configured otherwise
pub const DEFAULT_TIME_PER_TICK: f64 = 0.1;

/// A source of periodic ticks which the controller can start and stop
pub trait Timer {
    /// Start issuing ticks
    fn start(&mut self);
    /// Stop issuing ticks
    fn stop(&mut self);
    /// Whether ticks are currently being issued
    fn is_running(&self) -> bool;
}

/// The state of playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlaybackState {
    /// Not started, or reset
    Idle,
    /// Advancing on every timer tick
    Running,
    /// Stopped by the user, keeping the current time
    Paused,
    /// Advancing only when stepped manually
    Stepping,
}

/// The animation controller.
///
/// The query time is kept as a whole number of ticks, so it is exactly 0 after [`start`] or
/// [`reset`] and never drifts.
///
/// State-changing methods return whether they had any effect; calling one in a state where it
/// doesn't apply is a no-op, not an error.
///
/// [`start`]: Controller::start
/// [`reset`]: Controller::reset
#[derive(Debug)]
pub struct Controller<T: Timer> {
    state: PlaybackState,
    ticks: u32,
    time_per_tick: f64,
    timer: T,
}

impl<T: Timer> Controller<T> {
    /// Create a new controller in the `Idle` state.
    ///
    /// # Arguments
    ///
    /// * `time_per_tick` - Simulation time advanced on each tick
    /// * `timer` - The tick source to start and stop
    pub fn new(time_per_tick: f64, timer: T) -> Self {
        Self {
            state: PlaybackState::Idle,
            ticks: 0,
            time_per_tick,
            timer,
        }
    }

    /// The current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The current query time
    pub fn query_time(&self) -> f64 {
        f64::from(self.ticks) * self.time_per_tick
    }

    /// Simulation time advanced on each tick
    pub fn time_per_tick(&self) -> f64 {
        self.time_per_tick
    }

    /// The tick source
    pub fn timer(&self) -> &T {
        &self.timer
    }

    fn transition(&mut self, to: PlaybackState) {
        debug!("Playback: {} -> {to}", self.state);
        self.state = to;
    }

    /// Start playback from time 0. Valid in any state.
    pub fn start(&mut self) -> bool {
        self.ticks = 0;
        self.timer.start();
        self.transition(PlaybackState::Running);

        true
    }

    /// Pause a running playback, freezing the query time
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Running {
            return false;
        }

        self.timer.stop();
        self.transition(PlaybackState::Paused);

        true
    }

    /// Resume a paused or stepping playback without changing the query time
    pub fn resume(&mut self) -> bool {
        if !matches!(self.state, PlaybackState::Paused | PlaybackState::Stepping) {
            return false;
        }

        self.timer.start();
        self.transition(PlaybackState::Running);

        true
    }

    /// Return to the initial state, with the query time at 0 and the timer stopped
    pub fn reset(&mut self) -> bool {
        self.ticks = 0;
        self.timer.stop();
        self.transition(PlaybackState::Idle);

        true
    }

    /// Advance the query time by exactly `n` ticks, independently of the timer.
    ///
    /// This enters the `Stepping` state from any other state, stopping the timer if it is running.
    pub fn step(&mut self, n: u32) -> bool {
        if self.state != PlaybackState::Stepping {
            self.timer.stop();
            self.transition(PlaybackState::Stepping);
        }
        self.ticks = self.ticks.saturating_add(n);

        true
    }

    /// Handle a tick from the timer.
    ///
    /// # Returns
    ///
    /// The new query time if playback is running, or `None` if the tick was ignored. Playback never
    /// stops by itself, even once every agent has finished.
    pub fn tick(&mut self) -> Option<f64> {
        if self.state != PlaybackState::Running {
            return None;
        }

        self.ticks = self.ticks.saturating_add(1);
        Some(self.query_time())
    }
}

//! The event loop which plays a scenario back.
//!
//! Everything runs on one thread. The loop waits on two channels: one carrying user commands, and
//! one carrying timer ticks. Stopping the timer swaps the tick channel for one that never fires, so
//! no tick outlives the state that asked for it.
use crate::playback::{Controller, PlaybackState, Timer};
use crate::render::{Frame, Renderer};
use crate::scenario::Scenario;
use anyhow::{Result, anyhow, bail};
use crossbeam_channel::{Receiver, never, select, tick};
use log::{debug, info, warn};
use std::io::BufRead;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

/// A user command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play from the beginning
    Start,
    /// Pause playback
    Pause,
    /// Continue after a pause
    Resume,
    /// Go back to the initial state
    Reset,
    /// Advance by the given number of ticks
    Step(u32),
    /// Stop the player
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            bail!("Empty command");
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "reset" => Command::Reset,
            "step" => match words.next() {
                None => Command::Step(1),
                Some(n) => Command::Step(
                    n.parse()
                        .map_err(|_| anyhow!("Invalid step count: {n}"))?,
                ),
            },
            "quit" | "exit" => Command::Quit,
            other => bail!("Unknown command: {other}"),
        };
        if let Some(extra) = words.next() {
            bail!("Unexpected argument: {extra}");
        }

        Ok(command)
    }
}

/// A timer backed by a crossbeam tick channel
pub struct ChannelTimer {
    interval: Duration,
    ticks: Receiver<Instant>,
    running: bool,
}

impl ChannelTimer {
    /// Create a stopped timer which ticks every `interval` once started
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticks: never(),
            running: false,
        }
    }

    /// The channel ticks arrive on
    pub fn receiver(&self) -> &Receiver<Instant> {
        &self.ticks
    }
}

impl Timer for ChannelTimer {
    fn start(&mut self) {
        self.ticks = tick(self.interval);
        self.running = true;
    }

    fn stop(&mut self) {
        self.ticks = never();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Options controlling the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    /// Wall-clock time between ticks
    pub tick_interval: Duration,
    /// Simulation time advanced per tick
    pub time_per_tick: f64,
    /// Start playing immediately
    pub autoplay: bool,
    /// Quit once the query time reaches this value
    pub stop_at: Option<f64>,
}

/// Plays a scenario back, sending frames to a renderer
pub struct Player<'a, R: Renderer> {
    scenario: &'a Scenario,
    controller: Controller<ChannelTimer>,
    renderer: R,
    stop_at: Option<f64>,
    autoplay: bool,
}

impl<'a, R: Renderer> Player<'a, R> {
    /// Create a new player
    pub fn new(scenario: &'a Scenario, renderer: R, options: &PlayerOptions) -> Self {
        Self {
            scenario,
            controller: Controller::new(
                options.time_per_tick,
                ChannelTimer::new(options.tick_interval),
            ),
            renderer,
            stop_at: options.stop_at,
            autoplay: options.autoplay,
        }
    }

    /// The current playback state
    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    /// The current query time
    pub fn query_time(&self) -> f64 {
        self.controller.query_time()
    }

    /// Consume the player, returning the renderer
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn frame(&self) -> Result<Frame> {
        Frame::sample(
            self.scenario,
            self.controller.query_time(),
            self.controller.state(),
        )
    }

    fn draw(&mut self) -> Result<()> {
        let frame = self.frame()?;
        self.renderer.draw(&frame)
    }

    /// Apply a command.
    ///
    /// # Returns
    ///
    /// `false` if the player should stop.
    pub fn handle(&mut self, command: Command) -> Result<bool> {
        debug!("Command: {command:?}");
        let changed = match command {
            Command::Start => self.controller.start(),
            Command::Pause => self.controller.pause(),
            Command::Resume => self.controller.resume(),
            Command::Reset => {
                self.controller.reset();
                let frame = self.frame()?;
                self.renderer.reset(&frame)?;
                return Ok(true);
            }
            Command::Step(n) => self.controller.step(n),
            Command::Quit => return Ok(false),
        };

        if changed {
            self.draw()?;
        } else {
            info!("Ignoring {command:?} while {}", self.controller.state());
        }

        Ok(true)
    }

    /// Handle a timer tick.
    ///
    /// # Returns
    ///
    /// `false` if the player should stop.
    pub fn handle_tick(&mut self) -> Result<bool> {
        let Some(time) = self.controller.tick() else {
            return Ok(true);
        };
        self.draw()?;

        Ok(self.stop_at.is_none_or(|stop_at| time < stop_at))
    }

    /// Run the event loop until a `Quit` command arrives, the stop time is reached, or the command
    /// channel closes. If the channel closes while playing towards a stop time, playback carries on
    /// until that time.
    pub fn run(mut self, commands: &Receiver<Command>) -> Result<R> {
        let frame = self.frame()?;
        self.renderer.reset(&frame)?;
        if self.autoplay {
            self.handle(Command::Start)?;
        }

        let mut commands = commands.clone();
        loop {
            let ticks = self.controller.timer().receiver().clone();
            let mut input_closed = false;
            let result = select! {
                recv(commands) -> msg => match msg {
                    Ok(command) => self.handle(command),
                    Err(_) => {
                        // Nobody can send commands any more, so only keep going while playing
                        input_closed = true;
                        Ok(self.controller.state() == PlaybackState::Running
                            && self.stop_at.is_some())
                    }
                },
                recv(ticks) -> _ => self.handle_tick(),
            };
            if !result? {
                break;
            }
            if input_closed {
                commands = never();
            }
        }

        info!("Stopped at t = {:.2}", self.controller.query_time());

        Ok(self.renderer)
    }
}

/// Spawn a thread which reads commands from `input`, one per line, and sends them down a channel.
///
/// Lines that aren't valid commands are reported and skipped. The channel closes at the end of the
/// input.
pub fn spawn_command_reader<I>(input: I) -> Receiver<Command>
where
    I: BufRead + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("{err}"),
            }
        }
    });

    rx
}

//! The command line interface for the player.
use crate::input::load_scenario;
use crate::log;
use crate::map::MapKind;
use crate::player::{Player, PlayerOptions, spawn_command_reader};
use crate::render::TextRenderer;
use crate::scenario::Scenario;
use crate::settings::Settings;
use ::log::info;
use anyhow::{Context, Result, ensure};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod settings;
use settings::SettingsSubcommands;

/// Replays solutions to multi-agent path-finding problems.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The input files which make up a scenario
#[derive(Args)]
pub struct InputOpts {
    /// The kind of map
    #[arg(long = "type", value_enum)]
    pub kind: MapKind,
    /// Path to the map file
    #[arg(long)]
    pub map: PathBuf,
    /// Path to the task file
    #[arg(long)]
    pub task: PathBuf,
    /// Path to the solution file
    #[arg(long)]
    pub solution: PathBuf,
}

impl InputOpts {
    fn load(&self) -> Result<Scenario> {
        load_scenario(self.kind, &self.map, &self.task, &self.solution)
    }
}

/// Options for the play command
#[derive(Args)]
pub struct PlayOpts {
    /// Wall-clock time between ticks, in milliseconds [default: from settings]
    #[arg(long)]
    pub tick_interval_ms: Option<u64>,
    /// Simulation time advanced per tick [default: from settings]
    #[arg(long)]
    pub time_per_tick: Option<f64>,
    /// Start playing without waiting for a `start` command
    #[arg(long)]
    pub autoplay: bool,
    /// Quit once playback reaches this time
    #[arg(long)]
    pub stop_at: Option<f64>,
    /// Directory to write log files to
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Play a solution back, reading commands from stdin.
    Play {
        /// Input files
        #[command(flatten)]
        input: InputOpts,
        /// Other play options
        #[command(flatten)]
        opts: PlayOpts,
    },
    /// Check that a scenario loads without errors.
    Validate {
        /// Input files
        #[command(flatten)]
        input: InputOpts,
    },
    /// Print every agent's position at the given time.
    Sample {
        /// Input files
        #[command(flatten)]
        input: InputOpts,
        /// The time to sample at
        #[arg(long, allow_negative_numbers = true)]
        time: f64,
    },
    /// Manage program settings.
    Settings {
        /// The subcommands for managing settings.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Play { input, opts } => handle_play_command(&input, &opts, None),
            Self::Validate { input } => handle_validate_command(&input, None),
            Self::Sample { input, time } => {
                handle_sample_command(&input, time, &mut io::stdout().lock(), None)
            }
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Use the given settings or load them from the settings file
fn get_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Initialise the program logger, unless it is already running
fn init_logger(settings: &Settings, log_dir: Option<&Path>) -> Result<()> {
    if log::is_logger_initialised() {
        return Ok(());
    }

    log::init(Some(&settings.log_level), log_dir).context("Failed to initialise logging.")
}

/// Handle the `play` command.
pub fn handle_play_command(
    input: &InputOpts,
    opts: &PlayOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = get_settings(settings)?;
    init_logger(&settings, opts.log_dir.as_deref())?;

    // Command-line arguments take precedence over settings
    let tick_interval_ms = opts.tick_interval_ms.unwrap_or(settings.tick_interval_ms);
    let time_per_tick = opts.time_per_tick.unwrap_or(settings.time_per_tick);
    ensure!(
        tick_interval_ms > 0,
        "Tick interval must be greater than zero"
    );
    ensure!(
        time_per_tick.is_finite() && time_per_tick > 0.0,
        "Time per tick must be a positive number, got {time_per_tick}"
    );

    let scenario = input.load().context("Failed to load scenario.")?;
    info!(
        "Playing {} agents; makespan {}",
        scenario.num_agents(),
        scenario.solution.makespan
    );

    let options = PlayerOptions {
        tick_interval: Duration::from_millis(tick_interval_ms),
        time_per_tick,
        autoplay: opts.autoplay,
        stop_at: opts.stop_at,
    };
    let renderer = TextRenderer::new(&scenario.map, io::stdout());
    let commands = spawn_command_reader(BufReader::new(io::stdin()));
    Player::new(&scenario, renderer, &options).run(&commands)?;

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(input: &InputOpts, settings: Option<Settings>) -> Result<()> {
    let settings = get_settings(settings)?;

    // We won't save log files when running the validate command
    init_logger(&settings, None)?;

    input.load().context("Failed to validate scenario.")?;
    info!("Scenario validation successful!");

    Ok(())
}

/// Handle the `sample` command, writing one line per agent to `out`.
pub fn handle_sample_command<W: Write>(
    input: &InputOpts,
    time: f64,
    out: &mut W,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = get_settings(settings)?;
    init_logger(&settings, None)?;

    let scenario = input.load().context("Failed to load scenario.")?;
    for (id, position) in scenario.positions_at(time)?.into_iter().enumerate() {
        writeln!(out, "{id}: {position}")?;
    }

    Ok(())
}

//! Playback of multi-agent path-finding solutions.
//!
//! A scenario is loaded from three XML files (a map, a task and a solution), after which every
//! agent's position can be sampled at any time. The [`playback::Controller`] turns user commands
//! and timer ticks into the time to sample at.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod agent;
pub mod cli;
pub mod geometry;
pub mod input;
pub mod log;
pub mod map;
pub mod playback;
pub mod player;
pub mod render;
pub mod scenario;
pub mod settings;
pub mod solution;
pub mod task;
pub mod trajectory;

#[cfg(test)]
mod fixture;

/// Get the directory where program configuration is stored
pub fn get_mapfvis_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config directory for this platform, so use the current directory
        return PathBuf::default();
    };
    config_dir.push("mapfvis");

    config_dir
}

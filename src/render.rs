//! Consumers of sampled positions.
//!
//! A [`Renderer`] is handed a [`Frame`] whenever the picture changes. It owns no state the playback
//! engine depends on.
use crate::geometry::Point;
use crate::map::{Map, MapKind};
use crate::playback::PlaybackState;
use crate::scenario::Scenario;
use anyhow::Result;
use std::io::Write;

/// Where to draw one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentMarker {
    /// The agent's ID
    pub id: usize,
    /// The agent's position, in map coordinates
    pub position: Point,
    /// The agent's radius
    pub radius: f64,
    /// Where the task wants the agent to end up, if it lies on the map
    pub goal: Option<Point>,
}

/// Everything needed to draw the agents at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The query time the positions were sampled at
    pub time: f64,
    /// The playback state when the frame was produced
    pub state: PlaybackState,
    /// One marker per agent, in agent ID order
    pub markers: Vec<AgentMarker>,
}

impl Frame {
    /// Sample every agent of the scenario at time `t`
    pub fn sample(scenario: &Scenario, t: f64, state: PlaybackState) -> Result<Self> {
        let markers = scenario
            .positions_at(t)?
            .into_iter()
            .zip(&scenario.solution.plans)
            .zip(scenario.goal_positions())
            .enumerate()
            .map(|(id, ((position, plan), goal))| AgentMarker {
                id,
                position,
                radius: plan.agent.radius,
                goal,
            })
            .collect();

        Ok(Self {
            time: t,
            state,
            markers,
        })
    }
}

/// Something which displays frames
pub trait Renderer {
    /// Draw the initial picture: agents at their starts, and their goals
    fn reset(&mut self, frame: &Frame) -> Result<()>;
    /// Update the picture
    fn draw(&mut self, frame: &Frame) -> Result<()>;
}

/// Writes frames as lines of text.
///
/// Grid positions are shifted to cell centres, as a graphical view would draw them.
pub struct TextRenderer<W: Write> {
    out: W,
    kind: MapKind,
}

impl<W: Write> TextRenderer<W> {
    /// Create a renderer for the given map, writing to `out`
    pub fn new(map: &Map, out: W) -> Self {
        Self {
            out,
            kind: map.kind(),
        }
    }

    /// Consume the renderer, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn display_position(&self, position: Point) -> Point {
        match self.kind {
            MapKind::Grid => position + Point::new(0.5, 0.5),
            MapKind::Roadmap => position,
        }
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let state = frame.state.to_string();
        write!(self.out, "[{:>8.2} {state:<8}]", frame.time)?;
        for marker in &frame.markers {
            let position = self.display_position(marker.position);
            write!(self.out, " {}:{position}", marker.id)?;
        }
        writeln!(self.out)?;

        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn reset(&mut self, frame: &Frame) -> Result<()> {
        write!(self.out, "goals")?;
        for marker in &frame.markers {
            if let Some(goal) = marker.goal {
                let goal = self.display_position(goal);
                write!(self.out, " {}:{goal}", marker.id)?;
            }
        }
        writeln!(self.out)?;

        self.write_frame(frame)
    }

    fn draw(&mut self, frame: &Frame) -> Result<()> {
        self.write_frame(frame)?;
        self.out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::grid_scenario;
    use rstest::rstest;

    #[rstest]
    fn test_frame_sample(grid_scenario: Scenario) {
        let frame = Frame::sample(&grid_scenario, 1.0, PlaybackState::Running).unwrap();
        assert_eq!(
            frame.markers,
            vec![AgentMarker {
                id: 0,
                position: Point::new(1.0, 1.0),
                radius: 0.3,
                goal: Some(Point::new(2.0, 2.0)),
            }]
        );
    }

    #[rstest]
    fn test_frame_sample_negative_time(grid_scenario: Scenario) {
        assert!(Frame::sample(&grid_scenario, -1.0, PlaybackState::Idle).is_err());
    }

    #[rstest]
    fn test_text_renderer(grid_scenario: Scenario) {
        let mut renderer = TextRenderer::new(&grid_scenario.map, Vec::new());
        let frame = Frame::sample(&grid_scenario, 1.0, PlaybackState::Running).unwrap();
        renderer.draw(&frame).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "[    1.00 Running ] 0:(1.50, 1.50)\n");
    }

    #[rstest]
    fn test_text_renderer_reset_shows_goals(grid_scenario: Scenario) {
        let mut renderer = TextRenderer::new(&grid_scenario.map, Vec::new());
        let frame = Frame::sample(&grid_scenario, 0.0, PlaybackState::Idle).unwrap();
        renderer.reset(&frame).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "goals 0:(2.50, 2.50)\n[    0.00 Idle    ] 0:(0.50, 0.50)\n"
        );
    }
}

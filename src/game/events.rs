//! Game Signals
//!
//! Terminal outcomes reported by the engine. These are game results for the
//! UI to render, not errors.

use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::core::point::Point;

/// Engine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for a click on a start cell
    #[default]
    Idle,
    /// Cursor is being tracked
    Playing,
    /// Finish reached (terminal until reset)
    Won,
    /// Attempt failed (terminal until reset)
    Lost,
}

impl GameState {
    /// Whether only `reset` can leave this state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

/// Why an attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceSignal {
    /// Cursor jumped farther than the teleport threshold
    Teleport,
    /// Finish zone reached
    Finish,
    /// Cursor left the circuit image
    OutOfBounds,
    /// Cursor left the path
    Collision,
    /// Pointer left the tracked region
    Abandoned,
    /// A click or press happened mid-play
    Clicked,
}

impl TraceSignal {
    /// State the engine ends in after this signal.
    pub fn outcome(self) -> GameState {
        match self {
            TraceSignal::Finish => GameState::Won,
            _ => GameState::Lost,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            TraceSignal::Teleport => "teleport",
            TraceSignal::Finish => "finish",
            TraceSignal::OutOfBounds => "out-of-bounds",
            TraceSignal::Collision => "collision",
            TraceSignal::Abandoned => "abandoned",
            TraceSignal::Clicked => "clicked",
        }
    }
}

impl fmt::Display for TraceSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason passed to `TraceEngine::abandon`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbandonReason {
    /// Pointer left the tracked region.
    PointerLeft,
    /// Mouse button or touch press during play.
    Pressed,
}

impl AbandonReason {
    /// Signal emitted for this reason.
    pub fn signal(self) -> TraceSignal {
        match self {
            AbandonReason::PointerLeft => TraceSignal::Abandoned,
            AbandonReason::Pressed => TraceSignal::Clicked,
        }
    }
}

/// Summary of a finished attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Final state (`Won` or `Lost`)
    pub state: GameState,
    /// Signal that ended the attempt
    pub signal: TraceSignal,
    /// Elapsed time when the attempt ended
    pub elapsed: Duration,
    /// Last cursor position
    pub position: Point,
}

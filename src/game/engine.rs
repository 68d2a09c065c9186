//! Collision / Progress Engine
//!
//! Explicit state machine tracking one attempt on one circuit:
//!
//! ```text
//! idle ──start()──▶ playing ──update_position()/abandon()──▶ won | lost
//!   ▲                                                          │
//!   └──────────────────────────── reset() ◀────────────────────┘
//! ```
//!
//! Not thread-safe and not reentrant: drive it from one event source.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::core::grid::TerrainGrid;
use crate::core::point::Point;
use crate::core::terrain::TerrainCode;
use crate::game::events::{AbandonReason, GameResult, GameState, TraceSignal};
use crate::game::timer::{to_centiseconds, Chronometer, Clock, MonotonicClock};

/// Default tolerance radius (Chebyshev, in pixels).
pub const DEFAULT_TOLERANCE_RADIUS: u32 = 2;

/// Default teleport threshold (Euclidean, in pixels).
pub const DEFAULT_TELEPORT_THRESHOLD: u32 = 400;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Box neighborhood radius used for finish and path-adherence checks.
    pub tolerance_radius: u32,
    /// Moves strictly longer than this end the attempt.
    pub teleport_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance_radius: DEFAULT_TOLERANCE_RADIUS,
            teleport_threshold: DEFAULT_TELEPORT_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from a variable source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            tolerance_radius: lookup("ENGINE_TOLERANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.tolerance_radius),
            teleport_threshold: lookup("ENGINE_TELEPORT_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.teleport_threshold),
        }
    }
}

/// Why `start` was refused. The engine state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejected {
    /// Attempt already running or finished; reset first.
    #[error("cannot start from state {0:?}")]
    NotIdle(GameState),
    /// Clicked cell is not a start cell.
    #[error("{0:?} is not a start cell")]
    NotStartCell(Point),
}

/// Tracks cursor movement against a terrain grid.
pub struct TraceEngine<C: Clock = MonotonicClock> {
    grid: Arc<TerrainGrid>,
    config: EngineConfig,
    clock: C,
    state: GameState,
    start_position: Option<Point>,
    last_position: Option<Point>,
    chrono: Chronometer,
    last_result: Option<GameResult>,
}

impl TraceEngine<MonotonicClock> {
    /// Create an idle engine on the process monotonic clock.
    pub fn new(grid: Arc<TerrainGrid>, config: EngineConfig) -> Self {
        Self::with_clock(grid, config, MonotonicClock)
    }
}

impl<C: Clock> TraceEngine<C> {
    /// Create an idle engine on a custom clock.
    pub fn with_clock(grid: Arc<TerrainGrid>, config: EngineConfig, clock: C) -> Self {
        Self {
            grid,
            config,
            clock,
            state: GameState::Idle,
            start_position: None,
            last_position: None,
            chrono: Chronometer::new(),
            last_result: None,
        }
    }

    /// Begin an attempt at `position`.
    ///
    /// Only valid from `Idle` and only on a START cell.
    pub fn start(&mut self, position: Point) -> Result<(), StartRejected> {
        if self.state != GameState::Idle {
            return Err(StartRejected::NotIdle(self.state));
        }
        if self.grid.at(position) != Some(TerrainCode::Start) {
            return Err(StartRejected::NotStartCell(position));
        }

        self.start_position = Some(position);
        self.last_position = Some(position);
        self.chrono.start(self.clock.now());
        self.state = GameState::Playing;

        debug!(?position, "attempt started");
        Ok(())
    }

    /// Feed one cursor position.
    ///
    /// Returns `None` while the attempt continues (or when not playing),
    /// otherwise the signal that ended it. Finish takes priority over
    /// bounds and adherence failures.
    pub fn update_position(&mut self, x: i32, y: i32) -> Option<TraceSignal> {
        if self.state != GameState::Playing {
            return None;
        }

        let position = Point::new(x, y);

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(?position, "cursor update");

        if let Some(last) = self.last_position {
            if last.is_farther_than(position, self.config.teleport_threshold) {
                return Some(self.end(TraceSignal::Teleport, position));
            }
        }
        self.last_position = Some(position);

        let radius = self.config.tolerance_radius;

        if self.grid.any_within(position, radius, |c| c == TerrainCode::Finish) {
            return Some(self.end(TraceSignal::Finish, position));
        }

        if !self.grid.in_bounds(x, y) {
            return Some(self.end(TraceSignal::OutOfBounds, position));
        }

        if !self.grid.any_within(position, radius, TerrainCode::is_drivable) {
            return Some(self.end(TraceSignal::Collision, position));
        }

        None
    }

    /// End the attempt because the pointer left or a press occurred.
    ///
    /// No-op outside `Playing`.
    pub fn abandon(&mut self, reason: AbandonReason) -> Option<TraceSignal> {
        if self.state != GameState::Playing {
            return None;
        }
        let position = self.last_position.unwrap_or_default();
        Some(self.end(reason.signal(), position))
    }

    /// Return to `Idle` from any state, clearing positions and the timer.
    ///
    /// The last result is kept for display.
    pub fn reset(&mut self) {
        self.state = GameState::Idle;
        self.start_position = None;
        self.last_position = None;
        self.chrono.reset();
    }

    fn end(&mut self, signal: TraceSignal, position: Point) -> TraceSignal {
        let elapsed = self.chrono.stop(self.clock.now());
        let state = signal.outcome();
        self.state = state;
        self.last_result = Some(GameResult {
            state,
            signal,
            elapsed,
            position,
        });

        debug!(%signal, ?position, elapsed_ms = elapsed.as_millis() as u64, "attempt ended");
        signal
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Grid the engine checks against.
    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Where the current attempt started.
    pub fn start_position(&self) -> Option<Point> {
        self.start_position
    }

    /// Last accepted cursor position.
    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    /// Live elapsed time (frozen once the attempt ended).
    pub fn elapsed(&self) -> Duration {
        self.chrono.elapsed(self.clock.now())
    }

    /// Elapsed time formatted with `precision` decimals.
    pub fn formatted_elapsed(&self, precision: usize) -> String {
        self.chrono.formatted(self.clock.now(), precision)
    }

    /// Winning time, only in `Won`.
    pub fn result_time(&self) -> Option<Duration> {
        match self.state {
            GameState::Won => self.last_result.map(|r| r.elapsed),
            _ => None,
        }
    }

    /// Winning time rounded to centiseconds, only in `Won`.
    pub fn result_centiseconds(&self) -> Option<u32> {
        self.result_time().map(to_centiseconds)
    }

    /// Most recent finished attempt, kept across resets.
    pub fn last_result(&self) -> Option<&GameResult> {
        self.last_result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::grid_from_ascii;
    use crate::game::timer::ManualClock;

    /// 12x7 track: start at x=1, finish at x=10, path on rows 2..=4.
    fn track() -> Arc<TerrainGrid> {
        Arc::new(grid_from_ascii(&[
            "............",
            "............",
            ".S########F.",
            ".S########F.",
            ".S########F.",
            "............",
            "............",
        ]))
    }

    fn engine_with(config: EngineConfig) -> (TraceEngine<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (TraceEngine::with_clock(track(), config, clock.clone()), clock)
    }

    fn engine() -> (TraceEngine<Arc<ManualClock>>, Arc<ManualClock>) {
        engine_with(EngineConfig::default())
    }

    fn exact() -> EngineConfig {
        EngineConfig { tolerance_radius: 0, ..Default::default() }
    }

    #[test]
    fn test_start_requires_start_cell() {
        let (mut engine, _) = engine();
        assert_eq!(
            engine.start(Point::new(4, 3)),
            Err(StartRejected::NotStartCell(Point::new(4, 3)))
        );
        assert_eq!(engine.state(), GameState::Idle);

        assert!(engine.start(Point::new(1, 3)).is_ok());
        assert_eq!(engine.state(), GameState::Playing);
        assert_eq!(engine.start_position(), Some(Point::new(1, 3)));
    }

    #[test]
    fn test_start_requires_idle() {
        let (mut engine, _) = engine();
        engine.start(Point::new(1, 3)).unwrap();
        assert_eq!(
            engine.start(Point::new(1, 2)),
            Err(StartRejected::NotIdle(GameState::Playing))
        );
        assert_eq!(engine.start_position(), Some(Point::new(1, 3)));
    }

    #[test]
    fn test_update_ignored_outside_playing() {
        let (mut engine, _) = engine();
        assert_eq!(engine.update_position(5, 3), None);
        assert_eq!(engine.update_position(-50, -50), None);
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.last_position(), None);

        engine.start(Point::new(1, 3)).unwrap();
        assert_eq!(engine.update_position(1, 0), None);
        assert_eq!(engine.update_position(1, 50), Some(TraceSignal::OutOfBounds));
        assert_eq!(engine.state(), GameState::Lost);
        let last = engine.last_position();
        let result = *engine.last_result().unwrap();

        // Terminal: further updates change nothing
        assert_eq!(engine.update_position(5, 3), None);
        assert_eq!(engine.state(), GameState::Lost);
        assert_eq!(engine.last_position(), last);
        assert_eq!(*engine.last_result().unwrap(), result);
    }

    #[test]
    fn test_full_run_wins() {
        let (mut engine, clock) = engine();
        engine.start(Point::new(1, 3)).unwrap();

        for x in 2..=7 {
            clock.advance(Duration::from_millis(100));
            assert_eq!(engine.update_position(x, 3), None);
            assert_eq!(engine.state(), GameState::Playing);
        }
        clock.advance(Duration::from_millis(100));
        // Within tolerance 2 of the finish column at x=10
        assert_eq!(engine.update_position(8, 3), Some(TraceSignal::Finish));
        assert_eq!(engine.state(), GameState::Won);
        assert_eq!(engine.result_time(), Some(Duration::from_millis(700)));
        assert_eq!(engine.result_centiseconds(), Some(70));

        // Elapsed stays frozen
        clock.advance(Duration::from_secs(5));
        assert_eq!(engine.elapsed(), Duration::from_millis(700));
        assert_eq!(engine.formatted_elapsed(2), "0.70");
    }

    #[test]
    fn test_exact_finish_without_tolerance() {
        let (mut engine, _) = engine_with(exact());
        engine.start(Point::new(1, 3)).unwrap();
        for x in 2..=9 {
            assert_eq!(engine.update_position(x, 3), None);
        }
        assert_eq!(engine.update_position(10, 3), Some(TraceSignal::Finish));
    }

    #[test]
    fn test_collision() {
        let (mut engine, _) = engine_with(exact());
        engine.start(Point::new(1, 3)).unwrap();
        assert_eq!(engine.update_position(4, 1), Some(TraceSignal::Collision));
        assert_eq!(engine.state(), GameState::Lost);
        let result = engine.last_result().unwrap();
        assert_eq!(result.signal, TraceSignal::Collision);
        assert_eq!(result.position, Point::new(4, 1));
        assert_eq!(engine.result_time(), None);
    }

    #[test]
    fn test_tolerance_absorbs_jitter() {
        let (mut engine, _) = engine();
        engine.start(Point::new(1, 3)).unwrap();
        // Two rows off the path, still within radius 2
        assert_eq!(engine.update_position(5, 0), None);
        assert_eq!(engine.update_position(5, 6), None);
        assert_eq!(engine.state(), GameState::Playing);
        // Below the image
        assert_eq!(engine.update_position(5, 7), Some(TraceSignal::OutOfBounds));
    }

    #[test]
    fn test_collision_beyond_tolerance() {
        let grid = Arc::new(grid_from_ascii(&[
            "S##########",
            "...........",
            "...........",
            "...........",
            "...........",
        ]));
        let mut engine = TraceEngine::with_clock(grid, EngineConfig::default(), ManualClock::new());
        engine.start(Point::new(0, 0)).unwrap();
        assert_eq!(engine.update_position(5, 2), None);
        assert_eq!(engine.update_position(5, 3), Some(TraceSignal::Collision));
    }

    #[test]
    fn test_out_of_bounds() {
        let (mut engine, _) = engine_with(exact());
        engine.start(Point::new(1, 3)).unwrap();
        assert_eq!(engine.update_position(-1, 3), Some(TraceSignal::OutOfBounds));
        assert_eq!(engine.state(), GameState::Lost);
    }

    #[test]
    fn test_finish_beats_out_of_bounds() {
        let (mut engine, _) = engine();
        engine.start(Point::new(1, 3)).unwrap();
        // Just right of the image, finish column within radius
        assert_eq!(engine.update_position(12, 3), Some(TraceSignal::Finish));
        assert_eq!(engine.state(), GameState::Won);
    }

    #[test]
    fn test_teleport_boundary() {
        let grid = Arc::new(TerrainGrid::from_fn(900, 10, |x, _| {
            if x == 0 { TerrainCode::Start } else { TerrainCode::Path }
        }));

        // Exactly 400 is allowed
        let mut engine = TraceEngine::with_clock(grid.clone(), EngineConfig::default(), ManualClock::new());
        engine.start(Point::new(0, 5)).unwrap();
        assert_eq!(engine.update_position(400, 5), None);
        assert_eq!(engine.state(), GameState::Playing);

        // 401 is a teleport
        let mut engine = TraceEngine::with_clock(grid, EngineConfig::default(), ManualClock::new());
        engine.start(Point::new(0, 5)).unwrap();
        assert_eq!(engine.update_position(401, 5), Some(TraceSignal::Teleport));
        assert_eq!(engine.state(), GameState::Lost);
        assert_eq!(engine.last_result().unwrap().signal, TraceSignal::Teleport);
    }

    #[test]
    fn test_teleport_measured_from_last_position() {
        let grid = Arc::new(TerrainGrid::from_fn(900, 10, |x, _| {
            if x == 0 { TerrainCode::Start } else { TerrainCode::Path }
        }));
        let mut engine = TraceEngine::with_clock(grid, EngineConfig::default(), ManualClock::new());
        engine.start(Point::new(0, 5)).unwrap();
        assert_eq!(engine.update_position(300, 5), None);
        assert_eq!(engine.update_position(700, 5), None);
        assert_eq!(engine.update_position(299, 5), Some(TraceSignal::Teleport));
    }

    #[test]
    fn test_teleport_onto_finish_still_loses() {
        let grid = Arc::new(TerrainGrid::from_fn(900, 10, |x, _| match x {
            0 => TerrainCode::Start,
            899 => TerrainCode::Finish,
            _ => TerrainCode::Path,
        }));
        let mut engine = TraceEngine::with_clock(grid, EngineConfig::default(), ManualClock::new());
        engine.start(Point::new(0, 5)).unwrap();
        assert_eq!(engine.update_position(899, 5), Some(TraceSignal::Teleport));
        assert_eq!(engine.state(), GameState::Lost);
    }

    #[test]
    fn test_abandon_and_click() {
        let (mut engine, _) = engine();
        assert_eq!(engine.abandon(AbandonReason::PointerLeft), None);

        engine.start(Point::new(1, 3)).unwrap();
        engine.update_position(3, 3);
        assert_eq!(engine.abandon(AbandonReason::PointerLeft), Some(TraceSignal::Abandoned));
        assert_eq!(engine.state(), GameState::Lost);
        assert_eq!(engine.last_result().unwrap().position, Point::new(3, 3));

        engine.reset();
        engine.start(Point::new(1, 3)).unwrap();
        assert_eq!(engine.abandon(AbandonReason::Pressed), Some(TraceSignal::Clicked));
        // Already lost
        assert_eq!(engine.abandon(AbandonReason::Pressed), None);
    }

    #[test]
    fn test_reset_from_any_state() {
        let (mut engine, clock) = engine();
        engine.reset();
        assert_eq!(engine.state(), GameState::Idle);

        engine.start(Point::new(1, 3)).unwrap();
        clock.advance(Duration::from_secs(1));
        engine.reset();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.elapsed(), Duration::ZERO);
        assert_eq!(engine.start_position(), None);
        assert_eq!(engine.last_position(), None);

        engine.start(Point::new(1, 3)).unwrap();
        engine.update_position(8, 3);
        assert_eq!(engine.state(), GameState::Won);
        engine.reset();
        assert_eq!(engine.state(), GameState::Idle);
        assert_eq!(engine.result_time(), None);
        // Last result survives for display
        assert_eq!(engine.last_result().unwrap().state, GameState::Won);
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tolerance_radius, 2);
        assert_eq!(config.teleport_threshold, 400);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = EngineConfig::from_lookup(|name| match name {
            "ENGINE_TOLERANCE" => Some("5".into()),
            "ENGINE_TELEPORT_THRESHOLD" => Some("250".into()),
            _ => None,
        });
        assert_eq!(config, EngineConfig { tolerance_radius: 5, teleport_threshold: 250 });

        let config = EngineConfig::from_lookup(|name| match name {
            "ENGINE_TOLERANCE" => Some("-1".into()),
            _ => None,
        });
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_update_ignored_after_win() {
        let (mut engine, clock) = engine();
        engine.start(Point::new(1, 3)).unwrap();
        clock.advance(Duration::from_millis(700));
        assert_eq!(engine.update_position(8, 3), Some(TraceSignal::Finish));
        let last = engine.last_position();
        let result = *engine.last_result().unwrap();

        clock.advance(Duration::from_secs(3));
        assert_eq!(engine.update_position(4, 0), None);
        assert_eq!(engine.update_position(900, 900), None);
        assert_eq!(engine.state(), GameState::Won);
        assert_eq!(engine.last_position(), last);
        assert_eq!(*engine.last_result().unwrap(), result);
        assert_eq!(engine.result_centiseconds(), Some(70));
    }
}

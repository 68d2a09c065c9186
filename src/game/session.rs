//! Circuit Sessions
//!
//! A session is one loaded circuit: its grid, a fresh signing token, and an
//! engine. Each load generates a new token, so a signed time is bound to the
//! circuit load it was played on.

use std::sync::Arc;
use tracing::{info, warn};

use crate::circuit::assets::{is_known_circuit, CircuitAssets};
use crate::circuit::bitmap::BitmapError;
use crate::circuit::builder::GridBuilder;
use crate::core::grid::{find_finish_positions, find_start_positions, TerrainGrid};
use crate::core::point::Point;
use crate::game::engine::{EngineConfig, TraceEngine};
use crate::game::events::GameState;
use crate::game::timer::{centiseconds_to_seconds, Clock, MonotonicClock};
use crate::network::protocol::SubmitRequest;
use crate::security::signature::compute_key;
use crate::security::token::{generate_session_token, SessionToken};
use crate::storage::{KeyValueStore, LocalRecords, StorageError, UserPreferences};

/// One playable circuit load.
pub struct CircuitSession<C: Clock = MonotonicClock> {
    circuit: u32,
    grid: Arc<TerrainGrid>,
    token: SessionToken,
    start_positions: Vec<Point>,
    finish_positions: Vec<Point>,
    engine: TraceEngine<C>,
}

impl<C: Clock> CircuitSession<C> {
    /// Circuit id.
    pub fn circuit(&self) -> u32 {
        self.circuit
    }

    /// Classified grid.
    pub fn grid(&self) -> &Arc<TerrainGrid> {
        &self.grid
    }

    /// Signing token of this load.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Every START cell.
    pub fn start_positions(&self) -> &[Point] {
        &self.start_positions
    }

    /// Every FINISH cell.
    pub fn finish_positions(&self) -> &[Point] {
        &self.finish_positions
    }

    /// Engine, read-only.
    pub fn engine(&self) -> &TraceEngine<C> {
        &self.engine
    }

    /// Engine, for driving input.
    pub fn engine_mut(&mut self) -> &mut TraceEngine<C> {
        &mut self.engine
    }

    /// Signed submission for the winning time, if the attempt was won.
    ///
    /// Every won time is meant to be sent; the server decides whether it
    /// enters the list. A win that rounds to zero centiseconds cannot be
    /// told apart from an unset chrono, so it yields no submission.
    pub fn signed_submission(&self, pseudo: &str) -> Option<SubmitRequest> {
        if self.engine.state() != GameState::Won {
            return None;
        }
        let chrono = i64::from(self.engine.result_centiseconds().filter(|&c| c > 0)?);
        Some(SubmitRequest {
            circuit: self.circuit,
            pseudo: pseudo.to_string(),
            chrono,
            token: self.token.as_str().to_string(),
            key: compute_key(chrono, self.token.as_str()),
        })
    }

    /// Save the winning time as a personal best if it beats the cached one.
    ///
    /// Returns whether it was a new personal best; `false` when not won.
    pub fn record_personal_best<S: KeyValueStore>(
        &self,
        records: &LocalRecords<S>,
    ) -> Result<bool, StorageError> {
        match self.engine.result_centiseconds() {
            Some(centis) => records.save(self.circuit, centiseconds_to_seconds(centis)),
            None => Ok(false),
        }
    }
}

/// Loads circuits into sessions.
pub struct CircuitLoader<A, S> {
    assets: A,
    builder: GridBuilder,
    config: EngineConfig,
    preferences: UserPreferences<S>,
}

impl<A: CircuitAssets, S: KeyValueStore> CircuitLoader<A, S> {
    /// Create a loader.
    pub fn new(assets: A, builder: GridBuilder, config: EngineConfig, preferences: UserPreferences<S>) -> Self {
        Self {
            assets,
            builder,
            config,
            preferences,
        }
    }

    /// Player preferences the loader writes to.
    pub fn preferences(&self) -> &UserPreferences<S> {
        &self.preferences
    }

    /// Load `circuit` on the process monotonic clock.
    pub async fn load(&self, circuit: u32) -> Result<CircuitSession, BitmapError> {
        self.load_with_clock(circuit, MonotonicClock).await
    }

    /// Load `circuit` with a custom engine clock.
    ///
    /// A failed build produces no session. Failing to remember the circuit
    /// as last visited is logged and ignored.
    pub async fn load_with_clock<C: Clock>(&self, circuit: u32, clock: C) -> Result<CircuitSession<C>, BitmapError> {
        if !is_known_circuit(circuit) {
            return Err(BitmapError::AssetNotFound(circuit));
        }

        let bytes = self.assets.load(circuit)?;
        let grid = Arc::new(self.builder.build(bytes).await?);

        let start_positions = find_start_positions(&grid);
        let finish_positions = find_finish_positions(&grid);
        if start_positions.is_empty() || finish_positions.is_empty() {
            warn!(circuit, starts = start_positions.len(), finishes = finish_positions.len(), "circuit is not playable");
        }

        if let Err(e) = self.preferences.set_last_circuit(circuit) {
            warn!(circuit, error = %e, "could not remember last circuit");
        }

        info!(circuit, width = grid.width(), height = grid.height(), "circuit loaded");

        Ok(CircuitSession {
            circuit,
            engine: TraceEngine::with_clock(grid.clone(), self.config, clock),
            grid,
            token: generate_session_token(),
            start_positions,
            finish_positions,
        })
    }
}

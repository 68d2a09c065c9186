//! # Circuit Tracer
//!
//! Path-tracing minigame core: a player drags the cursor from a start zone to
//! a finish zone along a track drawn in an image, without leaving the track.
//! Winning times are signed with a per-load session token and submitted to a
//! shared top-10 leaderboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CIRCUIT TRACER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure primitives                          │
//! │  ├── terrain.rs  - Pixel color classification               │
//! │  ├── grid.rs     - Column-major terrain grid                │
//! │  └── point.rs    - Cursor positions and distances           │
//! │                                                             │
//! │  circuit/        - Image to grid                            │
//! │  ├── assets.rs   - Circuit image sources                    │
//! │  ├── bitmap.rs   - Classification and noise cleanup         │
//! │  └── builder.rs  - Inline or offloaded builds               │
//! │                                                             │
//! │  game/           - Client-side play                         │
//! │  ├── timer.rs    - Chronometer and clocks                   │
//! │  ├── events.rs   - States and terminal signals              │
//! │  ├── engine.rs   - Collision / progress state machine       │
//! │  └── session.rs  - Circuit load and signed submissions      │
//! │                                                             │
//! │  security/       - Tokens, HMAC keys, pseudo validation     │
//! │  storage/        - Player key-value port, personal bests    │
//! │                                                             │
//! │  leaderboard/    - Server-side scores                       │
//! │  ├── record.rs   - `pseudo,seconds` line codec              │
//! │  ├── store.rs    - Per-circuit file and memory stores       │
//! │  └── service.rs  - Verified, serialized insertion           │
//! │                                                             │
//! │  network/        - HTTP API                                 │
//! │  ├── protocol.rs - JSON bodies                              │
//! │  └── server.rs   - axum router and server lifecycle         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trust Model
//!
//! The session token is generated by the client and travels with the score,
//! so a signature only proves that the submitter ran the signing code. It
//! keeps casual tampering out of the leaderboard; it is not authentication.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod circuit;
pub mod game;
pub mod security;
pub mod storage;
pub mod leaderboard;
pub mod network;

// Re-export commonly used types
pub use crate::core::{classify, Point, TerrainCode, TerrainGrid};
pub use circuit::{build_grid, BitmapError, BuildMode, GridBuilder};
pub use game::{CircuitLoader, CircuitSession, EngineConfig, GameState, TraceEngine, TraceSignal};
pub use security::{compute_key, generate_session_token, SessionToken, SENTINEL_CHRONO};
pub use leaderboard::{Leaderboard, ScoreRecord, SubmitOutcome, LEADERBOARD_SIZE};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

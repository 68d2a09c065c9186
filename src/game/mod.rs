//! Game Logic
//!
//! Everything that happens between clicking a start cell and reaching the
//! finish. The engine is driven synchronously, one input event at a time.
//!
//! ## Module Structure
//!
//! - `timer`: Chronometer and injectable clocks
//! - `events`: Engine states and terminal signals
//! - `engine`: Collision / progress state machine
//! - `session`: Circuit loading and signed submissions

pub mod timer;
pub mod events;
pub mod engine;
pub mod session;

// Re-export key types
pub use timer::{Chronometer, Clock, ManualClock, MonotonicClock, DEFAULT_PRECISION};
pub use events::{AbandonReason, GameResult, GameState, TraceSignal};
pub use engine::{EngineConfig, StartRejected, TraceEngine};
pub use session::{CircuitLoader, CircuitSession};

//! Core primitives.
//!
//! Pure, allocation-light types shared by every other layer: terrain codes,
//! the terrain grid, and integer cursor positions. Nothing in here touches
//! I/O, clocks, or randomness.

pub mod terrain;
pub mod grid;
pub mod point;

// Re-export core types
pub use terrain::{classify, TerrainCode};
pub use grid::{TerrainGrid, find_start_positions, find_finish_positions};
pub use point::Point;

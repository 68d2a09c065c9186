//! Grid Building Modes
//!
//! The same pure build function runs either on the caller's thread or on
//! tokio's blocking pool. Both paths produce bit-identical grids; the
//! offloaded one only exchanges the image bytes and the finished grid.

use tracing::debug;

use crate::core::grid::TerrainGrid;
use crate::circuit::bitmap::{build_grid, BitmapError};

/// Images larger than this are offloaded in `BuildMode::Auto`.
pub const OFFLOAD_THRESHOLD_BYTES: usize = 256 * 1024;

/// Where the build runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Decode and classify on the calling task.
    Inline,
    /// Decode and classify on the blocking thread pool.
    Offload,
    /// Offload only images above `OFFLOAD_THRESHOLD_BYTES`.
    #[default]
    Auto,
}

impl BuildMode {
    /// Resolve `Auto` for an image of `len` bytes.
    pub fn resolve(self, len: usize) -> BuildMode {
        match self {
            BuildMode::Auto if len > OFFLOAD_THRESHOLD_BYTES => BuildMode::Offload,
            BuildMode::Auto => BuildMode::Inline,
            other => other,
        }
    }
}

/// Builds terrain grids in a fixed mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBuilder {
    mode: BuildMode,
}

impl GridBuilder {
    /// Create a builder with an explicit mode.
    pub fn new(mode: BuildMode) -> Self {
        Self { mode }
    }

    /// Configured mode.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Build a grid from encoded image bytes.
    ///
    /// Dropping the returned future discards the result; an offloaded build
    /// still runs to completion on its worker but nothing observes it.
    pub async fn build(&self, bytes: Vec<u8>) -> Result<TerrainGrid, BitmapError> {
        match self.mode.resolve(bytes.len()) {
            BuildMode::Offload => {
                debug!(len = bytes.len(), "offloading bitmap build");
                tokio::task::spawn_blocking(move || build_grid(&bytes))
                    .await
                    .map_err(|e| BitmapError::WorkerFailed(e.to_string()))?
            }
            _ => build_grid(&bytes),
        }
    }
}

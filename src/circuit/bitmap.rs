//! Bitmap Builder
//!
//! Rasterizes a circuit image into a terrain grid, then removes stray
//! anti-aliased path pixels.

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::core::grid::TerrainGrid;
use crate::core::terrain::{classify_rgba, TerrainCode};

/// A path cell with at least this many off-path 8-neighbors is noise.
pub const NOISE_NEIGHBOR_THRESHOLD: usize = 6;

/// Bitmap build errors.
///
/// No partial grid is ever produced alongside an error.
#[derive(Debug, Error)]
pub enum BitmapError {
    /// The bytes are not a decodable image.
    #[error("failed to decode circuit image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// No image exists for the requested circuit.
    #[error("no image for circuit {0}")]
    AssetNotFound(u32),

    /// Reading the image asset failed.
    #[error("failed to read circuit image: {0}")]
    Io(#[from] std::io::Error),

    /// The offloaded build task panicked or was cancelled.
    #[error("bitmap worker failed: {0}")]
    WorkerFailed(String),
}

/// Decode `bytes` and build the cleaned terrain grid.
pub fn build_grid(bytes: &[u8]) -> Result<TerrainGrid, BitmapError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let mut grid = classify_image(&image);
    let removed = cleanup_noise(&mut grid);

    debug!(
        width = grid.width(),
        height = grid.height(),
        removed,
        "built terrain grid"
    );

    Ok(grid)
}

/// Classify every pixel of a decoded image.
pub fn classify_image(image: &RgbaImage) -> TerrainGrid {
    TerrainGrid::from_fn(image.width(), image.height(), |x, y| {
        classify_rgba(image.get_pixel(x, y).0)
    })
}

/// Remove isolated path pixels until none remain.
///
/// Each pass reads a snapshot of the grid taken before the pass, so no
/// decision depends on a cell already changed in the same pass. Passes
/// repeat until one changes nothing, which makes the cleanup idempotent.
/// Only interior cells are considered. Returns the number of cells removed.
pub fn cleanup_noise(grid: &mut TerrainGrid) -> usize {
    let mut total = 0;
    loop {
        let removed = cleanup_pass(grid);
        if removed == 0 {
            return total;
        }
        total += removed;
    }
}

/// One snapshot pass of the noise filter.
fn cleanup_pass(grid: &mut TerrainGrid) -> usize {
    if grid.width() < 3 || grid.height() < 3 {
        return 0;
    }

    let snapshot = grid.clone();
    let mut removed = 0;

    for x in 1..grid.width() - 1 {
        for y in 1..grid.height() - 1 {
            if snapshot.get(x as i32, y as i32) != Some(TerrainCode::Path) {
                continue;
            }
            if snapshot.count_neighbors(x, y, TerrainCode::OffPath) >= NOISE_NEIGHBOR_THRESHOLD {
                grid.set(x, y, TerrainCode::OffPath);
                removed += 1;
            }
        }
    }

    removed
}

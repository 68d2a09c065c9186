//! Circuit Image Sources
//!
//! Circuit images are opaque binary assets addressed by circuit id.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::circuit::bitmap::BitmapError;

/// Number of circuits in the catalog (ids `1..=TOTAL_CIRCUITS`).
pub const TOTAL_CIRCUITS: u32 = 17;

/// Whether `circuit` is part of the catalog.
#[inline]
pub fn is_known_circuit(circuit: u32) -> bool {
    (1..=TOTAL_CIRCUITS).contains(&circuit)
}

/// File name of a circuit's image.
pub fn image_file_name(circuit: u32) -> String {
    format!("parcours{}.png", circuit)
}

/// Source of encoded circuit images.
pub trait CircuitAssets: Send + Sync {
    /// Load the encoded image for `circuit`.
    fn load(&self, circuit: u32) -> Result<Vec<u8>, BitmapError>;
}

/// Images stored as `parcours{id}.png` in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Serve images from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create from the `CIRCUIT_IMAGES_DIR` environment variable (default `images`).
    pub fn from_env() -> Self {
        Self::new(std::env::var("CIRCUIT_IMAGES_DIR").unwrap_or_else(|_| "images".to_string()))
    }

    /// Image directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CircuitAssets for DirectoryAssets {
    fn load(&self, circuit: u32) -> Result<Vec<u8>, BitmapError> {
        if !is_known_circuit(circuit) {
            return Err(BitmapError::AssetNotFound(circuit));
        }
        match std::fs::read(self.root.join(image_file_name(circuit))) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BitmapError::AssetNotFound(circuit)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Images held in memory, keyed by circuit id.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    images: BTreeMap<u32, Vec<u8>>,
}

impl MemoryAssets {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an image.
    pub fn with_image(mut self, circuit: u32, bytes: Vec<u8>) -> Self {
        self.images.insert(circuit, bytes);
        self
    }
}

impl CircuitAssets for MemoryAssets {
    fn load(&self, circuit: u32) -> Result<Vec<u8>, BitmapError> {
        self.images
            .get(&circuit)
            .cloned()
            .ok_or(BitmapError::AssetNotFound(circuit))
    }
}

//! Circuit Loading
//!
//! Turns circuit images into terrain grids.
//!
//! ## Module Structure
//!
//! - `assets`: Where circuit images come from
//! - `bitmap`: Pixel classification and noise cleanup
//! - `builder`: Inline or offloaded grid building behind one interface

pub mod assets;
pub mod bitmap;
pub mod builder;

// Re-export key types
pub use assets::{CircuitAssets, DirectoryAssets, MemoryAssets, TOTAL_CIRCUITS};
pub use bitmap::{build_grid, cleanup_noise, BitmapError};
pub use builder::{BuildMode, GridBuilder};

/// In-memory PNG fixtures shared by tests across the crate.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;
    use image::{ImageFormat, Rgba, RgbaImage};

    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
    pub const BLUE: [u8; 4] = [0, 0, 255, 255];
    pub const GREEN: [u8; 4] = [0, 255, 0, 255];
    pub const RED: [u8; 4] = [255, 0, 0, 255];

    /// 40x12 circuit: a horizontal band on rows 4..=7, start on columns
    /// 2..=4, finish on columns 35..=37, plus one stray path pixel at (20, 1).
    pub fn sample_circuit_image() -> RgbaImage {
        let mut image = RgbaImage::from_pixel(40, 12, Rgba(WHITE));
        for x in 2..=37 {
            for y in 4..=7 {
                let color = match x {
                    2..=4 => GREEN,
                    35..=37 => RED,
                    _ => BLUE,
                };
                image.put_pixel(x, y, Rgba(color));
            }
        }
        image.put_pixel(20, 1, Rgba(BLUE));
        image
    }

    pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("encode fixture png");
        bytes.into_inner()
    }

    pub fn sample_circuit_png() -> Vec<u8> {
        encode_png(&sample_circuit_image())
    }
}

//! Terrain Grid
//!
//! Two-dimensional terrain map indexed `[x][y]`, one cell per source pixel.
//! Built once per circuit load and immutable afterwards.

use serde::{Serialize, Deserialize};

use super::point::Point;
use super::terrain::TerrainCode;

/// Offsets of the 8-neighborhood, row by row.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Immutable terrain map.
///
/// Storage is column-major so that a column `x` is one contiguous slice,
/// matching the `[x][y]` indexing of circuit tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<TerrainCode>,
}

impl TerrainGrid {
    /// Create a grid filled with a single code.
    pub fn filled(width: u32, height: u32, code: TerrainCode) -> Self {
        Self {
            width,
            height,
            cells: vec![code; width as usize * height as usize],
        }
    }

    /// Create a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> TerrainCode) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for x in 0..width {
            for y in 0..height {
                cells.push(f(x, y));
            }
        }
        Self { width, height, cells }
    }

    /// Grid width in cells (image width in pixels).
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells (image height in pixels).
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        x as usize * self.height as usize + y as usize
    }

    /// Whether a signed position lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Code at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<TerrainCode> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index(x as u32, y as u32)])
        } else {
            None
        }
    }

    /// Code at a point, or `None` when out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<TerrainCode> {
        self.get(p.x, p.y)
    }

    /// Overwrite one cell. Only used while the grid is being built.
    #[inline]
    pub(crate) fn set(&mut self, x: u32, y: u32, code: TerrainCode) {
        let idx = self.index(x, y);
        self.cells[idx] = code;
    }

    /// One column of the grid.
    pub fn column(&self, x: u32) -> Option<&[TerrainCode]> {
        if x >= self.width {
            return None;
        }
        let start = self.index(x, 0);
        Some(&self.cells[start..start + self.height as usize])
    }

    /// Iterate `(x, y, code)` in `[x][y]` order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, TerrainCode)> + '_ {
        let height = self.height.max(1);
        self.cells.iter().enumerate().map(move |(i, code)| {
            let i = i as u32;
            (i / height, i % height, *code)
        })
    }

    /// Count in-bounds 8-neighbors of `(x, y)` holding `code`.
    pub fn count_neighbors(&self, x: u32, y: u32, code: TerrainCode) -> usize {
        NEIGHBORS_8
            .iter()
            .filter(|(dx, dy)| self.get(x as i32 + dx, y as i32 + dy) == Some(code))
            .count()
    }

    /// Whether any in-bounds cell of the box neighborhood around `center`
    /// (Chebyshev distance <= `radius`) satisfies `pred`.
    pub fn any_within(&self, center: Point, radius: u32, mut pred: impl FnMut(TerrainCode) -> bool) -> bool {
        let r = radius.min(i32::MAX as u32) as i32;
        let x0 = center.x.saturating_sub(r).max(0);
        let y0 = center.y.saturating_sub(r).max(0);
        let x1 = center.x.saturating_add(r).min(self.width as i32 - 1);
        let y1 = center.y.saturating_add(r).min(self.height as i32 - 1);

        for x in x0..=x1 {
            for y in y0..=y1 {
                if pred(self.cells[self.index(x as u32, y as u32)]) {
                    return true;
                }
            }
        }
        false
    }

    /// Number of cells holding `code`.
    pub fn count(&self, code: TerrainCode) -> usize {
        self.cells.iter().filter(|c| **c == code).count()
    }
}

/// Every START cell, in `[x][y]` scan order.
pub fn find_start_positions(grid: &TerrainGrid) -> Vec<Point> {
    find_positions(grid, TerrainCode::Start)
}

/// Every FINISH cell, in `[x][y]` scan order.
pub fn find_finish_positions(grid: &TerrainGrid) -> Vec<Point> {
    find_positions(grid, TerrainCode::Finish)
}

fn find_positions(grid: &TerrainGrid, code: TerrainCode) -> Vec<Point> {
    grid.iter()
        .filter(|(_, _, c)| *c == code)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect()
}

/// Build a grid from ASCII rows (`.` off-path, `S` start, `#` path, `F` finish).
///
/// Row index is `y`, character index is `x`.
#[cfg(test)]
pub(crate) fn grid_from_ascii(rows: &[&str]) -> TerrainGrid {
    let height = rows.len() as u32;
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    TerrainGrid::from_fn(width, height, |x, y| {
        match rows[y as usize].as_bytes()[x as usize] {
            b'S' => TerrainCode::Start,
            b'#' => TerrainCode::Path,
            b'F' => TerrainCode::Finish,
            _ => TerrainCode::OffPath,
        }
    })
}

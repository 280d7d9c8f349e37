/// The room grid: a fixed-size 2D array of tiles.
///
/// Stored row-major in a single `Vec`. Every cell always holds a tile,
/// so reads inside the bounds never fail. Coordinates are `(x, y)` with
/// `y = 0` at the top (the ceiling row).

use std::fmt;

use super::tile::Tile;

/// Width of a generated room, in tiles.
pub const LEVEL_WIDTH: usize = 35;
/// Height of a generated room, in tiles.
pub const LEVEL_HEIGHT: usize = 18;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Grid { width, height, cells: vec![fill; width * height] }
    }

    #[inline]
    pub fn width(&self) -> usize { self.width }

    #[inline]
    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        if self.in_bounds(x, y) {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Tile at (x, y). Out of bounds reads as wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.get(x, y).unwrap_or(Tile::Wall)
    }

    /// Replace the tile at (x, y). Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if self.in_bounds(x, y) {
            self.cells[y * self.width + x] = tile;
        }
    }

    /// Swap two cells. No-op if either is out of bounds.
    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) {
        if self.in_bounds(a.0, a.1) && self.in_bounds(b.0, b.1) {
            self.cells.swap(a.1 * self.width + a.0, b.1 * self.width + b.0);
        }
    }

    /// Iterate rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.width.max(1))
    }

    /// Number of cells holding `tile`.
    #[cfg(test)]
    pub fn count(&self, tile: Tile) -> usize {
        self.cells.iter().filter(|&&t| t == tile).count()
    }

    /// Build a grid from an ASCII diagram (see `Tile::glyph` for the legend).
    /// Short rows are padded with open space.
    #[cfg(test)]
    pub fn from_diagram(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Grid::new(width, height, Tile::Background);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set(x, y, Tile::from_glyph(ch));
            }
        }
        grid
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|t| t.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_as_wall_and_writes_are_dropped() {
        let mut g = Grid::new(3, 2, Tile::Background);
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.tile_at(3, 0), Tile::Wall);
        g.set(5, 5, Tile::Box);
        assert_eq!(g.count(Tile::Box), 0);
    }

    #[test]
    fn swap_moves_tiles() {
        let mut g = Grid::from_diagram(&[
            "B ",
            "  ",
        ]);
        g.swap((0, 0), (0, 1));
        assert_eq!(g.tile_at(0, 0), Tile::Background);
        assert_eq!(g.tile_at(0, 1), Tile::Box);
    }

    #[test]
    fn diagram_round_trips_through_display() {
        let rows = ["^^^^", "|B$D", "===="];
        let g = Grid::from_diagram(&rows);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert_eq!(g.to_string(), "^^^^\n|B$D\n====\n");
    }
}

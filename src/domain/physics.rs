/// Gravity: pure grid transforms.
///
/// ## Player gravity
///
/// The player drops while the cell directly below is open space. The whole
/// fall resolves within one turn (no per-turn cap).
///
/// ## Tile gravity
///
/// One pass per turn. Rows are scanned bottom to top, each row left to
/// right. A BOX / ITEMBOX with open space directly below swaps with it and
/// moves down exactly one row. Because the row below has already been
/// scanned, a tile that just moved is never visited again in the same pass,
/// so a falling stack moves down as a unit by one row.
///
/// ## Crush
///
/// If a tile lands on the cell the player occupies, the pass stops and the
/// landing cell is reported. The engine turns that into the terminal outcome.

use super::entity::Player;
use super::grid::Grid;

/// Result of one tile gravity pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TileFall {
    /// Tiles moved down by one row.
    pub moved: usize,
    /// Cell where a tile landed on the player, if any.
    pub crush: Option<(usize, usize)>,
}

/// Drop the player until something is below them. Returns rows fallen.
pub fn settle_player(grid: &Grid, player: &mut Player) -> usize {
    let mut fallen = 0;
    while player.y + 1 < grid.height() && grid.tile_at(player.x, player.y + 1).is_open() {
        player.y += 1;
        fallen += 1;
    }
    fallen
}

/// Run one tile gravity pass. `occupied` is the player's cell.
pub fn drop_tiles(grid: &mut Grid, occupied: (usize, usize)) -> TileFall {
    let mut fall = TileFall::default();
    let (w, h) = (grid.width(), grid.height());
    if h < 2 { return fall; }

    for y in (0..h - 1).rev() {
        for x in 0..w {
            if !grid.tile_at(x, y).is_falling_kind() { continue; }
            if !grid.tile_at(x, y + 1).is_open() { continue; }

            grid.swap((x, y), (x, y + 1));
            fall.moved += 1;

            if occupied == (x, y + 1) {
                fall.crush = Some((x, y + 1));
                return fall;
            }
        }
    }
    fall
}

/// True when no falling tile has open space beneath it.
#[cfg(test)]
pub fn is_settled(grid: &Grid) -> bool {
    for y in 0..grid.height().saturating_sub(1) {
        for x in 0..grid.width() {
            if grid.tile_at(x, y).is_falling_kind() && grid.tile_at(x, y + 1).is_open() {
                return false;
            }
        }
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

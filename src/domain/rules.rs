/// Movement, break and level-exit rules, written as truth tables.
///
/// Pure functions over the grid with no side effects.
/// These encode "what is legal" without performing the action.
///
/// ## Horizontal Move Truth Table
///
/// Target = adjacent cell in the movement direction, same row.
/// ┌──────────────────────────────┬──────────────┬──────────────────────┐
/// │ Condition                     │ Outcome      │ Notes                │
/// ├──────────────────────────────┼──────────────┼──────────────────────┤
/// │ Target out of bounds          │ Blocked      │ map edge             │
/// │ Target BACKGROUND             │ Walk         │                      │
/// │ Target BOX / ITEMBOX,         │ Climb        │ lands at (tx, y - 1) │
/// │   diagonal above is BACKGROUND│              │                      │
/// │ Target BOX / ITEMBOX,         │ Blocked      │                      │
/// │   diagonal blocked or y == 0  │              │                      │
/// │ Target ITEM                   │ Collect      │ item consumed        │
/// │ Target DOOR, door entry on    │ Walk         │ house rule           │
/// │ Otherwise                     │ Blocked      │ wall/floor/ceiling   │
/// └──────────────────────────────┴──────────────┴──────────────────────┘
///
/// ## Break Truth Table
///
/// Applies to the 3×3 neighbourhood around the player, clamped to bounds.
/// ┌────────────┬──────────────┐
/// │ Cell        │ Becomes      │
/// ├────────────┼──────────────┤
/// │ BOX         │ BACKGROUND   │
/// │ ITEMBOX     │ ITEM         │
/// │ Otherwise   │ unchanged    │
/// └────────────┴──────────────┘
///
/// ## Level Exit
/// Complete ⇔ player cell is DOOR ∧ items_collected ≥ 2 × level.

use super::entity::{Facing, Player};
use super::grid::Grid;
use super::tile::Tile;

/// Result of attempting a horizontal move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// Step into the target cell.
    Walk { x: usize, y: usize },
    /// Step diagonally up onto an obstacle.
    Climb { x: usize, y: usize },
    /// Consume the item in the target cell and step into it.
    Collect { x: usize, y: usize },
    Blocked,
}

/// Decide what a horizontal move from (x, y) does. See truth table above.
///
/// `door_entry` lets the player step into a DOOR cell the same way as into
/// open space; with it off, a DOOR blocks like a wall.
pub fn horizontal_move(grid: &Grid, x: usize, y: usize, dir: Facing, door_entry: bool) -> MoveOutcome {
    let tx = match dir.step_from(x, grid.width()) {
        Some(tx) => tx,
        None => return MoveOutcome::Blocked,
    };
    let target = match grid.get(tx, y) {
        Some(t) => t,
        None => return MoveOutcome::Blocked,
    };

    match target {
        Tile::Background => MoveOutcome::Walk { x: tx, y },
        t if t.is_climbable() => {
            if y == 0 { return MoveOutcome::Blocked; }
            if can_land(grid, tx, y - 1, door_entry) {
                MoveOutcome::Climb { x: tx, y: y - 1 }
            } else {
                MoveOutcome::Blocked
            }
        }
        t if t.is_item() => MoveOutcome::Collect { x: tx, y },
        Tile::Door if door_entry => MoveOutcome::Walk { x: tx, y },
        _ => MoveOutcome::Blocked,
    }
}

fn can_land(grid: &Grid, x: usize, y: usize, door_entry: bool) -> bool {
    match grid.get(x, y) {
        Some(Tile::Background) => true,
        Some(Tile::Door) => door_entry,
        _ => false,
    }
}

/// Cells a break at (x, y) would change, paired with their replacement.
/// Scans the 3×3 neighbourhood (clamped to the grid) column by column.
pub fn break_targets(grid: &Grid, x: usize, y: usize) -> Vec<(usize, usize, Tile)> {
    let mut out = Vec::new();
    if grid.width() == 0 || grid.height() == 0 { return out; }

    let x_lo = x.saturating_sub(1);
    let x_hi = (x + 1).min(grid.width() - 1);
    let y_lo = y.saturating_sub(1);
    let y_hi = (y + 1).min(grid.height() - 1);

    for cx in x_lo..=x_hi {
        for cy in y_lo..=y_hi {
            if let Some(replacement) = grid.tile_at(cx, cy).broken() {
                out.push((cx, cy, replacement));
            }
        }
    }
    out
}

/// Items needed to open the door on `level`.
pub fn items_required(level: u32) -> u32 {
    level * 2
}

/// Row of the door on `level`: rises one row per level, never into the ceiling.
pub fn door_row(level: u32, height: usize) -> usize {
    let row = height as i64 - 2 - level as i64;
    row.max(1) as usize
}

/// Is the level finished? (Player on the door with enough items.)
pub fn is_level_complete(grid: &Grid, player: &Player, level: u32) -> bool {
    grid.tile_at(player.x, player.y).is_door()
        && player.items_collected() >= items_required(level)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── Horizontal movement ──

    #[test]
    fn walk_into_open_space() {
        let g = Grid::from_diagram(&[
            "|   |",
            "=====",
        ]);
        assert_eq!(horizontal_move(&g, 2, 0, Facing::Right, false), MoveOutcome::Walk { x: 3, y: 0 });
        assert_eq!(horizontal_move(&g, 2, 0, Facing::Left, false), MoveOutcome::Walk { x: 1, y: 0 });
    }

    #[test]
    fn wall_floor_ceiling_block() {
        let g = Grid::from_diagram(&[
            "^^^",
            "| =",
        ]);
        assert_eq!(horizontal_move(&g, 1, 1, Facing::Left, false), MoveOutcome::Blocked);
        assert_eq!(horizontal_move(&g, 1, 1, Facing::Right, false), MoveOutcome::Blocked);
    }

    #[test]
    fn map_edge_blocks() {
        let g = Grid::from_diagram(&["   "]);
        assert_eq!(horizontal_move(&g, 0, 0, Facing::Left, false), MoveOutcome::Blocked);
        assert_eq!(horizontal_move(&g, 2, 0, Facing::Right, false), MoveOutcome::Blocked);
    }

    #[test]
    fn climb_box_when_diagonal_open() {
        let g = Grid::from_diagram(&[
            "     ",
            "  B  ",
            "=====",
        ]);
        assert_eq!(horizontal_move(&g, 1, 1, Facing::Right, false), MoveOutcome::Climb { x: 2, y: 0 });
        assert_eq!(horizontal_move(&g, 3, 1, Facing::Left, false), MoveOutcome::Climb { x: 2, y: 0 });
    }

    #[test]
    fn climb_itembox_too() {
        let g = Grid::from_diagram(&[
            "   ",
            " I ",
        ]);
        assert_eq!(horizontal_move(&g, 0, 1, Facing::Right, false), MoveOutcome::Climb { x: 1, y: 0 });
    }

    #[test]
    fn climb_blocked_by_stack_or_top_row() {
        let g = Grid::from_diagram(&[
            " B ",
            " B ",
        ]);
        assert_eq!(horizontal_move(&g, 0, 1, Facing::Right, false), MoveOutcome::Blocked);
        assert_eq!(horizontal_move(&g, 0, 0, Facing::Right, false), MoveOutcome::Blocked);
    }

    #[test]
    fn item_is_collected() {
        let g = Grid::from_diagram(&[" $ "]);
        assert_eq!(horizontal_move(&g, 0, 0, Facing::Right, false), MoveOutcome::Collect { x: 1, y: 0 });
    }

    #[test]
    fn door_blocks_unless_door_entry() {
        let g = Grid::from_diagram(&[
            "   ",
            " BD",
            "  B",
        ]);
        assert_eq!(horizontal_move(&g, 1, 1, Facing::Right, false), MoveOutcome::Blocked);
        assert_eq!(horizontal_move(&g, 1, 1, Facing::Right, true), MoveOutcome::Walk { x: 2, y: 1 });
        // Climbing onto a door needs door entry too
        assert_eq!(horizontal_move(&g, 1, 2, Facing::Right, false), MoveOutcome::Blocked);
        assert_eq!(horizontal_move(&g, 1, 2, Facing::Right, true), MoveOutcome::Climb { x: 2, y: 1 });
    }

    // ── Breaking ──

    #[test]
    fn break_converts_neighbourhood() {
        let g = Grid::from_diagram(&[
            "B I ",
            " $ B",
            "B=I ",
        ]);
        let targets = break_targets(&g, 1, 1);
        assert_eq!(targets, vec![
            (0, 0, Tile::Background),
            (0, 2, Tile::Background),
            (2, 0, Tile::Item),
            (2, 2, Tile::Item),
        ]);
    }

    #[test]
    fn break_clamps_at_corner() {
        let g = Grid::from_diagram(&[
            " B",
            "BB",
        ]);
        assert_eq!(break_targets(&g, 0, 0).len(), 3);
    }

    #[test]
    fn break_nothing_nearby() {
        let g = Grid::from_diagram(&[
            "   B",
            "    ",
            "====",
        ]);
        assert!(break_targets(&g, 1, 1).is_empty());
    }

    // ── Level exit ──

    #[test]
    fn door_row_rises_with_level() {
        assert_eq!(door_row(1, 18), 15);
        assert_eq!(door_row(5, 18), 11);
        assert_eq!(door_row(16, 18), 1);
        assert_eq!(door_row(40, 18), 1);
    }

    #[test]
    fn level_complete_needs_door_and_items() {
        let g = Grid::from_diagram(&[
            " D",
        ]);
        let mut p = Player::new(100, 1, 0);
        p.collect_item();
        assert!(!is_level_complete(&g, &p, 1));
        p.collect_item();
        assert!(is_level_complete(&g, &p, 1));
        assert!(!is_level_complete(&g, &p, 2));

        p.set_position(0, 0);
        assert!(!is_level_complete(&g, &p, 1));
    }
}

/// Room generator.
///
/// Every level is built from the same rule, scaled by the level number:
///
///   1. Border: ceiling on row 0, floor on the last row, walls on the
///      first and last column, open space everywhere else.
///   2. Obstacles: `3 × level` random attempts. Each attempt picks a cell
///      away from the ceiling and the row above the floor; if that cell is
///      open it becomes a BOX (60%) or an ITEMBOX (30%). The remaining 10%
///      of rolls place nothing.
///   3. Platforms: `level` floating FLOOR strips, 5 tiles wide, in the
///      upper half of the room. Only open cells are converted.
///   4. Door: one DOOR on the right wall, `max(1, height - 2 - level)`.
///      Overwrites whatever is there.
///
/// The random source is injected so generation is reproducible under a
/// seeded generator.

use rand::Rng;

use crate::domain::grid::{Grid, LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::domain::rules;
use crate::domain::tile::Tile;

const OBSTACLES_PER_LEVEL: u32 = 3;
const PLATFORM_WIDTH: usize = 5;
const BOX_CHANCE: f64 = 0.6;
const ITEMBOX_CHANCE: f64 = 0.3;

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Generate the room for `level` at the standard size.
pub fn generate_room<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Grid {
    generate_room_sized(LEVEL_WIDTH, LEVEL_HEIGHT, level, rng)
}

/// Generate the room for `level` at an arbitrary size.
/// Steps that do not fit a very small room are skipped.
pub fn generate_room_sized<R: Rng + ?Sized>(width: usize, height: usize, level: u32, rng: &mut R) -> Grid {
    let mut grid = border_room(width, height);
    seed_obstacles(&mut grid, level, rng);
    seed_platforms(&mut grid, level, rng);
    place_door(&mut grid, level);
    grid
}

/// Where the dropper starts: top row, middle column.
pub fn dropper_start(width: usize) -> (usize, usize) {
    (width / 2, 0)
}

/// Where the player starts a new game: middle column, just above the floor.
pub fn player_start(width: usize, height: usize) -> (usize, usize) {
    (width / 2, height.saturating_sub(2))
}

/// Where the player enters every later level: beside the left wall,
/// just above the floor.
pub fn level_entry(height: usize) -> (usize, usize) {
    (1, height.saturating_sub(2))
}

// ══════════════════════════════════════════════════════════════
// Steps
// ══════════════════════════════════════════════════════════════

fn border_room(width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width, height, Tile::Background);
    for y in 0..height {
        for x in 0..width {
            let tile = if y == 0 {
                Tile::Ceiling
            } else if y + 1 == height {
                Tile::Floor
            } else if x == 0 || x + 1 == width {
                Tile::Wall
            } else {
                continue;
            };
            grid.set(x, y, tile);
        }
    }
    grid
}

fn seed_obstacles<R: Rng + ?Sized>(grid: &mut Grid, level: u32, rng: &mut R) {
    let (w, h) = (grid.width(), grid.height());
    // Rows 1 ..= h-3: clear of the ceiling and of the row above the floor
    if w == 0 || h < 4 { return; }

    for _ in 0..OBSTACLES_PER_LEVEL * level {
        let x = rng.random_range(0..w);
        let y = rng.random_range(1..h - 2);
        if !grid.tile_at(x, y).is_open() { continue; }

        if let Some(tile) = roll_obstacle(rng) {
            grid.set(x, y, tile);
        }
    }
}

fn roll_obstacle<R: Rng + ?Sized>(rng: &mut R) -> Option<Tile> {
    obstacle_for(rng.random())
}

/// Obstacle for a uniform roll in `[0, 1)`: BOX below 0.6, ITEMBOX below
/// 0.9, nothing above.
fn obstacle_for(roll: f64) -> Option<Tile> {
    if roll < BOX_CHANCE {
        Some(Tile::Box)
    } else if roll < BOX_CHANCE + ITEMBOX_CHANCE {
        Some(Tile::ItemBox)
    } else {
        None
    }
}

fn seed_platforms<R: Rng + ?Sized>(grid: &mut Grid, level: u32, rng: &mut R) {
    let (w, h) = (grid.width(), grid.height());
    if w <= PLATFORM_WIDTH || h < 4 { return; }

    for _ in 0..level {
        let platform_y = rng.random_range(0..h / 2) + 2;
        let start_x = rng.random_range(0..w - PLATFORM_WIDTH);
        // Would merge with the floor: skip
        if platform_y + 1 >= h { continue; }

        for x in start_x..start_x + PLATFORM_WIDTH {
            if grid.tile_at(x, platform_y).is_open() {
                grid.set(x, platform_y, Tile::Floor);
            }
        }
    }
}

fn place_door(grid: &mut Grid, level: u32) {
    let (w, h) = (grid.width(), grid.height());
    if w == 0 || h < 3 { return; }
    grid.set(w - 1, rules::door_row(level, h), Tile::Door);
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(level: u32, seed: u64) -> Grid {
        generate_room(level, &mut StdRng::seed_from_u64(seed))
    }

    fn assert_border(g: &Grid, level: u32) {
        let (w, h) = (g.width(), g.height());
        let door_y = rules::door_row(level, h);
        for x in 0..w {
            assert_eq!(g.tile_at(x, 0), Tile::Ceiling, "ceiling at x={x}");
            assert_eq!(g.tile_at(x, h - 1), Tile::Floor, "floor at x={x}");
        }
        for y in 1..h - 1 {
            assert_eq!(g.tile_at(0, y), Tile::Wall, "left wall at y={y}");
            if y == door_y {
                assert_eq!(g.tile_at(w - 1, y), Tile::Door);
            } else {
                assert_eq!(g.tile_at(w - 1, y), Tile::Wall, "right wall at y={y}");
            }
        }
    }

    #[test]
    fn level_one_has_standard_size_and_border() {
        let g = room(1, 7);
        assert_eq!((g.width(), g.height()), (LEVEL_WIDTH, LEVEL_HEIGHT));
        assert_border(&g, 1);
        assert_eq!(g.count(Tile::Door), 1);
        assert_eq!(g.tile_at(LEVEL_WIDTH - 1, 15), Tile::Door);
    }

    #[test]
    fn same_seed_same_room() {
        assert_eq!(room(4, 99), room(4, 99));
    }

    #[test]
    fn obstacle_and_platform_budgets() {
        for level in 1..=6 {
            let g = room(level, 1234 + level as u64);
            let obstacles = g.count(Tile::Box) + g.count(Tile::ItemBox);
            assert!(obstacles <= (3 * level) as usize);
            // Floor tiles beyond the bottom row come from platforms only
            let interior_floor = g.count(Tile::Floor) - LEVEL_WIDTH;
            assert!(interior_floor <= 5 * level as usize);
            assert_eq!(g.count(Tile::Item), 0);
        }
    }

    #[test]
    fn obstacle_roll_bands() {
        assert_eq!(obstacle_for(0.0), Some(Tile::Box));
        assert_eq!(obstacle_for(0.59), Some(Tile::Box));
        assert_eq!(obstacle_for(0.6), Some(Tile::ItemBox));
        assert_eq!(obstacle_for(0.89), Some(Tile::ItemBox));
        assert_eq!(obstacle_for(0.9), None);
        assert_eq!(obstacle_for(0.999), None);
    }

    #[test]
    fn obstacle_mix_over_many_rolls() {
        let mut rng = StdRng::seed_from_u64(17);
        let (mut boxes, mut item_boxes, mut none) = (0, 0, 0);
        for _ in 0..10_000 {
            match roll_obstacle(&mut rng) {
                Some(Tile::Box) => boxes += 1,
                Some(Tile::ItemBox) => item_boxes += 1,
                None => none += 1,
                Some(other) => panic!("unexpected obstacle {other:?}"),
            }
        }
        assert!((5_700..6_300).contains(&boxes), "boxes = {boxes}");
        assert!((2_700..3_300).contains(&item_boxes), "item boxes = {item_boxes}");
        assert!((800..1_200).contains(&none), "empty rolls = {none}");
    }

    #[test]
    fn spawn_cells_are_always_open() {
        for seed in 0..50 {
            let g = room(3, seed);
            let (px, py) = player_start(LEVEL_WIDTH, LEVEL_HEIGHT);
            let (ex, ey) = level_entry(LEVEL_HEIGHT);
            assert_eq!(g.tile_at(px, py), Tile::Background);
            assert_eq!(g.tile_at(ex, ey), Tile::Background);
        }
    }

    #[test]
    fn high_level_door_stops_below_ceiling() {
        let g = room(30, 5);
        assert_eq!(g.tile_at(LEVEL_WIDTH - 1, 1), Tile::Door);
        assert_border(&g, 30);
    }

    #[test]
    fn tiny_rooms_keep_the_border() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = generate_room_sized(3, 3, 2, &mut rng);
        assert_eq!(g.to_string(), "^^^\n| D\n===\n");
    }

    #[test]
    fn start_positions() {
        assert_eq!(dropper_start(LEVEL_WIDTH), (17, 0));
        assert_eq!(player_start(LEVEL_WIDTH, LEVEL_HEIGHT), (17, 16));
        assert_eq!(level_entry(LEVEL_HEIGHT), (1, 16));
    }

    proptest! {
        #[test]
        fn border_holds_for_any_seed_and_level(seed in any::<u64>(), level in 1u32..20) {
            let g = room(level, seed);
            assert_border(&g, level);
            prop_assert_eq!(g.count(Tile::Door), 1);
        }
    }
}

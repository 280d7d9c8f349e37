/// The step function: advances the world by one turn, plus the player
/// actions that run between turns.
///
/// Turn processing order:
///   1. Turn counter
///   2. Gravity (player first, then tiles; a tile landing on the player ends the session)
///   3. Energy regeneration (+1 up to max)
///   4. Dropper chase (even turns)
///   5. Dropper spawn (every 7th turn)
///   6. Level completion check
///
/// The level transition itself and the display push belong to the engine,
/// which owns the sink.

use log::{debug, info};
use rand::Rng;

use crate::domain::ai;
use crate::domain::entity::{Dropper, Facing};
use crate::domain::physics;
use crate::domain::rules::{self, MoveOutcome};
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::level;
use super::world::{Phase, WorldState};

const DROPPER_MOVE_EVERY: u64 = 2;
const DROPPER_SPAWN_EVERY: u64 = 7;
const SPAWN_BOX_CHANCE: f64 = 0.8;

/// Result of the turn-local part of a step (before any level transition).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepResult {
    Continue,
    LevelComplete,
    Crushed { x: usize, y: usize },
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) -> StepResult {
    match world.phase {
        Phase::NotStarted => return StepResult::Continue,
        Phase::Crushed => return StepResult::Crushed { x: world.player.x, y: world.player.y },
        Phase::Running => {}
    }

    world.turn_number += 1;

    if let Some((x, y)) = resolve_gravity(world) {
        return StepResult::Crushed { x, y };
    }
    resolve_energy(world);
    if world.turn_number % DROPPER_MOVE_EVERY == 0 {
        resolve_dropper_move(world);
    }
    if world.turn_number % DROPPER_SPAWN_EVERY == 0 {
        resolve_dropper_spawn(world, rng);
    }

    if rules::is_level_complete(&world.grid, &world.player, world.level_number) {
        StepResult::LevelComplete
    } else {
        StepResult::Continue
    }
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Player settles first, then one tile pass. Returns the crush cell, if any.
fn resolve_gravity(world: &mut WorldState) -> Option<(usize, usize)> {
    let rows = physics::settle_player(&world.grid, &mut world.player);
    if rows > 0 {
        world.events.push(GameEvent::PlayerFell { rows });
    }

    let occupied = (world.player.x, world.player.y);
    let fall = physics::drop_tiles(&mut world.grid, occupied);
    let (x, y) = fall.crush?;

    world.phase = Phase::Crushed;
    world.events.push(GameEvent::PlayerCrushed { x, y });
    info!(
        "player crushed at ({x}, {y}) on level {} turn {}",
        world.level_number, world.turn_number,
    );
    Some((x, y))
}

// ══════════════════════════════════════════════════════════════
// Energy
// ══════════════════════════════════════════════════════════════

fn resolve_energy(world: &mut WorldState) {
    if !world.player.has_full_energy() {
        world.player.change_energy(1);
    }
}

// ══════════════════════════════════════════════════════════════
// Dropper
// ══════════════════════════════════════════════════════════════

fn resolve_dropper_move(world: &mut WorldState) {
    let d = world.dropper;
    let nx = ai::next_column(d.x, world.player.x, world.grid.width());
    if nx != d.x {
        world.dropper.set_position(nx, d.y);
        world.events.push(GameEvent::DropperMoved { x: nx });
    }
}

fn resolve_dropper_spawn<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) {
    let (x, y) = (world.dropper.x, world.dropper.y + 1);
    if y >= world.grid.height() { return; }

    let tile = spawn_tile(rng.random());
    world.grid.set(x, y, tile);
    world.events.push(GameEvent::TileSpawned { x, y, tile });
    debug!("dropper spawned {tile:?} at ({x}, {y})");
}

/// Spawned tile for a uniform roll in `[0, 1)`: BOX below 0.8, else ITEMBOX.
fn spawn_tile(roll: f64) -> Tile {
    if roll < SPAWN_BOX_CHANCE { Tile::Box } else { Tile::ItemBox }
}

// ══════════════════════════════════════════════════════════════
// Level transition
// ══════════════════════════════════════════════════════════════

/// Move the session on to the next level. The player keeps its energy;
/// only the per-level item count is reset.
pub fn advance_level<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) {
    let cleared = world.level_number;
    world.level_number += 1;
    world.player.reset_items();

    let (w, h) = (world.grid.width(), world.grid.height());
    world.grid = level::generate_room_sized(w, h, world.level_number, rng);

    let (dx, dy) = level::dropper_start(w);
    world.dropper = Dropper::new(dx, dy);
    let (px, py) = level::level_entry(h);
    world.player.set_position(px, py);

    world.events.push(GameEvent::LevelCleared { level: cleared });
    info!("level {cleared} cleared, entering level {}", world.level_number);
}

// ══════════════════════════════════════════════════════════════
// Player actions
// ══════════════════════════════════════════════════════════════

/// Move the player one column left or right. Returns true if it moved.
pub fn move_player(world: &mut WorldState, dir: Facing) -> bool {
    if !world.is_running() { return false; }
    world.player.facing = dir;

    let p = &world.player;
    match rules::horizontal_move(&world.grid, p.x, p.y, dir, world.door_entry) {
        MoveOutcome::Walk { x, y } => {
            world.player.set_position(x, y);
        }
        MoveOutcome::Climb { x, y } => {
            world.player.set_position(x, y);
            world.events.push(GameEvent::Climbed { x, y });
        }
        MoveOutcome::Collect { x, y } => {
            world.grid.set(x, y, Tile::Background);
            world.player.collect_item();
            world.player.set_position(x, y);
            world.events.push(GameEvent::ItemCollected { x, y });
            debug!(
                "item collected at ({x}, {y}), {}/{}",
                world.player.items_collected(),
                rules::items_required(world.level_number),
            );
        }
        MoveOutcome::Blocked => return false,
    }
    true
}

/// Break every box around the player. Needs a full energy bar and drains
/// it completely if anything broke. Returns the number of cells changed.
pub fn break_boxes(world: &mut WorldState) -> usize {
    if !world.is_running() { return 0; }
    if !world.player.has_full_energy() { return 0; }

    let targets = rules::break_targets(&world.grid, world.player.x, world.player.y);
    if targets.is_empty() { return 0; }

    for &(x, y, tile) in &targets {
        world.grid.set(x, y, tile);
    }
    let max = world.player.max_energy() as i64;
    world.player.change_energy(-max);

    let count = targets.len();
    world.events.push(GameEvent::BoxesBroken { count });
    debug!("broke {count} boxes around ({}, {})", world.player.x, world.player.y);
    count
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Player;
    use crate::domain::grid::Grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Running world on a hand-drawn grid. Player and dropper positions
    /// are given explicitly.
    fn world_from(rows: &[&str], player: (usize, usize), dropper: (usize, usize)) -> WorldState {
        let mut w = WorldState::new(100);
        w.grid = Grid::from_diagram(rows);
        w.player = Player::new(100, player.0, player.1);
        w.dropper = Dropper::new(dropper.0, dropper.1);
        w.phase = Phase::Running;
        w
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn nothing_happens_before_start() {
        let mut w = WorldState::new(100);
        assert_eq!(step(&mut w, &mut rng()), StepResult::Continue);
        assert_eq!(w.turn_number, 1);
    }

    #[test]
    fn turn_counter_advances() {
        let mut w = world_from(&["^^^", "| |", "==="], (1, 1), (1, 0));
        step(&mut w, &mut rng());
        step(&mut w, &mut rng());
        assert_eq!(w.turn_number, 3);
    }

    #[test]
    fn player_falls_before_tiles() {
        // Player floating at (1,1), box at (1,0) above them. The player
        // drops to the floor first, so the box falls into empty space.
        let mut w = world_from(&[
            "|B|",
            "| |",
            "| |",
            "| |",
            "===",
        ], (1, 1), (0, 0));
        w.turn_number = 2; // next turn is odd: no dropper activity
        assert_eq!(step(&mut w, &mut rng()), StepResult::Continue);
        assert_eq!((w.player.x, w.player.y), (1, 3));
        assert_eq!(w.grid.tile_at(1, 1), Tile::Box);
        assert!(w.events.contains(&GameEvent::PlayerFell { rows: 2 }));
    }

    #[test]
    fn box_above_player_crushes() {
        let mut w = world_from(&[
            "|B|",
            "| |",
            "===",
        ], (1, 1), (0, 0));
        assert_eq!(step(&mut w, &mut rng()), StepResult::Crushed { x: 1, y: 1 });
        assert_eq!(w.phase, Phase::Crushed);
        assert_eq!(w.grid.tile_at(1, 1), Tile::Box);
        // Terminal: further steps report the same crush and change nothing
        let turn = w.turn_number;
        assert_eq!(step(&mut w, &mut rng()), StepResult::Crushed { x: 1, y: 1 });
        assert_eq!(w.turn_number, turn);
    }

    #[test]
    fn energy_regenerates_one_per_turn() {
        let mut w = world_from(&["| |", "==="], (1, 0), (1, 0));
        w.player.change_energy(-10);
        step(&mut w, &mut rng());
        assert_eq!(w.player.energy(), 91);
        w.player.refill_energy();
        step(&mut w, &mut rng());
        assert_eq!(w.player.energy(), 100);
    }

    #[test]
    fn dropper_chases_on_even_turns_only() {
        let mut w = world_from(&[
            "^^^^^^^",
            "|     |",
            "=======",
        ], (5, 1), (1, 0));
        // turn 1 → 2: moves
        step(&mut w, &mut rng());
        assert_eq!(w.dropper.x, 2);
        // turn 2 → 3: stays
        step(&mut w, &mut rng());
        assert_eq!(w.dropper.x, 2);
        // turn 3 → 4: moves
        step(&mut w, &mut rng());
        assert_eq!(w.dropper.x, 3);
    }

    #[test]
    fn dropper_holds_when_aligned() {
        let mut w = world_from(&["^^^", "| |", "==="], (1, 1), (1, 0));
        step(&mut w, &mut rng());
        assert_eq!(w.dropper.x, 1);
        assert!(!w.events.iter().any(|e| matches!(e, GameEvent::DropperMoved { .. })));
    }

    #[test]
    fn dropper_spawns_every_seventh_turn() {
        let mut w = world_from(&[
            "^^^^^^^",
            "|     |",
            "|     |",
            "|     |",
            "=======",
        ], (1, 3), (5, 0));
        w.turn_number = 6;
        step(&mut w, &mut rng()); // turn 7
        let spawned = w.grid.tile_at(5, 1);
        assert!(spawned == Tile::Box || spawned == Tile::ItemBox);
        assert!(w.events.iter().any(|e| matches!(e, GameEvent::TileSpawned { x: 5, y: 1, .. })));
    }

    #[test]
    fn spawn_roll_bands() {
        assert_eq!(spawn_tile(0.0), Tile::Box);
        assert_eq!(spawn_tile(0.79), Tile::Box);
        assert_eq!(spawn_tile(0.8), Tile::ItemBox);
        assert_eq!(spawn_tile(0.999), Tile::ItemBox);
    }

    #[test]
    fn spawn_mix_over_many_turns() {
        let mut rng = rng();
        let mut boxes = 0;
        for _ in 0..10_000 {
            let mut w = world_from(&["^^^", "| |", "| |", "==="], (1, 2), (1, 0));
            w.turn_number = 6;
            step(&mut w, &mut rng);
            if w.grid.tile_at(1, 1) == Tile::Box {
                boxes += 1;
            } else {
                assert_eq!(w.grid.tile_at(1, 1), Tile::ItemBox);
            }
        }
        assert!((7_700..8_300).contains(&boxes), "boxes = {boxes}");
    }

    #[test]
    fn spawn_overwrites_what_is_below_the_dropper() {
        for below in ["$", "="] {
            let row = format!("|  {below}  |");
            let mut w = world_from(&[
                "^^^^^^^",
                row.as_str(),
                "|     |",
                "=======",
            ], (1, 2), (3, 0));
            w.turn_number = 6;
            step(&mut w, &mut rng());
            assert!(
                w.grid.tile_at(3, 1).is_falling_kind(),
                "{below:?} should be replaced, found {:?}", w.grid.tile_at(3, 1),
            );
        }
    }

    #[test]
    fn spawn_is_skipped_at_bottom_edge() {
        let mut w = world_from(&["   ", "   "], (0, 1), (2, 1));
        w.turn_number = 6;
        step(&mut w, &mut rng());
        assert!(!w.events.iter().any(|e| matches!(e, GameEvent::TileSpawned { .. })));
    }

    #[test]
    fn standing_on_door_with_items_completes() {
        let mut w = world_from(&[
            "^^^",
            "| D",
            "|BB",
            "===",
        ], (2, 1), (0, 0));
        w.player.collect_item();
        assert_eq!(step(&mut w, &mut rng()), StepResult::Continue);
        w.player.collect_item();
        assert_eq!(step(&mut w, &mut rng()), StepResult::LevelComplete);
    }

    #[test]
    fn advance_level_resets_room_and_items_but_not_energy() {
        let mut w = world_from(&["^^^^^^^^", "|      |", "|      |", "|      |", "========"], (3, 3), (6, 0));
        w.player.collect_item();
        w.player.change_energy(-40);
        advance_level(&mut w, &mut rng());

        assert_eq!(w.level_number, 2);
        assert_eq!(w.player.items_collected(), 0);
        assert_eq!(w.player.energy(), 60);
        assert_eq!((w.player.x, w.player.y), (1, 3));
        assert_eq!((w.dropper.x, w.dropper.y), (4, 0));
        assert_eq!((w.grid.width(), w.grid.height()), (8, 5));
        assert_eq!(w.grid.tile_at(7, 1), Tile::Door);
        assert!(w.events.contains(&GameEvent::LevelCleared { level: 1 }));
    }

    // ── Actions ──

    #[test]
    fn walking_and_climbing() {
        let mut w = world_from(&[
            "|    |",
            "|  B |",
            "======",
        ], (1, 1), (0, 0));
        assert!(move_player(&mut w, Facing::Right));
        assert_eq!((w.player.x, w.player.y), (2, 1));
        assert!(move_player(&mut w, Facing::Right));
        assert_eq!((w.player.x, w.player.y), (3, 0));
        assert_eq!(w.player.facing, Facing::Right);
        assert!(w.events.contains(&GameEvent::Climbed { x: 3, y: 0 }));
    }

    #[test]
    fn collecting_an_item() {
        let mut w = world_from(&["|$ |", "===="], (2, 0), (0, 0));
        assert!(move_player(&mut w, Facing::Left));
        assert_eq!((w.player.x, w.player.y), (1, 0));
        assert_eq!(w.player.items_collected(), 1);
        assert_eq!(w.grid.tile_at(1, 0), Tile::Background);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let mut w = world_from(&["| |", "==="], (1, 0), (0, 0));
        assert!(!move_player(&mut w, Facing::Left));
        assert_eq!((w.player.x, w.player.y), (1, 0));
        assert_eq!(w.player.facing, Facing::Left);
    }

    #[test]
    fn actions_are_ignored_after_crush() {
        let mut w = world_from(&["|  |", "|B |", "===="], (2, 0), (0, 0));
        w.phase = Phase::Crushed;
        assert!(!move_player(&mut w, Facing::Right));
        assert_eq!(break_boxes(&mut w), 0);
        assert_eq!(w.grid.tile_at(1, 1), Tile::Box);
    }

    #[test]
    fn break_needs_full_energy_and_drains_it() {
        let mut w = world_from(&[
            "|   |",
            "|BIB|",
            "=====",
        ], (2, 0), (0, 0));
        w.player.change_energy(-1);
        assert_eq!(break_boxes(&mut w), 0);
        assert_eq!(w.player.energy(), 99);
        assert_eq!(w.grid.tile_at(1, 1), Tile::Box);

        w.player.refill_energy();
        assert_eq!(break_boxes(&mut w), 3);
        assert_eq!(w.player.energy(), 0);
        assert_eq!(w.grid.tile_at(1, 1), Tile::Background);
        assert_eq!(w.grid.tile_at(2, 1), Tile::Item);
        assert_eq!(w.grid.tile_at(3, 1), Tile::Background);
    }

    #[test]
    fn break_with_nothing_nearby_keeps_energy() {
        let mut w = world_from(&["|   |", "|   |", "====="], (2, 1), (0, 0));
        assert_eq!(break_boxes(&mut w), 0);
        assert!(w.player.has_full_energy());
    }
}

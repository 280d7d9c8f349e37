/// WorldState: the complete state of one game session.
///
/// Owned by the engine and passed explicitly to every step function, so
/// several sessions can run side by side and tests can build any state
/// they need.
///
/// ## Lifecycle
///
///   NotStarted ──start_game──▶ Running ──crush──▶ Crushed
///                                 │  ▲
///                                 └──┘ level transition
///
/// `Crushed` is terminal. A new session starts from a fresh `WorldState`.

use crate::domain::entity::{Dropper, Player};
use crate::domain::grid::{Grid, LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::domain::tile::Tile;
use super::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    NotStarted,
    Running,
    Crushed,
}

#[derive(Clone, Debug)]
pub struct WorldState {
    // ── Room ──
    pub grid: Grid,

    // ── Entities ──
    pub player: Player,
    pub dropper: Dropper,

    // ── Session tracking ──
    pub level_number: u32,
    pub turn_number: u64,
    pub phase: Phase,

    // ── Rules ──
    pub door_entry: bool,

    /// Events since the host last drained them. Nothing clears this list
    /// except `Engine::take_events`, so a host that never drains it keeps
    /// every event of the session.
    pub events: Vec<GameEvent>,
}

impl WorldState {
    /// Empty, not-yet-started session. The grid is a blank standard-size
    /// room until `start_game` generates level 1.
    pub fn new(max_energy: u32) -> Self {
        WorldState {
            grid: Grid::new(LEVEL_WIDTH, LEVEL_HEIGHT, Tile::Background),
            player: Player::new(max_energy, 0, 0),
            dropper: Dropper::new(0, 0),
            level_number: 1,
            turn_number: 1,
            phase: Phase::NotStarted,
            door_entry: false,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

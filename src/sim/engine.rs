/// Turn engine: one game session.
///
/// Owns the world state, the random source and the display sink. The host
/// drives it with player actions followed by one `do_turn` per key press;
/// the engine never paces itself.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RulesConfig;
use crate::domain::entity::{Dropper, Facing, Player};
use crate::domain::grid::{LEVEL_HEIGHT, LEVEL_WIDTH};
use crate::domain::rules;
use super::display::DisplaySink;
use super::event::GameEvent;
use super::level;
use super::step::{self, StepResult};
use super::world::{Phase, WorldState};

/// What a turn did, as seen by the host.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnOutcome {
    Continue,
    /// The player finished `level`; the next level is already set up.
    LevelCleared { level: u32 },
    /// A falling tile landed on the player at (x, y). Terminal.
    Crushed { x: usize, y: usize },
}

pub struct Engine<S: DisplaySink, R: Rng = StdRng> {
    world: WorldState,
    rng: R,
    sink: S,
    max_energy: u32,
    door_entry: bool,
}

impl<S: DisplaySink> Engine<S, StdRng> {
    /// Engine seeded from `rules.seed`, or from OS entropy when unset.
    pub fn from_rules(sink: S, rules: &RulesConfig) -> Self {
        let rng = match rules.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Engine::new(sink, rng, rules)
    }
}

impl<S: DisplaySink, R: Rng> Engine<S, R> {
    pub fn new(sink: S, rng: R, rules: &RulesConfig) -> Self {
        let mut world = WorldState::new(rules.max_energy);
        world.door_entry = rules.door_entry;
        Engine {
            world,
            rng,
            sink,
            max_energy: rules.max_energy,
            door_entry: rules.door_entry,
        }
    }

    // ── Session lifecycle ──

    /// Begin a session on level 1. Calling it again starts over.
    pub fn start_game(&mut self) {
        let mut world = WorldState::new(self.max_energy);
        world.door_entry = self.door_entry;
        world.grid = level::generate_room(1, &mut self.rng);

        let (dx, dy) = level::dropper_start(LEVEL_WIDTH);
        world.dropper = Dropper::new(dx, dy);
        let (px, py) = level::player_start(LEVEL_WIDTH, LEVEL_HEIGHT);
        world.player = Player::new(self.max_energy, px, py);
        world.phase = Phase::Running;

        self.world = world;
        info!("new game, max energy {}", self.max_energy);
        self.push_display();
    }

    /// Advance one turn. Once the player has been crushed every further
    /// call reports the same crush and changes nothing.
    pub fn do_turn(&mut self) -> TurnOutcome {
        let outcome = match step::step(&mut self.world, &mut self.rng) {
            StepResult::Continue => TurnOutcome::Continue,
            StepResult::Crushed { x, y } => TurnOutcome::Crushed { x, y },
            StepResult::LevelComplete => {
                let level = self.world.level_number;
                self.next_level();
                TurnOutcome::LevelCleared { level }
            }
        };
        self.push_display();
        outcome
    }

    /// Set up the next level. The player keeps its energy.
    pub fn next_level(&mut self) {
        if !self.world.is_running() {
            debug!("next_level ignored in phase {:?}", self.world.phase);
            return;
        }
        step::advance_level(&mut self.world, &mut self.rng);
        self.push_display();
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn level_complete(&self) -> bool {
        rules::is_level_complete(&self.world.grid, &self.world.player, self.world.level_number)
    }

    // ── Player actions ──

    pub fn move_left(&mut self) -> bool {
        step::move_player(&mut self.world, Facing::Left)
    }

    pub fn move_right(&mut self) -> bool {
        step::move_player(&mut self.world, Facing::Right)
    }

    /// Break boxes around the player. No-op unless energy is full.
    pub fn break_boxes(&mut self) -> usize {
        step::break_boxes(&mut self.world)
    }

    // ── Access ──

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Direct access for tests that need to stage a position.
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn is_over(&self) -> bool {
        self.world.phase == Phase::Crushed
    }

    /// Drain the events produced since the last call. Hosts call this after
    /// every turn; undrained events pile up across turns.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.events)
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn push_display(&mut self) {
        let w = &self.world;
        self.sink.update_display(&w.grid, &w.player, &w.dropper);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

/// Events emitted during player actions and turns.
/// The presentation layer consumes these for sound and messages.

use crate::domain::tile::Tile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ItemCollected { x: usize, y: usize },
    Climbed { x: usize, y: usize },
    BoxesBroken { count: usize },
    PlayerFell { rows: usize },
    DropperMoved { x: usize },
    TileSpawned { x: usize, y: usize, tile: Tile },
    LevelCleared { level: u32 },
    PlayerCrushed { x: usize, y: usize },
}

/// Display sink: the read-only consumer of engine state.
///
/// The engine pushes `(grid, player, dropper)` after `start_game`, after
/// every turn and after a level transition. Sinks get shared references
/// only; they may draw straight away or keep a copy for later.

use crate::domain::entity::{Dropper, Player};
use crate::domain::grid::Grid;

pub trait DisplaySink {
    fn update_display(&mut self, grid: &Grid, player: &Player, dropper: &Dropper);
}

/// Discards every update. For headless sessions.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn update_display(&mut self, _grid: &Grid, _player: &Player, _dropper: &Dropper) {}
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn update_display(&mut self, grid: &Grid, player: &Player, dropper: &Dropper) {
        (**self).update_display(grid, player, dropper);
    }
}

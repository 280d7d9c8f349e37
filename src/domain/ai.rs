/// Dropper AI: one-axis chase.
///
/// The dropper only ever compares columns: it steps one column toward the
/// player, or stays put when already above them. No pathfinding; the
/// dropper rides the ceiling row and nothing blocks it.

/// Column step (−1, 0 or +1) that brings `dropper_x` toward `player_x`.
pub fn chase_step(dropper_x: usize, player_x: usize) -> i32 {
    if dropper_x < player_x {
        1
    } else if dropper_x > player_x {
        -1
    } else {
        0
    }
}

/// Apply a chase step, keeping the result inside `0..width`.
pub fn next_column(dropper_x: usize, player_x: usize, width: usize) -> usize {
    let nx = dropper_x as i64 + chase_step(dropper_x, player_x) as i64;
    nx.clamp(0, width.saturating_sub(1) as i64) as usize
}

/// Entities: Player and Dropper.
/// Both are plain positional records; all behaviour lives in the engine.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Column one step from `x` in this direction, if it exists in `0..width`.
    pub fn step_from(self, x: usize, width: usize) -> Option<usize> {
        match self {
            Facing::Left => x.checked_sub(1),
            Facing::Right => if x + 1 < width { Some(x + 1) } else { None },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
    max_energy: u32,
    energy: u32,
    items_collected: u32,
}

impl Player {
    /// New player with a full energy bar.
    pub fn new(max_energy: u32, x: usize, y: usize) -> Self {
        Player {
            x, y,
            facing: Facing::Right,
            max_energy,
            energy: max_energy,
            items_collected: 0,
        }
    }

    pub fn set_position(&mut self, x: usize, y: usize) {
        self.x = x;
        self.y = y;
    }

    pub fn energy(&self) -> u32 { self.energy }

    pub fn max_energy(&self) -> u32 { self.max_energy }

    pub fn has_full_energy(&self) -> bool {
        self.energy == self.max_energy
    }

    /// Add (or with a negative amount, remove) energy, clamped to `[0, max_energy]`.
    pub fn change_energy(&mut self, amount: i64) {
        let next = (self.energy as i64 + amount).clamp(0, self.max_energy as i64);
        self.energy = next as u32;
    }

    #[cfg(test)]
    pub fn refill_energy(&mut self) {
        self.energy = self.max_energy;
    }

    pub fn items_collected(&self) -> u32 { self.items_collected }

    pub fn collect_item(&mut self) {
        self.items_collected += 1;
    }

    /// Only called on level transition.
    pub fn reset_items(&mut self) {
        self.items_collected = 0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dropper {
    pub x: usize,
    pub y: usize,
}

impl Dropper {
    pub fn new(x: usize, y: usize) -> Self {
        Dropper { x, y }
    }

    pub fn set_position(&mut self, x: usize, y: usize) {
        self.x = x;
        self.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_is_clamped() {
        let mut p = Player::new(10, 0, 0);
        assert!(p.has_full_energy());
        p.change_energy(5);
        assert_eq!(p.energy(), 10);
        p.change_energy(-25);
        assert_eq!(p.energy(), 0);
        p.change_energy(3);
        assert_eq!(p.energy(), 3);
        p.refill_energy();
        assert_eq!(p.energy(), 10);
    }

    #[test]
    fn items_count_up_and_reset() {
        let mut p = Player::new(10, 0, 0);
        p.collect_item();
        p.collect_item();
        assert_eq!(p.items_collected(), 2);
        p.reset_items();
        assert_eq!(p.items_collected(), 0);
    }

    #[test]
    fn step_from_respects_edges() {
        assert_eq!(Facing::Left.step_from(0, 5), None);
        assert_eq!(Facing::Left.step_from(3, 5), Some(2));
        assert_eq!(Facing::Right.step_from(4, 5), None);
        assert_eq!(Facing::Right.step_from(3, 5), Some(4));
    }
}

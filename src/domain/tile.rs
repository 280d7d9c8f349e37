/// Tile categories and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// A tile is a plain `Copy` value. Changing a cell means storing a new
/// value into the grid; nothing ever holds a reference to a cell.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Tile {
    Ceiling,
    Floor,
    Wall,
    #[default]
    Background,
    Box,        // Falls, breakable
    ItemBox,    // Falls, breaks into an Item
    Item,       // Pickup target
    Door,       // Level exit
}

impl Tile {
    /// Open space: entities may move into it and tiles may fall through it.
    pub fn is_open(self) -> bool {
        matches!(self, Tile::Background)
    }

    /// Is this tile subject to gravity?
    pub fn is_falling_kind(self) -> bool {
        matches!(self, Tile::Box | Tile::ItemBox)
    }

    /// Can the player climb onto this tile by walking into it?
    pub fn is_climbable(self) -> bool {
        self.is_falling_kind()
    }

    /// Is this a pickup?
    pub fn is_item(self) -> bool {
        matches!(self, Tile::Item)
    }

    pub fn is_door(self) -> bool {
        matches!(self, Tile::Door)
    }

    /// What this tile turns into when broken, if it can be broken at all.
    pub fn broken(self) -> Option<Tile> {
        match self {
            Tile::Box => Some(Tile::Background),
            Tile::ItemBox => Some(Tile::Item),
            _ => None,
        }
    }

    /// Single-character glyph, used by test diagrams and debug dumps.
    pub fn glyph(self) -> char {
        match self {
            Tile::Ceiling => '^',
            Tile::Floor => '=',
            Tile::Wall => '|',
            Tile::Background => ' ',
            Tile::Box => 'B',
            Tile::ItemBox => 'I',
            Tile::Item => '$',
            Tile::Door => 'D',
        }
    }

    /// Inverse of `glyph`. Unknown characters read as open space.
    #[cfg(test)]
    pub fn from_glyph(ch: char) -> Tile {
        match ch {
            '^' => Tile::Ceiling,
            '=' => Tile::Floor,
            '|' => Tile::Wall,
            'B' => Tile::Box,
            'I' => Tile::ItemBox,
            '$' => Tile::Item,
            'D' => Tile::Door,
            _ => Tile::Background,
        }
    }
}

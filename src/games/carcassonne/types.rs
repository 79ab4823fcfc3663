//! Carcassonne core types: terrain, sides, board coordinates, tokens and players.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Grass,
    City,
    Road,
}

impl Area {
    /// Single-character form used by the text renderer.
    pub fn short(self) -> char {
        match self {
            Area::Grass => '~',
            Area::City => 'c',
            Area::Road => 'r',
        }
    }
}

/// Edge directions of a tile, plus `Center` for cloister tokens.
///
/// Edge sides are indexed Left=0, Down=1, Right=2, Up=3. The board's y axis
/// grows downward, so `Up` steps to `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Down,
    Right,
    Up,
    Center,
}

/// The four edge sides in index order.
pub const EDGE_SIDES: [Side; 4] = [Side::Left, Side::Down, Side::Right, Side::Up];

impl Side {
    /// Edge side for an index in `0..4`. Panics on anything else.
    #[inline]
    pub fn from_index(idx: usize) -> Self {
        EDGE_SIDES[idx]
    }

    /// Index of an edge side. `Center` has no edge index.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            Side::Left => Some(0),
            Side::Down => Some(1),
            Side::Right => Some(2),
            Side::Up => Some(3),
            Side::Center => None,
        }
    }

    /// Unit offset towards the neighbour across this edge.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Side::Left => (-1, 0),
            Side::Down => (0, 1),
            Side::Right => (1, 0),
            Side::Up => (0, -1),
            Side::Center => (0, 0),
        }
    }

    /// `(side + 2) mod 4`; `Center` is its own opposite.
    pub fn opposite(self) -> Self {
        match self.index() {
            Some(i) => Side::from_index((i + 2) % 4),
            None => Side::Center,
        }
    }

    /// Side after one quarter turn of the tile; `Center` is invariant.
    pub fn rotated(self) -> Self {
        match self.index() {
            Some(i) => Side::from_index((i + 1) % 4),
            None => Side::Center,
        }
    }
}

// --- Position ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbor(self, side: Side) -> Self {
        let (dx, dy) = side.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four axis neighbours, in edge side order.
    pub fn edge_neighbors(self) -> [Self; 4] {
        EDGE_SIDES.map(|side| self.neighbor(side))
    }

    /// All 8 surrounding positions (for cloister completion).
    pub fn all_surrounding(self) -> [Self; 8] {
        let mut result = [self; 8];
        let mut i = 0;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                result[i] = Self::new(self.x + dx, self.y + dy);
                i += 1;
            }
        }
        result
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A token placed on a tile: owner plus the side (or `Center`) it claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meeple {
    pub player: usize,
    pub side: Side,
}

impl Meeple {
    pub fn new(player: usize, side: Side) -> Self {
        Self { player, side }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub index: usize,
    pub score: i64,
    /// Tokens currently in the player's pool (not on the board).
    pub meeples: u32,
}

impl Player {
    pub fn new(index: usize, meeples: u32) -> Self {
        Self {
            index,
            score: 0,
            meeples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_neighbor() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.neighbor(Side::Left), Position::new(-1, 0));
        assert_eq!(pos.neighbor(Side::Down), Position::new(0, 1));
        assert_eq!(pos.neighbor(Side::Right), Position::new(1, 0));
        assert_eq!(pos.neighbor(Side::Up), Position::new(0, -1));
    }

    #[test]
    fn test_opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Down.opposite(), Side::Up);
        assert_eq!(Side::Up.opposite(), Side::Down);
        assert_eq!(Side::Center.opposite(), Side::Center);
    }

    #[test]
    fn test_rotated_side() {
        assert_eq!(Side::Left.rotated(), Side::Down);
        assert_eq!(Side::Up.rotated(), Side::Left);
        assert_eq!(Side::Center.rotated(), Side::Center);
    }

    #[test]
    fn test_neighbor_and_opposite_step_back() {
        let pos = Position::new(3, -2);
        for side in EDGE_SIDES {
            assert_eq!(pos.neighbor(side).neighbor(side.opposite()), pos);
        }
    }

    #[test]
    fn test_all_surrounding() {
        let surrounding = Position::new(0, 0).all_surrounding();
        assert_eq!(surrounding.len(), 8);
        assert!(!surrounding.contains(&Position::ORIGIN));
        assert!(surrounding.contains(&Position::new(-1, 1)));
        assert!(surrounding.contains(&Position::new(1, -1)));
    }
}

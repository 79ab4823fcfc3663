//! Board logic: sparse tile map, placement validation, frontier maintenance.

use std::collections::{HashMap, HashSet};

use super::tiles::Tile;
use super::types::*;

/// Placed tiles keyed by position, plus the frontier of open positions
/// (empty cells adjacent to at least one placed tile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub tiles: HashMap<Position, Tile>,
    pub open_positions: HashSet<Position>,
}

impl Board {
    /// Board holding only `start` at the origin.
    pub fn new(start: Tile) -> Self {
        let mut board = Self {
            tiles: HashMap::new(),
            open_positions: HashSet::new(),
        };
        board.place(Position::ORIGIN, start);
        board
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.tiles.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if a tile can be placed at the given position.
    ///
    /// Rules:
    /// 1. Position must be empty
    /// 2. Every edge touching a placed neighbour must carry the same terrain
    ///
    /// Positions without neighbours are not rejected here; the move generator
    /// only offers frontier positions.
    pub fn can_place_tile(&self, tile: &Tile, pos: Position) -> bool {
        if self.contains(pos) {
            return false;
        }
        EDGE_SIDES.iter().all(|&side| match self.get(pos.neighbor(side)) {
            Some(neighbor) => tile.fits_against(side, neighbor),
            None => true,
        })
    }

    /// Put a tile on the board and update the frontier: `pos` leaves it and
    /// every empty axis neighbour joins it.
    pub fn place(&mut self, pos: Position, tile: Tile) {
        self.tiles.insert(pos, tile);
        self.open_positions.remove(&pos);
        for neighbor in pos.edge_neighbors() {
            if !self.contains(neighbor) {
                self.open_positions.insert(neighbor);
            }
        }
    }

    /// Take a tile back off the board. `pos` re-enters the frontier and any
    /// neighbour no longer adjacent to a placed tile leaves it.
    pub fn remove(&mut self, pos: Position) -> Option<Tile> {
        let tile = self.tiles.remove(&pos)?;
        self.open_positions.insert(pos);
        for neighbor in pos.edge_neighbors() {
            if !self.contains(neighbor) && !self.has_neighbor(neighbor) {
                self.open_positions.remove(&neighbor);
            }
        }
        Some(tile)
    }

    /// Whether any axis neighbour of `pos` holds a tile.
    pub fn has_neighbor(&self, pos: Position) -> bool {
        pos.edge_neighbors().iter().any(|&n| self.contains(n))
    }

    /// Replace the token on an already placed tile. Returns the previous one.
    pub fn set_meeple(&mut self, pos: Position, meeple: Option<Meeple>) -> Option<Meeple> {
        let tile = self.tiles.get_mut(&pos)?;
        std::mem::replace(&mut tile.meeple, meeple)
    }

    /// Number of occupied cells among the 8 surrounding `pos`.
    pub fn count_surrounding(&self, pos: Position) -> usize {
        pos.all_surrounding()
            .iter()
            .filter(|&&p| self.contains(p))
            .count()
    }

    /// Positions of every tile carrying a token.
    pub fn meeple_positions(&self) -> HashSet<Position> {
        self.tiles
            .iter()
            .filter(|(_, t)| t.meeple.is_some())
            .map(|(&p, _)| p)
            .collect()
    }

    /// Tokens on the board owned by `player`.
    pub fn meeples_of(&self, player: usize) -> u32 {
        self.tiles
            .values()
            .filter(|t| t.meeple.map_or(false, |m| m.player == player))
            .count() as u32
    }

    /// Inclusive (min, max) corners of the occupied area.
    pub fn bounds(&self) -> (Position, Position) {
        let mut min = Position::ORIGIN;
        let mut max = Position::ORIGIN;
        for p in self.tiles.keys() {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Open positions in a stable order.
    pub fn sorted_open_positions(&self) -> Vec<Position> {
        let mut result: Vec<Position> = self.open_positions.iter().copied().collect();
        result.sort();
        result
    }
}

/// Recalculate all open positions from scratch (empty positions adjacent to
/// placed tiles).
pub fn recalculate_open_positions(board_tiles: &HashMap<Position, Tile>) -> HashSet<Position> {
    let mut open_set = HashSet::new();
    for pos in board_tiles.keys() {
        for neighbor in pos.edge_neighbors() {
            if !board_tiles.contains_key(&neighbor) {
                open_set.insert(neighbor);
            }
        }
    }
    open_set
}

/// Check if a tile can be placed anywhere on the frontier in any rotation.
pub fn tile_has_valid_placement(board: &Board, tile: &Tile) -> bool {
    board.open_positions.iter().any(|&pos| {
        (0..4).any(|rotation| board.can_place_tile(&tile.rotated_by(rotation), pos))
    })
}

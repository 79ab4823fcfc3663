//! Legal move enumeration: tile rotation × frontier position × optional token.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::tiles::{tile_index_to_type, Tile};
use super::types::*;

/// A tile (already rotated, token already set if any) and where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub tile: Tile,
    pub pos: Position,
}

impl Move {
    pub fn new(tile: Tile, pos: Position) -> Self {
        Self { tile, pos }
    }

    pub fn meeple(&self) -> Option<Meeple> {
        self.tile.meeple
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", tile_index_to_type(self.tile.id), self.pos)?;
        if let Some(m) = self.tile.meeple {
            write!(f, " meeple p{} {:?}", m.player, m.side)?;
        }
        Ok(())
    }
}

/// One representative per tile id, first occurrence wins.
pub fn distinct_tiles(tiles: &[Tile]) -> Vec<Tile> {
    let mut seen: HashSet<u8> = HashSet::new();
    tiles
        .iter()
        .filter(|t| seen.insert(t.id))
        .map(|t| Tile { meeple: None, ..*t })
        .collect()
}

/// Every legal move for `player` with any of `tiles`.
///
/// For each frontier position, each distinct tile id and each of the four
/// rotations that fit, emits the bare placement and, while the player still
/// has tokens, one variant per non-grass edge plus a `Center` variant for
/// cloisters. An empty result means the tile cannot be placed at all.
pub fn generate_moves(board: &Board, tiles: &[Tile], player: &Player) -> Vec<Move> {
    let candidates = distinct_tiles(tiles);
    let mut moves = Vec::new();

    for pos in board.sorted_open_positions() {
        for base in &candidates {
            let mut tile = *base;
            for rotation in 0..4 {
                if rotation > 0 {
                    tile = tile.rotate();
                }
                if !board.can_place_tile(&tile, pos) {
                    continue;
                }
                push_variants(&mut moves, tile, pos, player);
            }
        }
    }

    moves
}

fn push_variants(moves: &mut Vec<Move>, tile: Tile, pos: Position, player: &Player) {
    moves.push(Move::new(tile, pos));

    if player.meeples == 0 {
        return;
    }

    for side in EDGE_SIDES {
        if tile.edge(side) != Area::Grass {
            moves.push(Move::new(tile.with_meeple(Meeple::new(player.index, side)), pos));
        }
    }
    if tile.cloister {
        moves.push(Move::new(
            tile.with_meeple(Meeple::new(player.index, Side::Center)),
            pos,
        ));
    }
}

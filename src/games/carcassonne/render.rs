//! Plain-text board rendering, 5×3 characters per cell.
//!
//! A token is drawn as its owner's index in place of the edge (or cloister)
//! character it claims.

use std::fmt;

use super::board::Board;
use super::tiles::Tile;
use super::types::*;

const FILLER: char = '~';
const EMPTY_CELL: &str = "     ";

fn edge_char(tile: &Tile, side: Side) -> char {
    match tile.meeple {
        Some(m) if m.side == side => player_char(m.player),
        _ => tile.edge(side).short(),
    }
}

fn player_char(player: usize) -> char {
    char::from_digit((player % 10) as u32, 10).unwrap_or('?')
}

fn center_char(tile: &Tile) -> char {
    match tile.meeple {
        Some(m) if m.side == Side::Center => player_char(m.player),
        _ if tile.cloister => 'H',
        _ if tile.has_no_connections() => FILLER,
        _ => '+',
    }
}

fn inner_char(tile: &Tile, side: Side) -> char {
    if tile.has_connection_at_side(side) {
        tile.edge(side).short()
    } else {
        FILLER
    }
}

/// One text row (0..3) of a tile cell.
fn tile_row(tile: &Tile, row: usize) -> String {
    match row {
        0 => {
            let corner = if tile.emblem { '#' } else { FILLER };
            [corner, FILLER, edge_char(tile, Side::Up), FILLER, FILLER]
                .iter()
                .collect()
        }
        1 => [
            edge_char(tile, Side::Left),
            inner_char(tile, Side::Left),
            center_char(tile),
            inner_char(tile, Side::Right),
            edge_char(tile, Side::Right),
        ]
        .iter()
        .collect(),
        _ => [FILLER, FILLER, edge_char(tile, Side::Down), FILLER, FILLER]
            .iter()
            .collect(),
    }
}

/// Render the occupied area of the board, top row first.
pub fn render_board(board: &Board) -> String {
    let (min, max) = board.bounds();
    let mut out = String::new();
    for y in min.y..=max.y {
        for row in 0..3 {
            for x in min.x..=max.x {
                match board.get(Position::new(x, y)) {
                    Some(tile) => out.push_str(&tile_row(tile, row)),
                    None => out.push_str(EMPTY_CELL),
                }
            }
            out.push('\n');
        }
    }
    out
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board(self))
    }
}

//! Game state with a reverse-move log: moves are applied in place and undone
//! in LIFO order, so search can backtrack without copying the state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{recalculate_open_positions, Board};
use super::meeples::{restore_meeple, MeepleSite};
use super::moves::{generate_moves, Move};
use super::scoring::{immediate_scores, update_final_points, PointAward};
use super::tiles::{starting_tile, Tile};
use super::types::*;

/// Tokens each player starts with unless configured otherwise.
pub const DEFAULT_MEEPLES: u32 = 7;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No moves to undo")]
    EmptyLog,

    #[error("A game needs at least one player")]
    NoPlayers,

    #[error("Player {0} does not exist")]
    PlayerOutOfRange(usize),
}

/// Everything one `apply_move` changed, sufficient to invert it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseMove {
    /// Position of the placed tile, removed again on undo.
    pub placed: Position,
    /// Token that came with the placed tile; goes back to its owner's pool.
    pub placed_meeple: Option<MeepleSite>,
    /// Tokens reclaimed from closed structures; put back on the board.
    pub returned_meeples: Vec<MeepleSite>,
    /// Points awarded by closures; subtracted again.
    pub awarded_points: Vec<PointAward>,
    /// Index in the remaining tiles the placed tile was taken from.
    pub drawn_tile: Option<(usize, Tile)>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    /// Tiles not yet placed, in draw order.
    pub tiles: Vec<Tile>,
    pub players: Vec<Player>,
    initial_meeples: u32,
    history: Vec<ReverseMove>,
}

impl GameState {
    /// A game with `start` at the origin and `tiles` (already shuffled) to draw from.
    pub fn new(
        player_count: usize,
        meeples_per_player: u32,
        start: Tile,
        tiles: Vec<Tile>,
    ) -> Result<Self, GameError> {
        if player_count == 0 {
            return Err(GameError::NoPlayers);
        }
        Ok(Self {
            board: Board::new(start),
            tiles,
            players: (0..player_count)
                .map(|i| Player::new(i, meeples_per_player))
                .collect(),
            initial_meeples: meeples_per_player,
            history: Vec::new(),
        })
    }

    /// Base-game start tile and the default token pool.
    pub fn new_game(player_count: usize, tiles: Vec<Tile>) -> Result<Self, GameError> {
        Self::new(player_count, DEFAULT_MEEPLES, starting_tile(), tiles)
    }

    pub fn player(&self, index: usize) -> Result<&Player, GameError> {
        self.players
            .get(index)
            .ok_or(GameError::PlayerOutOfRange(index))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn initial_meeples(&self) -> u32 {
        self.initial_meeples
    }

    pub fn frontier(&self) -> &HashSet<Position> {
        &self.board.open_positions
    }

    pub fn remaining_tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn history(&self) -> &[ReverseMove] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn scores(&self) -> Vec<i64> {
        self.players.iter().map(|p| p.score).collect()
    }

    /// Legal moves for `player` with a single drawn tile.
    pub fn generate_moves(&self, tile: &Tile, player: usize) -> Result<Vec<Move>, GameError> {
        let player = self.player(player)?;
        Ok(generate_moves(&self.board, std::slice::from_ref(tile), player))
    }

    /// Legal moves for `player` over every distinct remaining tile.
    pub fn generate_all_moves(&self, player: usize) -> Result<Vec<Move>, GameError> {
        let player = self.player(player)?;
        Ok(generate_moves(&self.board, &self.tiles, player))
    }

    /// Place the move's tile, take its token from the owner's pool, settle
    /// every structure it closes and log the whole change.
    ///
    /// The move must come from `generate_moves` on the current state; it is
    /// not validated again here.
    pub fn apply_move(&mut self, mv: Move) {
        debug_assert!(self.board.can_place_tile(&mv.tile, mv.pos), "illegal move {mv}");

        let drawn_tile = self
            .tiles
            .iter()
            .position(|t| t.id == mv.tile.id)
            .map(|idx| (idx, self.tiles.remove(idx)));

        self.board.place(mv.pos, mv.tile);

        let placed_meeple = mv.tile.meeple.map(|meeple| {
            if let Some(player) = self.players.get_mut(meeple.player) {
                player.meeples = player.meeples.saturating_sub(1);
            }
            MeepleSite {
                player: meeple.player,
                pos: mv.pos,
                side: meeple.side,
            }
        });

        let changes = update_final_points(&mut self.board, &mut self.players, mv.pos);

        tracing::trace!(
            %mv,
            awards = changes.awards.len(),
            returned = changes.returned.len(),
            "move applied"
        );

        self.history.push(ReverseMove {
            placed: mv.pos,
            placed_meeple,
            returned_meeples: changes.returned,
            awarded_points: changes.awards,
            drawn_tile,
        });
    }

    /// Invert the most recent `apply_move` exactly.
    pub fn undo_last_move(&mut self) -> Result<ReverseMove, GameError> {
        let reverse = self.history.pop().ok_or(GameError::EmptyLog)?;

        for site in reverse.returned_meeples.iter().rev() {
            restore_meeple(&mut self.board, &mut self.players, site);
        }

        for award in &reverse.awarded_points {
            if let Some(player) = self.players.get_mut(award.player) {
                player.score -= award.points;
            }
        }

        if let Some(site) = reverse.placed_meeple {
            if let Some(player) = self.players.get_mut(site.player) {
                player.meeples += 1;
            }
        }

        self.board.remove(reverse.placed);
        debug_assert_eq!(
            self.board.open_positions,
            recalculate_open_positions(&self.board.tiles)
        );

        if let Some((idx, tile)) = reverse.drawn_tile {
            let idx = idx.min(self.tiles.len());
            self.tiles.insert(idx, tile);
        }

        tracing::trace!(pos = %reverse.placed, "move undone");
        Ok(reverse)
    }

    /// Undo every logged move. Returns how many were undone.
    pub fn undo_all(&mut self) -> usize {
        let mut count = 0;
        while self.undo_last_move().is_ok() {
            count += 1;
        }
        count
    }

    /// What each player's still-open structures would pay right now.
    pub fn immediate_scores(&self) -> Vec<i64> {
        immediate_scores(&self.board, self.players.len())
    }

    /// Official score plus the open-structure estimate, per player.
    pub fn final_scores(&self) -> Vec<i64> {
        self.players
            .iter()
            .zip(self.immediate_scores())
            .map(|(p, pending)| p.score + pending)
            .collect()
    }

    /// Pool count plus tokens on the board equals the starting pool for
    /// every player.
    pub fn meeples_conserved(&self) -> bool {
        self.players
            .iter()
            .all(|p| p.meeples + self.board.meeples_of(p.index) == self.initial_meeples)
    }
}

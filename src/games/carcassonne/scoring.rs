//! Structure scoring: recursive road/city traversal, closure detection,
//! closure-triggered scoring on placement and end-of-game estimates.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::meeples::{best_players, return_meeples, MeepleSite};
use super::types::*;

/// Points paid for a completed cloister (the tile plus its 8 neighbours).
pub const CLOISTER_POINTS: i64 = 9;

/// Points handed to one player by one scoring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAward {
    pub player: usize,
    pub points: i64,
}

/// Result of walking one structure (or one branch of it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// One per tile, plus one per emblem on a city tile.
    pub points: i64,
    /// No branch ran into a missing tile.
    pub closed: bool,
    /// Tiles whose token sits on this structure. Only acted on when `closed`.
    pub token_sites: Vec<Position>,
}

impl Traversal {
    fn boundary() -> Self {
        Self {
            points: 0,
            closed: true,
            token_sites: Vec::new(),
        }
    }

    fn open_end() -> Self {
        Self {
            points: 0,
            closed: false,
            token_sites: Vec::new(),
        }
    }
}

/// Everything `update_final_points` changed, for the reverse log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreChanges {
    pub awards: Vec<PointAward>,
    pub returned: Vec<MeepleSite>,
}

/// Walk the structure that leaves `pos` through `side`.
///
/// Entering a tile marks the whole facet (`side` and the sides connected to
/// it) as visited, so a walk that loops back into it stops there as a closed
/// boundary. Tokens found on the structure are counted into `tally` by owner.
pub fn traverse(
    board: &Board,
    pos: Position,
    side: Side,
    visited: &mut HashSet<(Position, Side)>,
    tally: &mut [u32],
) -> Traversal {
    if visited.contains(&(pos, side)) {
        return Traversal::boundary();
    }

    let Some(&tile) = board.get(pos) else {
        return Traversal::open_end();
    };

    let area = tile.edge(side);
    if area == Area::Grass {
        return Traversal::open_end();
    }

    visited.insert((pos, side));
    for other in tile.connections.partners(side) {
        visited.insert((pos, other));
    }

    let mut result = traverse(board, pos.neighbor(side), side.opposite(), visited, tally);

    result.points += 1;
    if tile.emblem && area == Area::City {
        result.points += 1;
    }

    if let Some(meeple) = tile.meeple_on_facet(side) {
        if let Some(count) = tally.get_mut(meeple.player) {
            *count += 1;
        }
        result.token_sites.push(pos);
    }

    for other in tile.connections.partners(side) {
        let branch = traverse(board, pos.neighbor(other), other.opposite(), visited, tally);
        result.points += branch.points;
        result.token_sites.extend(branch.token_sites);
        result.closed = result.closed && branch.closed;
    }

    result
}

fn award(players: &mut [Player], player: usize, points: i64, changes: &mut ScoreChanges) {
    let Some(p) = players.get_mut(player) else {
        return;
    };
    p.score += points;
    tracing::trace!(player, points, score = p.score, "points awarded");
    changes.awards.push(PointAward { player, points });
}

/// Score every structure closed by the tile just placed at `pos`, plus any
/// cloister around it that became surrounded. Paid tokens go back to their
/// owners' pools.
pub fn update_final_points(board: &mut Board, players: &mut [Player], pos: Position) -> ScoreChanges {
    let mut changes = ScoreChanges::default();
    let Some(&tile) = board.get(pos) else {
        return changes;
    };

    // Sides already covered by an earlier walk from this tile.
    let mut explored: HashSet<(Position, Side)> = HashSet::new();

    for side in EDGE_SIDES {
        let area = tile.edge(side);
        if area == Area::Grass || explored.contains(&(pos, side)) {
            continue;
        }

        let mut visited = HashSet::new();
        let mut tally = vec![0u32; players.len()];
        let scan = traverse(board, pos, side, &mut visited, &mut tally);
        explored.extend(visited);

        if !scan.closed {
            continue;
        }

        // Closed cities count twice
        let points = if area == Area::City {
            scan.points * 2
        } else {
            scan.points
        };

        for player in best_players(&tally) {
            award(players, player, points, &mut changes);
        }

        let returned = return_meeples(board, players, &scan.token_sites);
        changes.returned.extend(returned);
    }

    // Did we close all tiles around a cloister?
    let mut candidates = vec![pos];
    candidates.extend(pos.all_surrounding());

    for check_pos in candidates {
        let Some(check_tile) = board.get(check_pos) else {
            continue;
        };
        let Some(meeple) = check_tile.meeple else {
            continue;
        };
        if !check_tile.cloister || meeple.side != Side::Center {
            continue;
        }
        if board.count_surrounding(check_pos) == 8 {
            award(players, meeple.player, CLOISTER_POINTS, &mut changes);
            let returned = return_meeples(board, players, &[check_pos]);
            changes.returned.extend(returned);
        }
    }

    changes
}

/// Add the points every still-open structure would pay right now to
/// `player_scores`. Closed structures are left to `update_final_points`.
/// Only the score accumulators are touched.
pub fn update_immediate_points(board: &Board, player_scores: &mut [i64]) {
    let mut remaining: BTreeSet<Position> = board.meeple_positions().into_iter().collect();

    while let Some(pos) = remaining.pop_first() {
        let Some(&tile) = board.get(pos) else {
            continue;
        };
        let Some(meeple) = tile.meeple else {
            continue;
        };

        // Cloisters need no walk: the tile plus every occupied neighbour.
        if tile.cloister && meeple.side == Side::Center {
            if let Some(score) = player_scores.get_mut(meeple.player) {
                *score += 1 + board.count_surrounding(pos) as i64;
            }
            continue;
        }

        let mut visited = HashSet::new();
        let mut tally = vec![0u32; player_scores.len()];
        let scan = traverse(board, pos, meeple.side, &mut visited, &mut tally);

        if !scan.closed {
            for player in best_players(&tally) {
                player_scores[player] += scan.points;
            }
        }

        // Each structure is evaluated once
        for site in &scan.token_sites {
            remaining.remove(site);
        }
    }
}

/// Immediate points per player as a fresh vector.
pub fn immediate_scores(board: &Board, player_count: usize) -> Vec<i64> {
    let mut scores = vec![0; player_count];
    update_immediate_points(board, &mut scores);
    scores
}

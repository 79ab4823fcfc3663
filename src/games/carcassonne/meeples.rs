//! Token ownership rules: majority selection and returning tokens to pools.

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::types::*;

/// A token that sat at `pos`/`side` and belonged to `player`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeepleSite {
    pub player: usize,
    pub pos: Position,
    pub side: Side,
}

/// Players holding the most tokens on a structure. Every player tied at the
/// maximum is included; an empty tally yields nobody.
pub fn best_players(tally: &[u32]) -> Vec<usize> {
    let max_count = tally.iter().copied().max().unwrap_or(0);
    if max_count == 0 {
        return Vec::new();
    }
    tally
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count == max_count)
        .map(|(player, _)| player)
        .collect()
}

/// Clear the tokens at `positions` and put them back into their owners'
/// pools. Returns what was removed so the move can be undone.
pub fn return_meeples(
    board: &mut Board,
    players: &mut [Player],
    positions: &[Position],
) -> Vec<MeepleSite> {
    let mut returned = Vec::with_capacity(positions.len());
    for &pos in positions {
        let Some(meeple) = board.set_meeple(pos, None) else {
            continue;
        };
        if let Some(player) = players.get_mut(meeple.player) {
            player.meeples += 1;
        }
        tracing::trace!(player = meeple.player, %pos, side = ?meeple.side, "meeple returned");
        returned.push(MeepleSite {
            player: meeple.player,
            pos,
            side: meeple.side,
        });
    }
    returned
}

/// Put a previously returned token back on the board, taking it from the
/// owner's pool again.
pub fn restore_meeple(board: &mut Board, players: &mut [Player], site: &MeepleSite) {
    board.set_meeple(site.pos, Some(Meeple::new(site.player, site.side)));
    if let Some(player) = players.get_mut(site.player) {
        player.meeples = player.meeples.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::carcassonne::tiles::starting_tile;

    #[test]
    fn test_best_players_single_winner() {
        assert_eq!(best_players(&[0, 2, 1]), vec![1]);
    }

    #[test]
    fn test_best_players_tie_pays_everyone() {
        assert_eq!(best_players(&[2, 0, 2]), vec![0, 2]);
    }

    #[test]
    fn test_best_players_nobody() {
        assert!(best_players(&[0, 0, 0]).is_empty());
        assert!(best_players(&[]).is_empty());
    }

    #[test]
    fn test_return_and_restore_meeple() {
        let mut board = Board::new(starting_tile().with_meeple(Meeple::new(1, Side::Up)));
        let mut players = vec![Player::new(0, 6), Player::new(1, 6)];

        let returned = return_meeples(&mut board, &mut players, &[Position::ORIGIN]);
        assert_eq!(returned.len(), 1);
        assert_eq!(players[1].meeples, 7);
        assert!(board.get(Position::ORIGIN).and_then(|t| t.meeple).is_none());

        // a second return of the same site is a no-op
        assert!(return_meeples(&mut board, &mut players, &[Position::ORIGIN]).is_empty());

        restore_meeple(&mut board, &mut players, &returned[0]);
        assert_eq!(players[1].meeples, 6);
        assert_eq!(
            board.get(Position::ORIGIN).and_then(|t| t.meeple),
            Some(Meeple::new(1, Side::Up))
        );
    }
}

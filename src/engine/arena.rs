//! Batch runner: many seeded random playouts, aggregated per seat.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::engine::config::SimulationConfig;
use crate::engine::simulator::{play_random_game, PlayoutSummary};
use crate::games::carcassonne::game::GameError;

/// Aggregated results from an arena run.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaResult {
    pub num_games: usize,
    /// Games each seat won outright or shared.
    pub wins: Vec<usize>,
    /// Games with more than one seat tied at the top.
    pub draws: usize,
    /// Final score per seat, one entry per game.
    pub total_scores: Vec<Vec<i64>>,
    pub skipped_turns: usize,
    pub round_trip_failures: usize,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    fn new(num_games: usize, num_players: usize) -> Self {
        Self {
            num_games,
            wins: vec![0; num_players],
            draws: 0,
            total_scores: vec![Vec::with_capacity(num_games); num_players],
            skipped_turns: 0,
            round_trip_failures: 0,
            game_durations_ms: Vec::with_capacity(num_games),
        }
    }

    fn record(&mut self, summary: &PlayoutSummary, elapsed_ms: f64) {
        self.game_durations_ms.push(elapsed_ms);
        self.skipped_turns += summary.skipped_turns;
        if summary.round_trip_ok == Some(false) {
            self.round_trip_failures += 1;
        }

        for (seat, &score) in summary.scores.iter().enumerate() {
            if let Some(scores) = self.total_scores.get_mut(seat) {
                scores.push(score);
            }
        }

        let winners = summary.winners();
        if winners.len() > 1 {
            self.draws += 1;
        }
        for seat in winners {
            if let Some(w) = self.wins.get_mut(seat) {
                *w += 1;
            }
        }
    }

    pub fn win_rate(&self, seat: usize) -> f64 {
        self.wins.get(seat).copied().unwrap_or(0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, seat: usize) -> f64 {
        match self.total_scores.get(seat) {
            Some(s) if !s.is_empty() => s.iter().sum::<i64>() as f64 / s.len() as f64,
            _ => 0.0,
        }
    }

    pub fn score_stddev(&self, seat: usize) -> f64 {
        let scores = match self.total_scores.get(seat) {
            Some(s) if s.len() >= 2 => s,
            _ => return 0.0,
        };
        let avg = self.avg_score(seat);
        let variance = scores
            .iter()
            .map(|&s| (s as f64 - avg).powi(2))
            .sum::<f64>()
            / (scores.len() - 1) as f64;
        variance.sqrt()
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for seat in 0..self.wins.len() {
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  avg={:5.1} +/- {:4.1}",
                format!("player {seat}"),
                self.wins[seat],
                self.win_rate(seat) * 100.0,
                self.avg_score(seat),
                self.score_stddev(seat),
            ));
        }
        lines.push(format!("  {:>12}: {}", "Draws", self.draws));
        lines.push(format!("  {:>12}: {}", "Skipped", self.skipped_turns));
        if self.round_trip_failures > 0 {
            lines.push(format!("  {:>12}: {}", "Undo errors", self.round_trip_failures));
        }
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!("  Avg game: {:.1}ms  |  Total: {:.1}s", avg_ms, total_ms / 1000.0));
        }
        lines.join("\n")
    }
}

/// Play `config.games` playouts in parallel, game `i` seeded with
/// `config.seed + i`, and aggregate them in seed order.
pub fn run_arena(config: &SimulationConfig) -> Result<ArenaResult, GameError> {
    tracing::info!(
        games = config.games,
        players = config.players,
        seed = config.seed,
        "starting arena run"
    );

    let outcomes: Vec<(PlayoutSummary, f64)> = (0..config.games)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed.wrapping_add(i as u64);
            let t0 = Instant::now();
            let summary = play_random_game(config, seed)?;
            Ok((summary, t0.elapsed().as_secs_f64() * 1000.0))
        })
        .collect::<Result<_, GameError>>()?;

    let mut result = ArenaResult::new(config.games, config.players);
    for (summary, elapsed_ms) in &outcomes {
        result.record(summary, *elapsed_ms);
    }

    tracing::info!(
        draws = result.draws,
        skipped = result.skipped_turns,
        round_trip_failures = result.round_trip_failures,
        "arena run finished"
    );
    Ok(result)
}

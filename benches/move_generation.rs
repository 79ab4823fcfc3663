//! Criterion benchmarks for the search hot paths: move generation,
//! apply/undo through the reverse log, and open-structure scoring.
//!
//! Run with:
//!     cargo bench --bench move_generation

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use meeple_rules_engine::games::carcassonne::game::GameState;
use meeple_rules_engine::games::carcassonne::tiles::{shuffled_deck, Tile};

struct Fixture {
    label: String,
    game: GameState,
    next_tile: Tile,
}

/// Mid-game states after a fixed number of random placements.
fn build_fixtures() -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    for (seed, tiles_placed) in [(1u64, 10usize), (2, 35), (3, 60)] {
        let mut game = GameState::new_game(3, shuffled_deck(seed, 1)).expect("valid game");
        let mut rng = StdRng::seed_from_u64(seed);
        let draws = game.remaining_tiles().to_vec();
        let mut placed = 0;
        for (turn, tile) in draws.iter().enumerate() {
            if placed == tiles_placed {
                break;
            }
            let moves = game.generate_moves(tile, turn % 3).expect("seat exists");
            if let Some(&mv) = moves.choose(&mut rng) {
                game.apply_move(mv);
                placed += 1;
            }
        }
        let Some(&next_tile) = game.remaining_tiles().first() else {
            continue;
        };
        fixtures.push(Fixture {
            label: format!("s{}_t{}", seed, placed),
            game,
            next_tile,
        });
    }
    fixtures
}

fn bench_generate_moves(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("generate_moves");

    for fixture in &fixtures {
        group.bench_with_input(
            BenchmarkId::new("single_tile", &fixture.label),
            fixture,
            |b, f| b.iter(|| f.game.generate_moves(&f.next_tile, 0)),
        );
        group.bench_with_input(
            BenchmarkId::new("all_remaining", &fixture.label),
            fixture,
            |b, f| b.iter(|| f.game.generate_all_moves(0)),
        );
    }

    group.finish();
}

fn bench_apply_undo(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("apply_undo");

    for fixture in &fixtures {
        let moves = fixture
            .game
            .generate_moves(&fixture.next_tile, 0)
            .expect("seat exists");
        if moves.is_empty() {
            continue;
        }

        // every legal move applied and reverted in turn
        group.bench_with_input(
            BenchmarkId::new("all_moves", &fixture.label),
            fixture,
            |b, f| {
                let mut game = f.game.clone();
                b.iter(|| {
                    for &mv in &moves {
                        game.apply_move(mv);
                        let _ = game.undo_last_move();
                    }
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("clone_instead", &fixture.label),
            fixture,
            |b, f| {
                b.iter(|| {
                    for &mv in &moves {
                        let mut game = f.game.clone();
                        game.apply_move(mv);
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_immediate_scores(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("immediate_scores");

    for fixture in &fixtures {
        group.bench_with_input(
            BenchmarkId::new("open_structures", &fixture.label),
            &fixture.game,
            |b, game| b.iter(|| game.immediate_scores()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_moves,
    bench_apply_undo,
    bench_immediate_scores,
);
criterion_main!(benches);

use std::collections::VecDeque;

use crate::engine::GameEngine;
use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{CellKind, Direction};

pub const DEFAULT_JITTER: f64 = 0.05;

/// Scripted player for headless runs.
#[derive(Clone, Debug)]
pub struct Autopilot {
    rng: Rng,
    jitter: f64,
}

impl Autopilot {
    pub fn new(seed: u32) -> Self {
        Self::with_jitter(seed, DEFAULT_JITTER)
    }

    pub fn with_jitter(seed: u32, jitter: f64) -> Self {
        Self {
            rng: Rng::new(seed),
            jitter: jitter.clamp(0.0, 1.0),
        }
    }

    pub fn next_direction(&mut self, engine: &GameEngine) -> Option<Direction> {
        let grid = engine.grid();
        let player = engine.player_index();
        if self.rng.chance(self.jitter) {
            let open: Vec<Direction> = Direction::CARDINALS
                .iter()
                .copied()
                .filter(|dir| {
                    grid.neighbor(player, *dir)
                        .is_some_and(|next| grid.is_open(next))
                })
                .collect();
            if !open.is_empty() {
                return Some(open[self.rng.pick_index(open.len())]);
            }
        }

        let adversaries: Vec<usize> = engine.adversaries().iter().map(|a| a.index).collect();
        plan_route(grid, player, &adversaries, engine.is_boost_active())
    }
}

/// First step of the shortest path to the nearest item. Unboosted routes skip cells
/// next to an adversary; boosted routes also treat adversaries as targets.
pub fn plan_route(
    grid: &Grid,
    player: usize,
    adversaries: &[usize],
    boosted: bool,
) -> Option<Direction> {
    let threatened =
        |cell: usize| adversaries.iter().any(|held| grid.manhattan(cell, *held) <= 1);
    let is_target = |cell: usize| {
        matches!(
            grid.classify(cell),
            CellKind::Consumable | CellKind::PowerItem
        ) || (boosted && adversaries.contains(&cell))
    };

    let mut first_step: Vec<Option<Direction>> = vec![None; grid.len()];
    let mut visited = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    if player < grid.len() {
        visited[player] = true;
        queue.push_back(player);
    }

    while let Some(cell) = queue.pop_front() {
        for dir in Direction::CARDINALS {
            let Some(next) = grid.neighbor(cell, dir) else {
                continue;
            };
            if visited[next] || !grid.is_open(next) {
                continue;
            }
            if !boosted && threatened(next) {
                continue;
            }
            visited[next] = true;
            let step = if cell == player { Some(dir) } else { first_step[cell] };
            first_step[next] = step;
            if is_target(next) {
                return step;
            }
            queue.push_back(next);
        }
    }

    flee(grid, player, adversaries)
}

/// Open neighbor that keeps the most distance from the closest adversary.
fn flee(grid: &Grid, player: usize, adversaries: &[usize]) -> Option<Direction> {
    let mut best: Option<(Direction, u32)> = None;
    for dir in Direction::CARDINALS {
        let Some(next) = grid.neighbor(player, dir) else {
            continue;
        };
        if !grid.is_open(next) {
            continue;
        }
        let clearance = adversaries
            .iter()
            .map(|held| grid.manhattan(next, *held))
            .min()
            .unwrap_or(u32::MAX);
        if best.map_or(true, |(_, current)| clearance > current) {
            best = Some((dir, clearance));
        }
    }
    best.map(|(dir, _)| dir)
}

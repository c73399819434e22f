use crate::constants::{boost_fear, chase_level_bonus, FEARLESS_LEVEL};
use crate::grid::Grid;
use crate::rng::Rng;
use crate::roster::Adversary;
use crate::types::{CellKind, Direction};

/// Read-only view of the board used by every adversary heuristic.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    pub grid: &'a Grid,
    /// Cells currently held by adversaries, in roster order.
    pub occupied: &'a [usize],
    pub player: usize,
    pub level: u32,
    pub boost_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub target: usize,
    pub chasing: bool,
}

impl BoardView<'_> {
    /// Open cell not held by an adversary other than the one standing on `from`.
    pub fn is_passable(&self, index: usize, from: usize) -> bool {
        self.grid.is_open(index)
            && !self
                .occupied
                .iter()
                .any(|held| *held == index && *held != from)
    }

    fn legal_steps(&self, from: usize) -> Vec<(Direction, usize)> {
        Direction::CARDINALS
            .iter()
            .filter_map(|dir| self.grid.neighbor(from, *dir).map(|next| (*dir, next)))
            .filter(|(_, next)| self.is_passable(*next, from))
            .collect()
    }

    pub fn legal_moves(&self, from: usize) -> Vec<usize> {
        self.legal_steps(from)
            .into_iter()
            .map(|(_, next)| next)
            .collect()
    }

    pub fn count_moves(&self, at: usize) -> usize {
        self.legal_steps(at).len()
    }

    pub fn is_dead_end(&self, at: usize) -> bool {
        self.count_moves(at) <= 1
    }

    /// Exactly two exits that turn a corner.
    pub fn is_choke_point(&self, at: usize) -> bool {
        let steps = self.legal_steps(at);
        steps.len() == 2 && steps[0].0.is_horizontal() != steps[1].0.is_horizontal()
    }

    pub fn distance_to_player(&self, at: usize) -> u32 {
        self.grid.manhattan(at, self.player)
    }
}

pub fn chase_probability(
    aggression: f64,
    distance: u32,
    level: u32,
    boost_active: bool,
    width: usize,
) -> f64 {
    let reach = width as f64 * 1.5;
    let base = aggression * (1.0 - distance as f64 / reach) + 0.1;
    let mut probability = base + chase_level_bonus(level);
    if boost_active {
        if level >= FEARLESS_LEVEL {
            probability = probability.max(0.9999);
        } else {
            probability -= boost_fear(level);
        }
    }
    probability.clamp(0.0001, 1.0)
}

pub fn decide(view: &BoardView<'_>, adversary: &Adversary, rng: &mut Rng) -> Decision {
    let from = adversary.index;
    let probability = chase_probability(
        adversary.aggression,
        view.distance_to_player(from),
        view.level,
        view.boost_active,
        view.grid.width(),
    );
    if rng.chance(probability) {
        Decision {
            target: pursuit_move(view, from, adversary.last_index),
            chasing: true,
        }
    } else {
        Decision {
            target: strategic_move(view, from, adversary.last_index, adversary.aggression, rng),
            chasing: false,
        }
    }
}

fn forward_moves(view: &BoardView<'_>, from: usize, last: Option<usize>) -> Vec<usize> {
    view.legal_moves(from)
        .into_iter()
        .filter(|next| Some(*next) != last)
        .collect()
}

fn reversal(view: &BoardView<'_>, from: usize, last: Option<usize>) -> Option<usize> {
    let previous = last?;
    view.legal_moves(from)
        .into_iter()
        .find(|next| *next == previous)
}

/// Greedy step toward the player. Stays put unless a neighbor strictly closes distance.
pub fn pursuit_move(view: &BoardView<'_>, from: usize, last: Option<usize>) -> usize {
    let mut moves = forward_moves(view, from, last);
    if moves.is_empty() {
        moves.extend(reversal(view, from, last));
    }

    let mut best = from;
    let mut best_distance = view.distance_to_player(from);
    for next in moves {
        let distance = view.distance_to_player(next);
        if distance < best_distance {
            best_distance = distance;
            best = next;
        }
    }
    best
}

pub fn strategic_move(
    view: &BoardView<'_>,
    from: usize,
    last: Option<usize>,
    aggression: f64,
    rng: &mut Rng,
) -> usize {
    let moves = forward_moves(view, from, last);
    if moves.is_empty() {
        return reversal(view, from, last).unwrap_or(from);
    }

    let distance = view.distance_to_player(from);
    let roll = rng.next_f64();

    if view.level >= 8 && roll < 0.4 {
        if let Some(next) = ambush_move(view, &moves) {
            return next;
        }
    }
    if view.level >= 6 && roll < 0.3 {
        if let Some(next) = blocking_move(view, &moves) {
            return next;
        }
    }
    if view.level >= 4 && distance > 5 && roll < 0.4 {
        if let Some(next) = power_item_move(view, from, &moves) {
            return next;
        }
    }
    scored_move(view, &moves, aggression, rng)
}

/// Closes to striking range while taking the cell that leaves the fewest exits.
fn ambush_move(view: &BoardView<'_>, moves: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for next in moves {
        let distance = view.distance_to_player(*next);
        if !(2..=4).contains(&distance) || view.is_dead_end(*next) {
            continue;
        }
        let options = view.count_moves(*next);
        if best.map_or(true, |(_, fewest)| options < fewest) {
            best = Some((*next, options));
        }
    }
    best.map(|(next, _)| next)
}

fn blocking_move(view: &BoardView<'_>, moves: &[usize]) -> Option<usize> {
    let escapes = view.legal_moves(view.player);
    if escapes.len() > 2 {
        return None;
    }
    if let Some(next) = moves.iter().find(|next| escapes.contains(next)) {
        return Some(*next);
    }
    toward(view.grid, moves, view.player)
}

fn power_item_move(view: &BoardView<'_>, from: usize, moves: &[usize]) -> Option<usize> {
    let mut nearest: Option<(usize, u32)> = None;
    for item in view.grid.indices_of(CellKind::PowerItem) {
        let distance = view.grid.manhattan(from, item);
        if nearest.map_or(true, |(_, closest)| distance < closest) {
            nearest = Some((item, distance));
        }
    }
    let (item, _) = nearest?;
    toward(view.grid, moves, item)
}

fn toward(grid: &Grid, moves: &[usize], target: usize) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for next in moves {
        let distance = grid.manhattan(*next, target);
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((*next, distance));
        }
    }
    best.map(|(next, _)| next)
}

/// Random base score per candidate plus level-gated positional bonuses.
fn scored_move(view: &BoardView<'_>, moves: &[usize], aggression: f64, rng: &mut Rng) -> usize {
    let mut best = moves[0];
    let mut best_score = f64::NEG_INFINITY;
    for next in moves {
        let mut score = rng.next_f64();
        let distance = view.distance_to_player(*next);
        let options = view.count_moves(*next);

        if view.is_dead_end(*next) && distance > 3 {
            score -= 0.3;
        }
        if view.level >= 3 {
            score += options as f64 * 0.15;
        }
        if view.level >= 5 && aggression > 0.6 && distance <= 4 {
            score += (5 - distance) as f64 * 0.1;
        }
        if view.level >= 7 && view.is_choke_point(*next) {
            score += 0.4;
        }

        if score > best_score {
            best_score = score;
            best = *next;
        }
    }
    best
}

use crate::constants::{
    CONSUMABLE_COLOR, CONSUMABLE_POINTS, POWER_ITEM_COLOR, POWER_ITEM_POINTS,
};
use crate::roster::Adversary;
use crate::types::{CellKind, Direction, RuntimeEvent, SessionState};

use super::GameEngine;

impl GameEngine {
    /// Moves the player one cell. Returns false when the move was rejected.
    pub fn apply_player_move(&mut self, dir: Direction) -> bool {
        if self.session.state != SessionState::Running {
            return false;
        }
        let Some(target) = self.grid.neighbor(self.player_index, dir) else {
            return false;
        };
        if !self.grid.is_open(target) {
            return false;
        }

        self.player_index = target;
        self.touch();
        self.interact(target);
        true
    }

    /// Moves once immediately, then again on every player tick until released.
    pub fn begin_continuous_move(&mut self, dir: Direction) {
        if self.session.state != SessionState::Running {
            return;
        }
        self.held_direction = Some(dir);
        self.apply_player_move(dir);
        if self.session.state == SessionState::Running {
            self.player_timer.start();
        }
    }

    pub fn end_continuous_move(&mut self) {
        self.held_direction = None;
        self.player_timer.stop();
    }

    fn interact(&mut self, index: usize) {
        let mut collected_consumable = false;
        match self.grid.classify(index) {
            CellKind::Consumable => {
                self.grid.set_cell(index, CellKind::Empty);
                self.session.stats.consumables += 1;
                collected_consumable = true;
                self.push_popup(index, CONSUMABLE_POINTS, CONSUMABLE_COLOR);
                self.add_score(CONSUMABLE_POINTS);
            }
            CellKind::PowerItem => {
                self.grid.set_cell(index, CellKind::Empty);
                self.session.stats.power_items += 1;
                self.activate_boost();
                self.push_popup(index, POWER_ITEM_POINTS, POWER_ITEM_COLOR);
                self.add_score(POWER_ITEM_POINTS);
            }
            _ => {}
        }

        for idx in 0..self.adversaries.len() {
            if self.session.state != SessionState::Running {
                break;
            }
            if self.adversaries[idx].index == self.player_index {
                self.resolve_collision(idx);
            }
        }

        if collected_consumable
            && self.session.state == SessionState::Running
            && self.grid.remaining_consumables() == 0
        {
            self.reset_level_content();
        }
    }

    fn activate_boost(&mut self) {
        self.session.boost_remaining_ms = self.config.boost_duration_ms;
        self.events.push(RuntimeEvent::BoostStarted {
            duration_ms: self.config.boost_duration_ms,
        });
    }

    pub(super) fn resolve_collision(&mut self, idx: usize) {
        if self.is_boost_active() {
            let points = self.adversaries[idx].points;
            let color = self.adversaries[idx].color.clone();
            let spawn = self.pick_respawn(idx);
            self.adversaries[idx].relocate(spawn);
            self.session.stats.captures += 1;
            self.events.push(RuntimeEvent::AdversaryCaptured {
                adversary_id: self.adversaries[idx].id,
                points,
            });
            self.push_popup(spawn, points, &color);
            self.add_score(points);
        } else {
            self.session.lives = self.session.lives.saturating_sub(1);
            self.session.stats.lives_lost += 1;
            self.events.push(RuntimeEvent::LifeLost {
                lives: self.session.lives,
            });
            if self.session.lives == 0 {
                self.end_game();
            } else {
                self.reset_positions();
            }
        }
        self.touch();
    }

    /// Spawn cell for a captured adversary: free of other adversaries and the player if possible.
    fn pick_respawn(&mut self, idx: usize) -> usize {
        if self.adversary_spawns.is_empty() {
            return self.adversaries[idx].index;
        }
        let held_by_others = |cell: usize, adversaries: &[Adversary]| {
            adversaries
                .iter()
                .enumerate()
                .any(|(other, adversary)| other != idx && adversary.index == cell)
        };

        let clear: Vec<usize> = self
            .adversary_spawns
            .iter()
            .copied()
            .filter(|cell| *cell != self.player_index && !held_by_others(*cell, &self.adversaries))
            .collect();
        if !clear.is_empty() {
            return clear[self.rng.pick_index(clear.len())];
        }
        let unheld: Vec<usize> = self
            .adversary_spawns
            .iter()
            .copied()
            .filter(|cell| !held_by_others(*cell, &self.adversaries))
            .collect();
        if !unheld.is_empty() {
            return unheld[self.rng.pick_index(unheld.len())];
        }
        self.adversary_spawns[self.rng.pick_index(self.adversary_spawns.len())]
    }

    /// Player back to spawn, every adversary to a distinct random spawn cell.
    fn reset_positions(&mut self) {
        self.player_index = self.player_spawn;
        let mut pool = self.adversary_spawns.clone();
        for idx in 0..self.adversaries.len() {
            let spawn = if pool.is_empty() {
                self.adversary_spawns[self.rng.pick_index(self.adversary_spawns.len())]
            } else {
                pool.swap_remove(self.rng.pick_index(pool.len()))
            };
            self.adversaries[idx].relocate(spawn);
        }
    }

    fn push_popup(&mut self, index: usize, points: u32, color: &str) {
        self.events.push(RuntimeEvent::Popup {
            index,
            text: format!("+{points}"),
            color: color.to_string(),
            duration_ms: self.config.popup_duration_ms,
        });
    }
}

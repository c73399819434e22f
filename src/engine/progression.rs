use crate::types::RuntimeEvent;

use super::GameEngine;

impl GameEngine {
    pub(super) fn add_score(&mut self, points: u32) {
        self.session.score = self.session.score.saturating_add(points);
        self.touch();
        while self.session.score >= self.session.next_level_score {
            let threshold = self.session.next_level_score;
            self.level_up();
            if self.session.next_level_score <= threshold {
                break;
            }
        }
    }

    fn level_up(&mut self) {
        self.session.level += 1;
        self.session.next_level_score = self
            .session
            .next_level_score
            .saturating_add(self.config.level_score_step);
        for adversary in &mut self.adversaries {
            adversary.level_up();
        }
        self.events.push(RuntimeEvent::LevelUp {
            level: self.session.level,
            next_level_score: self.session.next_level_score,
        });
        self.reset_level_content();
    }

    /// Regenerates consumables and power items. Positions, score, lives and level are kept.
    pub(super) fn reset_level_content(&mut self) {
        self.grid.restore_from(&self.template);
        self.session.stats.content_resets += 1;
        self.events.push(RuntimeEvent::ContentReset {
            consumables: self.grid.remaining_consumables(),
        });
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::{GameEngine, GameEngineOptions};
    use crate::types::RuntimeEvent;

    #[test]
    fn large_award_crosses_several_thresholds() {
        let mut engine = GameEngine::new(GameEngineOptions::with_seed(5));
        engine.start();
        engine.add_score(760);
        assert_eq!(engine.level(), 4);
        assert_eq!(engine.next_level_score(), 1_000);
        let level_ups = engine
            .build_snapshot(true)
            .events
            .iter()
            .filter(|event| matches!(event, RuntimeEvent::LevelUp { .. }))
            .count();
        assert_eq!(level_ups, 3);
    }

    #[test]
    fn score_below_threshold_keeps_level() {
        let mut engine = GameEngine::new(GameEngineOptions::with_seed(6));
        engine.start();
        engine.add_score(249);
        assert_eq!(engine.level(), 1);
        assert_eq!(engine.next_level_score(), 250);
        assert!(engine.adversaries().iter().all(|a| a.current_speed == a.base_speed));
    }
}

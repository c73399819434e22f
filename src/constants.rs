pub const ADVERSARY_TICK_MS: u64 = 200;
pub const PLAYER_MOVE_MS: u64 = 150;

pub const CONSUMABLE_POINTS: u32 = 10;
pub const POWER_ITEM_POINTS: u32 = 50;
pub const BOOST_DURATION_MS: u64 = 10_000;
pub const POPUP_DURATION_MS: u64 = 1_000;
pub const GAME_OVER_HOLD_MS: u64 = 500;

pub const STARTING_LIVES: u32 = 3;
pub const FIRST_LEVEL_SCORE: u32 = 250;
pub const LEVEL_SCORE_STEP: u32 = 250;

pub const MAX_ADVERSARIES: usize = 6;
pub const MIN_SPEED_THRESHOLD: u32 = 2;
pub const AGGRESSION_STEP: f64 = 0.05;

pub const CONSUMABLE_COLOR: &str = "#ffff00";
pub const POWER_ITEM_COLOR: &str = "#9933ff";

/// Level at or above which a boosted player no longer scares adversaries off.
pub const FEARLESS_LEVEL: u32 = 10;

pub fn chase_level_bonus(level: u32) -> f64 {
    level.saturating_sub(1) as f64 * 0.08
}

pub fn boost_fear(level: u32) -> f64 {
    let relief = (level.saturating_sub(1) as f64 * 0.04).min(0.25);
    0.3 - relief
}

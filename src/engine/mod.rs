use crate::constants::{
    ADVERSARY_TICK_MS, BOOST_DURATION_MS, FIRST_LEVEL_SCORE, GAME_OVER_HOLD_MS,
    LEVEL_SCORE_STEP, PLAYER_MOVE_MS, POPUP_DURATION_MS, STARTING_LIVES,
};
use crate::grid::Grid;
use crate::rng::Rng;
use crate::roster::{build_roster, Adversary, AdversaryArchetype, STANDARD_ROSTER};
use crate::scheduler::RepeatingTimer;
use crate::types::{
    CellKind, Direction, GameConfig, GameSummary, RuntimeEvent, SessionState, SessionView,
    Snapshot,
};

mod collision;
mod decision;
mod progression;

pub use self::decision::{
    chase_probability, decide, pursuit_move, strategic_move, BoardView, Decision,
};

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub layout: Option<Grid>,
    pub roster: Vec<AdversaryArchetype>,
}

impl GameEngineOptions {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            layout: None,
            roster: STANDARD_ROSTER.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct SessionStats {
    lives_lost: u32,
    captures: u32,
    consumables: u32,
    power_items: u32,
    content_resets: u32,
}

#[derive(Clone, Debug)]
struct Session {
    state: SessionState,
    score: u32,
    lives: u32,
    level: u32,
    next_level_score: u32,
    boost_remaining_ms: u64,
    stats: SessionStats,
}

impl Session {
    fn fresh(config: &GameConfig) -> Self {
        Self {
            state: SessionState::NotStarted,
            score: 0,
            lives: config.starting_lives,
            level: 1,
            next_level_score: config.first_level_score,
            boost_remaining_ms: 0,
            stats: SessionStats::default(),
        }
    }
}

/// Owns the board, the roster and the session, and advances them on two fixed clocks.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,

    template: Grid,
    grid: Grid,
    archetypes: Vec<AdversaryArchetype>,
    rng: Rng,
    player_index: usize,
    player_spawn: usize,
    adversary_spawns: Vec<usize>,
    adversaries: Vec<Adversary>,
    session: Session,

    adversary_timer: RepeatingTimer,
    player_timer: RepeatingTimer,
    held_direction: Option<Direction>,

    events: Vec<RuntimeEvent>,
    last_summary: Option<GameSummary>,
    game_over_hold_ms: u64,
    tick_counter: u64,
    elapsed_ms: u64,
    revision: u64,
}

impl GameEngine {
    pub fn new(options: GameEngineOptions) -> Self {
        let template = options.layout.unwrap_or_else(Grid::standard);
        let config = GameConfig {
            width: template.width(),
            adversary_tick_ms: ADVERSARY_TICK_MS,
            player_move_ms: PLAYER_MOVE_MS,
            boost_duration_ms: BOOST_DURATION_MS,
            popup_duration_ms: POPUP_DURATION_MS,
            starting_lives: STARTING_LIVES,
            first_level_score: FIRST_LEVEL_SCORE,
            level_score_step: LEVEL_SCORE_STEP,
        };
        let player_spawn = template
            .indices_of(CellKind::PlayerSpawn)
            .first()
            .copied()
            .unwrap_or(0);
        let adversary_spawns = template.indices_of(CellKind::AdversarySpawn);
        let adversaries = build_roster(&adversary_spawns, &options.roster);
        let session = Session::fresh(&config);

        Self {
            adversary_timer: RepeatingTimer::new(config.adversary_tick_ms),
            player_timer: RepeatingTimer::new(config.player_move_ms),
            config,
            grid: template.clone(),
            template,
            archetypes: options.roster,
            rng: Rng::new(options.seed),
            player_index: player_spawn,
            player_spawn,
            adversary_spawns,
            adversaries,
            session,
            held_direction: None,
            events: Vec::new(),
            last_summary: None,
            game_over_hold_ms: 0,
            tick_counter: 0,
            elapsed_ms: 0,
            revision: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn lives(&self) -> u32 {
        self.session.lives
    }

    pub fn level(&self) -> u32 {
        self.session.level
    }

    pub fn next_level_score(&self) -> u32 {
        self.session.next_level_score
    }

    pub fn is_boost_active(&self) -> bool {
        self.session.boost_remaining_ms > 0
    }

    pub fn player_index(&self) -> usize {
        self.player_index
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn adversary_spawns(&self) -> &[usize] {
        &self.adversary_spawns
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Summary of the most recently finished game, kept across the automatic reset.
    pub fn last_summary(&self) -> Option<&GameSummary> {
        self.last_summary.as_ref()
    }

    pub fn start(&mut self) -> bool {
        if self.session.state != SessionState::NotStarted {
            return false;
        }
        self.session.state = SessionState::Running;
        self.adversary_timer.start();
        self.touch();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.session.state != SessionState::Running {
            return false;
        }
        self.session.state = SessionState::Paused;
        self.adversary_timer.stop();
        self.end_continuous_move();
        self.touch();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.session.state != SessionState::Paused {
            return false;
        }
        self.session.state = SessionState::Running;
        self.adversary_timer.start();
        self.touch();
        true
    }

    /// Full reset to a fresh `NotStarted` session; valid from any state.
    pub fn reset(&mut self) {
        self.adversary_timer.stop();
        self.end_continuous_move();
        self.grid.restore_from(&self.template);
        self.player_index = self.player_spawn;
        self.adversaries = build_roster(&self.adversary_spawns, &self.archetypes);
        self.session = Session::fresh(&self.config);
        self.game_over_hold_ms = 0;
        self.tick_counter = 0;
        self.elapsed_ms = 0;
        self.touch();
    }

    /// Advances simulated time. Due timers fire in time order, adversaries first on ties.
    pub fn step(&mut self, dt_ms: u64) {
        match self.session.state {
            SessionState::Running => {}
            SessionState::GameOver => {
                self.run_game_over_hold(dt_ms);
                return;
            }
            SessionState::NotStarted | SessionState::Paused => return,
        }

        let mut remaining = dt_ms;
        while remaining > 0 && self.session.state == SessionState::Running {
            let boost_due = (self.session.boost_remaining_ms > 0)
                .then_some(self.session.boost_remaining_ms);
            let slice = [
                self.adversary_timer.until_next_ms(),
                self.player_timer.until_next_ms(),
                boost_due,
            ]
            .into_iter()
            .flatten()
            .fold(remaining, u64::min);

            remaining -= slice;
            self.elapsed_ms = self.elapsed_ms.saturating_add(slice);
            self.run_boost_clock(slice);
            let adversaries_due = self.adversary_timer.advance(slice);
            let player_due = self.player_timer.advance(slice);

            if adversaries_due {
                self.tick_adversaries();
            }
            if player_due && self.session.state == SessionState::Running {
                if let Some(dir) = self.held_direction {
                    self.apply_player_move(dir);
                }
            }
        }

        if self.session.state == SessionState::GameOver && remaining > 0 {
            self.run_game_over_hold(remaining);
        }
    }

    fn run_game_over_hold(&mut self, elapsed_ms: u64) {
        self.game_over_hold_ms = self.game_over_hold_ms.saturating_sub(elapsed_ms);
        if self.game_over_hold_ms == 0 {
            self.reset();
        }
    }

    fn tick_adversaries(&mut self) {
        self.tick_counter += 1;
        let boost_active = self.is_boost_active();
        for idx in 0..self.adversaries.len() {
            if self.session.state != SessionState::Running {
                break;
            }
            let adversary = &mut self.adversaries[idx];
            adversary.move_counter += 1;
            if adversary.move_counter < adversary.current_speed {
                continue;
            }
            adversary.move_counter = 0;

            let occupied: Vec<usize> = self.adversaries.iter().map(|a| a.index).collect();
            let view = BoardView {
                grid: &self.grid,
                occupied: &occupied,
                player: self.player_index,
                level: self.session.level,
                boost_active,
            };
            let decision = decide(&view, &self.adversaries[idx], &mut self.rng);

            let adversary = &mut self.adversaries[idx];
            adversary.chasing = decision.chasing;
            if decision.target != adversary.index {
                adversary.last_index = Some(adversary.index);
                adversary.index = decision.target;
            }
            if adversary.index == self.player_index {
                self.resolve_collision(idx);
            }
        }
        self.touch();
    }

    fn run_boost_clock(&mut self, elapsed_ms: u64) {
        if self.session.boost_remaining_ms == 0 {
            return;
        }
        self.session.boost_remaining_ms = self.session.boost_remaining_ms.saturating_sub(elapsed_ms);
        if self.session.boost_remaining_ms == 0 {
            self.events.push(RuntimeEvent::BoostEnded);
            self.touch();
        }
    }

    fn end_game(&mut self) {
        self.session.state = SessionState::GameOver;
        self.adversary_timer.stop();
        self.end_continuous_move();
        self.session.boost_remaining_ms = 0;
        self.game_over_hold_ms = GAME_OVER_HOLD_MS;
        self.last_summary = Some(self.build_summary());
        self.events.push(RuntimeEvent::GameOver {
            score: self.session.score,
            level: self.session.level,
        });
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn session_view(&self) -> SessionView {
        SessionView {
            state: self.session.state,
            score: self.session.score,
            lives: self.session.lives,
            level: self.session.level,
            next_level_score: self.session.next_level_score,
            boost_active: self.is_boost_active(),
            boost_remaining_ms: self.session.boost_remaining_ms,
            remaining_consumables: self.grid.remaining_consumables(),
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let quarantined = self.is_boost_active();
        Snapshot {
            revision: self.revision,
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            width: self.grid.width(),
            player_index: self.player_index,
            adversaries: self
                .adversaries
                .iter()
                .map(|adversary| adversary.view(quarantined))
                .collect(),
            cells: self.grid.cells().to_vec(),
            session: self.session_view(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        let stats = &self.session.stats;
        GameSummary {
            score: self.session.score,
            level: self.session.level,
            duration_ms: self.elapsed_ms,
            lives_lost: stats.lives_lost,
            captures: stats.captures,
            consumables_collected: stats.consumables,
            power_items_collected: stats.power_items,
            content_resets: stats.content_resets,
        }
    }
}

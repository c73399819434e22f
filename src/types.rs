use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbor scan order used by every movement heuristic; ties resolve to the earliest.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Consumable,
    Empty,
    PowerItem,
    PlayerSpawn,
    AdversarySpawn,
}

impl CellKind {
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Consumable),
            ' ' => Some(Self::Empty),
            'o' => Some(Self::PowerItem),
            'P' => Some(Self::PlayerSpawn),
            'A' => Some(Self::AdversarySpawn),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Consumable => '.',
            Self::Empty => ' ',
            Self::PowerItem => 'o',
            Self::PlayerSpawn => 'P',
            Self::AdversarySpawn => 'A',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    pub width: usize,
    #[serde(rename = "adversaryTickMs")]
    pub adversary_tick_ms: u64,
    #[serde(rename = "playerMoveMs")]
    pub player_move_ms: u64,
    #[serde(rename = "boostDurationMs")]
    pub boost_duration_ms: u64,
    #[serde(rename = "popupDurationMs")]
    pub popup_duration_ms: u64,
    #[serde(rename = "startingLives")]
    pub starting_lives: u32,
    #[serde(rename = "firstLevelScore")]
    pub first_level_score: u32,
    #[serde(rename = "levelScoreStep")]
    pub level_score_step: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdversaryView {
    pub id: usize,
    pub name: String,
    pub index: usize,
    pub color: String,
    /// Set while the player is boosted; renderers draw these as capturable.
    pub quarantined: bool,
    pub chasing: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    #[serde(rename = "nextLevelScore")]
    pub next_level_score: u32,
    #[serde(rename = "boostActive")]
    pub boost_active: bool,
    #[serde(rename = "boostRemainingMs")]
    pub boost_remaining_ms: u64,
    #[serde(rename = "remainingConsumables")]
    pub remaining_consumables: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    Popup {
        index: usize,
        text: String,
        color: String,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    LevelUp {
        level: u32,
        #[serde(rename = "nextLevelScore")]
        next_level_score: u32,
    },
    ContentReset {
        consumables: usize,
    },
    AdversaryCaptured {
        #[serde(rename = "adversaryId")]
        adversary_id: usize,
        points: u32,
    },
    LifeLost {
        lives: u32,
    },
    BoostStarted {
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    BoostEnded,
    GameOver {
        score: u32,
        level: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub revision: u64,
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub width: usize,
    #[serde(rename = "playerIndex")]
    pub player_index: usize,
    pub adversaries: Vec<AdversaryView>,
    pub cells: Vec<CellKind>,
    pub session: SessionView,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    pub score: u32,
    pub level: u32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    pub captures: u32,
    #[serde(rename = "consumablesCollected")]
    pub consumables_collected: u32,
    #[serde(rename = "powerItemsCollected")]
    pub power_items_collected: u32,
    #[serde(rename = "contentResets")]
    pub content_resets: u32,
}

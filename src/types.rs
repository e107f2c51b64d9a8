use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Draw order used by the ghost controller: index 0..4 maps onto this array.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
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

    /// Unit vector as `(delta_row, delta_col)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Running,
    Paused,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Loading => "loading",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// Scoreboard and lifecycle flags for one level attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub score: u32,
    #[serde(rename = "hasKey")]
    pub has_key: bool,
    pub paused: bool,
    pub ended: bool,
    pub outcome: Option<Outcome>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub row: usize,
    pub col: usize,
    pub facing: Direction,
    #[serde(rename = "mouthFrame")]
    pub mouth_frame: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GhostView {
    pub id: String,
    pub row: usize,
    pub col: usize,
    #[serde(rename = "colorIndex")]
    pub color_index: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: Phase,
    pub tiles: Vec<String>,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub score: u32,
    #[serde(rename = "hasKey")]
    pub has_key: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Tick {
        snapshot: Snapshot,
    },
    Outcome {
        outcome: Outcome,
        #[serde(rename = "finalScore")]
        final_score: u32,
    },
    PauseChanged {
        paused: bool,
    },
    PlayerTurned {
        direction: Direction,
        frame: u8,
    },
    Animated {
        frame: u8,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub level: String,
    pub outcome: Option<Outcome>,
    pub score: u32,
    #[serde(rename = "hasKey")]
    pub has_key: bool,
    pub ticks: u64,
}
